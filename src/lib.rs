pub mod argument;
pub mod capture;
pub mod env;
pub mod error;
pub mod event;
pub mod failure;
pub mod format;
pub mod init;
pub mod layer;
pub mod level;
pub mod marker;

pub use crate::argument::{Arg, ArgValue};
pub use crate::capture::{CreatorRef, PrintTarget, SharedWriter, TestLogger};
pub use crate::error::Error;
pub use crate::event::{EventBuilder, EventParts, LoggingEvent};
pub use crate::failure::AttachedError;
pub use crate::format::format_message;
pub use crate::init::{init_capture, init_capture_with_config, CaptureConfig};
pub use crate::layer::CaptureLayer;
pub use crate::level::Level;
pub use crate::marker::Marker;
