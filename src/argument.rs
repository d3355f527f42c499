use ordered_float::OrderedFloat;
use serde::Serialize;
use std::fmt;

/// A concrete argument value supplied to a logging call.
///
/// Values outside the primitive set are kept as their `{:?}` text so that
/// arguments stay comparable and hashable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    Char(char),
    Debug(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) | ArgValue::Debug(s) => f.write_str(s),
            ArgValue::Int(v) => write!(f, "{}", v),
            ArgValue::UInt(v) => write!(f, "{}", v),
            ArgValue::Float(v) => write!(f, "{}", v.into_inner()),
            ArgValue::Bool(v) => write!(f, "{}", v),
            ArgValue::Char(v) => write!(f, "{}", v),
        }
    }
}

/// Positional argument of a logging call.
///
/// `None` and an argument that was never supplied are both `Absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Arg {
    Present(ArgValue),
    #[default]
    Absent,
}

impl Arg {
    /// Wrap any value by its `Debug` representation.
    pub fn debug(value: &dyn fmt::Debug) -> Self {
        Arg::Present(ArgValue::Debug(format!("{:?}", value)))
    }

    pub fn value(&self) -> Option<&ArgValue> {
        match self {
            Arg::Present(value) => Some(value),
            Arg::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Arg::Present(_))
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Present(value) => value.fmt(f),
            Arg::Absent => f.write_str("null"),
        }
    }
}

impl From<ArgValue> for Arg {
    fn from(value: ArgValue) -> Self {
        Arg::Present(value)
    }
}

impl From<Option<ArgValue>> for Arg {
    fn from(value: Option<ArgValue>) -> Self {
        value.map_or(Arg::Absent, Arg::Present)
    }
}

macro_rules! arg_from {
    ($($ty:ty => |$v:ident| $conv:expr;)*) => {
        $(
            impl From<$ty> for ArgValue {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }

            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Present(ArgValue::from(value))
                }
            }

            impl From<Option<$ty>> for Arg {
                fn from(value: Option<$ty>) -> Self {
                    value.map_or(Arg::Absent, |v| Arg::Present(ArgValue::from(v)))
                }
            }
        )*
    };
}

arg_from! {
    &str => |v| ArgValue::Str(v.to_string());
    String => |v| ArgValue::Str(v);
    &String => |v| ArgValue::Str(v.clone());
    i8 => |v| ArgValue::Int(v.into());
    i16 => |v| ArgValue::Int(v.into());
    i32 => |v| ArgValue::Int(v.into());
    i64 => |v| ArgValue::Int(v);
    isize => |v| ArgValue::Int(v as i64);
    u8 => |v| ArgValue::UInt(v.into());
    u16 => |v| ArgValue::UInt(v.into());
    u32 => |v| ArgValue::UInt(v.into());
    u64 => |v| ArgValue::UInt(v);
    usize => |v| ArgValue::UInt(v as u64);
    f32 => |v| ArgValue::Float(OrderedFloat(v.into()));
    f64 => |v| ArgValue::Float(OrderedFloat(v));
    bool => |v| ArgValue::Bool(v);
    char => |v| ArgValue::Char(v);
}
