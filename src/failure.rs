use serde::{Serialize, Serializer};
use std::error::Error as StdError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// An error attached to a logging event.
///
/// Equality and hashing follow the identity of the error, not its contents:
/// clones of one `AttachedError` are equal, two errors built separately are
/// not, even if they print the same.
///
/// An error only seen by reference (as the capture layer sees it) is keyed
/// by the address it was recorded from, see [`AttachedError::from_ref`].
#[derive(Clone)]
pub struct AttachedError {
    error: SharedError,
    key: usize,
}

impl AttachedError {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        AttachedError::from(Arc::new(error) as SharedError)
    }

    /// Snapshot of a borrowed error, keyed by the borrowed error's address.
    ///
    /// Two snapshots of the same live error are equal, so an expected event
    /// can be built from the same value that was logged. The text of the
    /// error and its causes is copied; the error itself is not retained, and
    /// once it is dropped its address may be reused by another error.
    pub fn from_ref(error: &(dyn StdError + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        AttachedError {
            error: Arc::new(MessageError::chain(error.to_string(), causes)),
            key: error as *const dyn StdError as *const () as usize,
        }
    }

    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.error
    }

    /// Full failure trace: the error itself, then one `Caused by:` line per source.
    pub fn trace(&self) -> String {
        let mut trace = self.error.to_string();
        let mut source = self.error.source();
        while let Some(cause) = source {
            trace.push_str("\nCaused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }
        trace
    }
}

impl PartialEq for AttachedError {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for AttachedError {}

impl Hash for AttachedError {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for AttachedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttachedError").field(&self.error).finish()
    }
}

impl fmt::Display for AttachedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl Serialize for AttachedError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.error)
    }
}

impl From<SharedError> for AttachedError {
    fn from(error: SharedError) -> Self {
        let key = Arc::as_ptr(&error) as *const () as usize;
        AttachedError { error, key }
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for AttachedError {
    fn from(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        AttachedError::from(SharedError::from(error))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct MessageError {
    message: String,
    #[source]
    source: Option<Box<MessageError>>,
}

impl MessageError {
    fn chain(message: String, causes: Vec<String>) -> Self {
        let source = causes.into_iter().rev().fold(None, |source, message| {
            Some(MessageError {
                message,
                source: source.map(Box::new),
            })
        });
        MessageError {
            message,
            source: source.map(Box::new),
        }
    }
}
