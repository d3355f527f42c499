use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Named categorization tag attached to an event, orthogonal to its level.
///
/// A marker may reference other markers. Two markers are equal when their
/// names are equal; references do not take part in equality.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    references: Vec<Marker>,
}

impl Marker {
    pub fn new(name: impl Into<String>) -> Self {
        Marker {
            name: name.into(),
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, reference: Marker) -> Self {
        self.references.push(reference);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn references(&self) -> &[Marker] {
        &self.references
    }

    /// True if this marker or any marker it references, transitively, is named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.name == name || self.references.iter().any(|r| r.contains(name))
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Marker {}

impl Hash for Marker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Marker {
    fn from(name: &str) -> Self {
        Marker::new(name)
    }
}

impl From<String> for Marker {
    fn from(name: String) -> Self {
        Marker::new(name)
    }
}
