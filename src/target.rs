use std::fmt;

/// A resource a permission can be placed on.
///
/// A target without an id stands for the type as a whole: a permission on
/// `Target::new("tasks")` applies to every task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    target_type: String,
    id: Option<u64>,
}

impl Target {
    /// Type-level target.
    pub fn new(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            id: None,
        }
    }

    /// Single identified resource.
    pub fn with_id(target_type: impl Into<String>, id: u64) -> Self {
        Self {
            target_type: target_type.into(),
            id: Some(id),
        }
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}#{}", self.target_type, id),
            None => f.write_str(&self.target_type),
        }
    }
}
