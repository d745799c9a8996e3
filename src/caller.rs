use crate::driver::CallerKey;

/// An identity permissions are evaluated for.
///
/// Identity and role membership come from the host application; the engine
/// only reads them.
pub trait Caller {
    fn caller_type(&self) -> &str;

    fn caller_id(&self) -> u64;

    fn caller_roles(&self) -> Vec<String>;

    fn caller_key(&self) -> CallerKey {
        CallerKey::new(self.caller_type(), self.caller_id())
    }
}

/// Plain caller value for hosts that do not have their own user type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCaller {
    caller_type: String,
    caller_id: u64,
    roles: Vec<String>,
}

impl SimpleCaller {
    pub fn new(caller_type: impl Into<String>, caller_id: u64) -> Self {
        Self {
            caller_type: caller_type.into(),
            caller_id,
            roles: Vec::new(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }
}

impl Caller for SimpleCaller {
    fn caller_type(&self) -> &str {
        &self.caller_type
    }

    fn caller_id(&self) -> u64 {
        self.caller_id
    }

    fn caller_roles(&self) -> Vec<String> {
        self.roles.clone()
    }
}
