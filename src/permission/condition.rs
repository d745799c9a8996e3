use std::fmt;
use std::sync::Arc;

use crate::errors::Result;
use crate::{Lock, Permission, Target};

/// A runtime check that must hold for a permission to apply.
///
/// The lock evaluating the permission is passed in, so a condition can call
/// back into [`Lock::can`] to compose rules.
pub trait Condition: Send + Sync {
    fn assert(
        &self,
        lock: &Lock,
        permission: &Permission,
        action: &str,
        target: Option<&Target>,
    ) -> Result<bool>;
}

type Predicate = dyn Fn(&Lock, &Permission, &str, Option<&Target>) -> Result<bool> + Send + Sync;

/// Conditions attached to a permission: either a list of [`Condition`]s that
/// must all hold, or a single predicate closure.
#[derive(Clone)]
pub enum Conditions {
    All(Vec<Arc<dyn Condition>>),
    Predicate(Arc<Predicate>),
}

impl Conditions {
    /// No conditions. Always holds.
    pub fn none() -> Self {
        Conditions::All(Vec::new())
    }

    pub fn single(condition: impl Condition + 'static) -> Self {
        Conditions::All(vec![Arc::new(condition)])
    }

    pub fn all(conditions: Vec<Arc<dyn Condition>>) -> Self {
        Conditions::All(conditions)
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Lock, &Permission, &str, Option<&Target>) -> Result<bool> + Send + Sync + 'static,
    {
        Conditions::Predicate(Arc::new(predicate))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Conditions::All(conditions) => conditions.is_empty(),
            Conditions::Predicate(_) => false,
        }
    }

    pub(crate) fn resolve(
        &self,
        lock: &Lock,
        permission: &Permission,
        action: &str,
        target: Option<&Target>,
    ) -> Result<bool> {
        match self {
            Conditions::Predicate(predicate) => predicate(lock, permission, action, target),
            Conditions::All(conditions) => {
                for condition in conditions {
                    if !condition.assert(lock, permission, action, target)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

impl Default for Conditions {
    fn default() -> Self {
        Conditions::none()
    }
}

impl fmt::Debug for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conditions::All(conditions) => write!(f, "All({} conditions)", conditions.len()),
            Conditions::Predicate(_) => f.write_str("Predicate"),
        }
    }
}
