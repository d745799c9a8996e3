//! Storage contract for permission facts.
//!
//! A driver maps a principal (a caller or a role) to an ordered list of
//! permissions. It is the only extension point of the engine: any conforming
//! implementation can back a [`Manager`](crate::Manager) without changing
//! resolution behavior.

mod memory;
pub use memory::MemoryDriver;

use std::fmt;

use crate::errors::Result;
use crate::Permission;

/// Driver key of a caller: its type and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallerKey {
    caller_type: String,
    caller_id: u64,
}

impl CallerKey {
    pub fn new(caller_type: impl Into<String>, caller_id: u64) -> Self {
        Self {
            caller_type: caller_type.into(),
            caller_id,
        }
    }

    pub fn caller_type(&self) -> &str {
        &self.caller_type
    }

    pub fn caller_id(&self) -> u64 {
        self.caller_id
    }
}

impl fmt::Display for CallerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.caller_type, self.caller_id)
    }
}

/// Owner of a permission list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Principal {
    Caller(CallerKey),
    Role(String),
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Caller(key) => write!(f, "caller {}", key),
            Principal::Role(name) => write!(f, "role {}", name),
        }
    }
}

/// Permission storage.
///
/// # Contract
///
/// - `*_permissions` returns the principal's permissions in insertion order.
/// - `store_*_permission` appends. Callers check `has_*_permission` first;
///   a driver may additionally refuse duplicates.
/// - `remove_*_permission` and `has_*_permission` compare with
///   [`Permission::matches_permission`], never with live resolution.
/// - A thread must read its own writes for a principal, and writes for
///   different principals must not interfere.
pub trait Driver: Send + Sync {
    fn caller_permissions(&self, caller: &CallerKey) -> Result<Vec<Permission>>;

    fn store_caller_permission(&self, caller: &CallerKey, permission: Permission) -> Result<()>;

    fn remove_caller_permission(&self, caller: &CallerKey, permission: &Permission) -> Result<()>;

    fn has_caller_permission(&self, caller: &CallerKey, permission: &Permission) -> Result<bool>;

    fn role_permissions(&self, role: &str) -> Result<Vec<Permission>>;

    fn store_role_permission(&self, role: &str, permission: Permission) -> Result<()>;

    fn remove_role_permission(&self, role: &str, permission: &Permission) -> Result<()>;

    fn has_role_permission(&self, role: &str, permission: &Permission) -> Result<bool>;
}

/// Principal-generic helpers over the per-kind driver operations.
pub(crate) trait DriverExt: Driver {
    fn permissions(&self, principal: &Principal) -> Result<Vec<Permission>> {
        match principal {
            Principal::Caller(key) => self.caller_permissions(key),
            Principal::Role(name) => self.role_permissions(name),
        }
    }

    fn store_permission(&self, principal: &Principal, permission: Permission) -> Result<()> {
        match principal {
            Principal::Caller(key) => self.store_caller_permission(key, permission),
            Principal::Role(name) => self.store_role_permission(name, permission),
        }
    }

    fn remove_permission(&self, principal: &Principal, permission: &Permission) -> Result<()> {
        match principal {
            Principal::Caller(key) => self.remove_caller_permission(key, permission),
            Principal::Role(name) => self.remove_role_permission(name, permission),
        }
    }

    fn has_permission(&self, principal: &Principal, permission: &Permission) -> Result<bool> {
        match principal {
            Principal::Caller(key) => self.has_caller_permission(key, permission),
            Principal::Role(name) => self.has_role_permission(name, permission),
        }
    }
}

impl<D: Driver + ?Sized> DriverExt for D {}
