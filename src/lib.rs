#![deny(rust_2018_idioms)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]
//! An embeddable authorization engine.
//!
//! Permissions are atomic facts stored per caller or per role: privileges
//! grant an action, restrictions forbid it. A [`Lock`] bound to a caller
//! decides whether an action on a [`Target`] is allowed, taking the caller's
//! roles and the registered action aliases into account.
//!
//! ```
//! use gatekeep::{Manager, MemoryDriver, SimpleCaller, Target};
//!
//! let manager = Manager::new(MemoryDriver::new());
//! let lock = manager.caller(&SimpleCaller::new("users", 1));
//!
//! lock.allow("manage", Some(&Target::new("tasks")))?;
//! assert!(lock.can("manage", Some(&Target::with_id("tasks", 42)))?);
//! assert!(lock.cannot("edit", Some(&Target::with_id("events", 9)))?);
//! # Ok::<(), gatekeep::Error>(())
//! ```
mod aware;
mod caller;
mod driver;
mod errors;
mod lock;
mod manager;
mod permission;
mod target;
mod validator;

pub use aware::{LockAware, LockBinding};
pub use caller::{Caller, SimpleCaller};
pub use driver::{CallerKey, Driver, MemoryDriver, Principal};
pub use errors::{Error, Result};
pub use lock::{Actions, Lock};
pub use manager::{Alias, Manager, ManagerBuilder, Role};
pub use permission::{
    permissions_from_json, permissions_from_records, Condition, Conditions, Kind, Permission,
    PermissionRecord, ALL_ACTIONS,
};
pub use target::Target;
pub use validator::{DefaultValidator, Field, LabelValidator};
