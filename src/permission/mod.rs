mod condition;
mod record;

pub use condition::{Condition, Conditions};
pub use record::{permissions_from_json, permissions_from_records, PermissionRecord};

use std::fmt;

use crate::errors::Result;
use crate::{Lock, Target};

/// Action name that matches every requested action.
pub const ALL_ACTIONS: &str = "all";

/// Whether a permission grants or forbids.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Privilege,
    Restriction,
}

impl Kind {
    /// Record discriminator: `"privilege"` or `"restriction"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Privilege => "privilege",
            Kind::Restriction => "restriction",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic permission fact: a privilege that grants or a restriction that
/// forbids an action, optionally scoped to a target and guarded by conditions.
///
/// Permissions are never mutated after construction. Changing one means
/// removing it from the driver and storing a new one.
#[derive(Debug, Clone)]
pub struct Permission {
    kind: Kind,
    action: String,
    target: Option<Target>,
    conditions: Conditions,
}

impl Permission {
    pub fn new(
        kind: Kind,
        action: impl Into<String>,
        target: Option<Target>,
        conditions: Conditions,
    ) -> Self {
        Self {
            kind,
            action: action.into(),
            target,
            conditions,
        }
    }

    pub fn privilege(action: impl Into<String>, target: Option<Target>) -> Self {
        Self::new(Kind::Privilege, action, target, Conditions::none())
    }

    pub fn restriction(action: impl Into<String>, target: Option<Target>) -> Self {
        Self::new(Kind::Restriction, action, target, Conditions::none())
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_privilege(&self) -> bool {
        self.kind == Kind::Privilege
    }

    pub fn is_restriction(&self) -> bool {
        self.kind == Kind::Restriction
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn target_type(&self) -> Option<&str> {
        self.target.as_ref().map(Target::target_type)
    }

    pub fn target_id(&self) -> Option<u64> {
        self.target.as_ref().and_then(Target::id)
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Validates the permission against a requested action and target.
    ///
    /// A privilege answers whether it grants the request. A restriction
    /// answers whether it lets the request through: `false` means it blocks.
    pub fn is_allowed(&self, lock: &Lock, action: &str, target: Option<&Target>) -> Result<bool> {
        let resolved = self.resolve(lock, action, target)?;
        Ok(match self.kind {
            Kind::Privilege => resolved,
            Kind::Restriction => !resolved,
        })
    }

    /// Exact comparison used for deduplication and removal.
    ///
    /// Bypasses the `"all"` wildcard and the type-level target wildcard, and
    /// ignores conditions.
    pub fn matches_permission(&self, other: &Permission) -> bool {
        self.kind == other.kind && self.action == other.action && self.target == other.target
    }

    fn resolve(&self, lock: &Lock, action: &str, target: Option<&Target>) -> Result<bool> {
        let matched = match self.target {
            // no target: a global permission, only the action is relevant.
            None => self.matches_action(action),
            Some(_) => self.matches_action(action) && self.matches_target(target),
        };

        if !matched {
            return Ok(false);
        }

        self.conditions.resolve(lock, self, action, target)
    }

    fn matches_action(&self, action: &str) -> bool {
        self.action == action || self.action == ALL_ACTIONS
    }

    fn matches_target(&self, target: Option<&Target>) -> bool {
        match (&self.target, target) {
            (None, None) => true,
            (None, Some(_)) | (Some(_), None) => false,
            (Some(own), Some(requested)) => {
                own.target_type() == requested.target_type()
                    && (own.id().is_none() || own.id() == requested.id())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryDriver, Manager, SimpleCaller};
    use test_case::test_case;

    fn lock() -> Lock {
        Manager::new(MemoryDriver::new()).caller(&SimpleCaller::new("users", 1))
    }

    fn users(id: u64) -> Option<Target> {
        Some(Target::with_id("users", id))
    }

    #[test_case(Permission::privilege("read", None), "read", None, true ; "global privilege no target")]
    #[test_case(Permission::privilege("read", None), "read", users(3), true ; "global privilege any target")]
    #[test_case(Permission::privilege("read", None), "edit", None, false ; "global privilege other action")]
    #[test_case(Permission::privilege("all", None), "delete", users(1), true ; "wildcard action")]
    #[test_case(Permission::privilege("edit", users(1)), "edit", users(1), true ; "exact target")]
    #[test_case(Permission::privilege("edit", users(1)), "edit", users(2), false ; "other id")]
    #[test_case(Permission::privilege("edit", users(1)), "edit", None, false ; "targeted privilege without request target")]
    #[test_case(Permission::privilege("manage", Some(Target::new("tasks"))), "manage", Some(Target::with_id("tasks", 42)), true ; "type wildcard id")]
    #[test_case(Permission::privilege("manage", Some(Target::new("tasks"))), "manage", Some(Target::with_id("events", 42)), false ; "type mismatch")]
    #[test_case(Permission::privilege("all", Some(Target::new("tasks"))), "archive", Some(Target::with_id("tasks", 1)), true ; "wildcard action on type")]
    fn privilege_matching(
        permission: Permission,
        action: &str,
        target: Option<Target>,
        expected: bool,
    ) {
        let lock = lock();
        assert_eq!(
            expected,
            permission
                .is_allowed(&lock, action, target.as_ref())
                .expect("resolution must not fail")
        );
    }

    #[test]
    fn restriction_negates_resolution() {
        let lock = lock();
        let restriction = Permission::restriction("edit", users(1));

        // matching restriction blocks.
        assert!(!restriction.is_allowed(&lock, "edit", users(1).as_ref()).unwrap());
        // non-matching restriction does not block.
        assert!(restriction.is_allowed(&lock, "edit", users(2).as_ref()).unwrap());
        assert!(restriction.is_allowed(&lock, "read", users(1).as_ref()).unwrap());
    }

    #[test]
    fn matches_permission_is_exact() {
        let read = Permission::privilege("read", None);
        let all = Permission::privilege("all", None);
        let restriction = Permission::restriction("read", None);
        let type_level = Permission::privilege("edit", Some(Target::new("users")));
        let user_one = Permission::privilege("edit", users(1));

        assert!(read.matches_permission(&Permission::privilege("read", None)));
        assert!(!all.matches_permission(&read));
        assert!(!read.matches_permission(&all));
        assert!(!read.matches_permission(&restriction));
        assert!(!type_level.matches_permission(&user_one));
        assert!(!user_one.matches_permission(&type_level));
        assert!(!read.matches_permission(&Permission::privilege("read", users(1))));
    }

    #[test]
    fn matches_permission_ignores_conditions() {
        let plain = Permission::privilege("read", None);
        let guarded = Permission::new(
            Kind::Privilege,
            "read",
            None,
            Conditions::predicate(|_, _, _, _| Ok(false)),
        );

        assert!(plain.matches_permission(&guarded));
    }

    #[test]
    fn accessors() {
        let permission = Permission::restriction("edit", users(9));

        assert_eq!(Kind::Restriction, permission.kind());
        assert_eq!("edit", permission.action());
        assert_eq!(Some("users"), permission.target_type());
        assert_eq!(Some(9), permission.target_id());
        assert!(permission.is_restriction());
        assert!(!permission.is_privilege());
    }
}
