use tracing::{debug, trace};

use crate::driver::{CallerKey, DriverExt, Principal};
use crate::errors::Result;
use crate::{Conditions, Error, Kind, Manager, Permission, Target};

/// One or more actions. Checks over several actions must all pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actions(Vec<String>);

impl Actions {
    /// No action at all. Only meaningful for [`Lock::clear`].
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for Actions {
    fn from(action: &str) -> Self {
        Actions(vec![action.to_string()])
    }
}

impl From<String> for Actions {
    fn from(action: String) -> Self {
        Actions(vec![action])
    }
}

impl From<Vec<String>> for Actions {
    fn from(actions: Vec<String>) -> Self {
        Actions(actions)
    }
}

impl From<Vec<&str>> for Actions {
    fn from(actions: Vec<&str>) -> Self {
        actions.as_slice().into()
    }
}

impl From<&[&str]> for Actions {
    fn from(actions: &[&str]) -> Self {
        Actions(actions.iter().map(|action| (*action).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Actions {
    fn from(actions: [&str; N]) -> Self {
        Actions(actions.iter().map(|action| (*action).to_string()).collect())
    }
}

#[derive(Debug, Clone)]
enum Subject {
    Caller { key: CallerKey, roles: Vec<String> },
    Role(String),
}

/// Permission resolver bound to a caller or to a role.
///
/// Every query and mutation goes through the manager's driver; nothing is
/// cached between calls. Mutations of one principal are serialized, so a
/// [`Condition`](crate::Condition) evaluated during `allow`, `deny`,
/// `toggle` or `clear` must not mutate the same principal.
#[derive(Debug, Clone)]
pub struct Lock {
    manager: Manager,
    subject: Subject,
}

impl Lock {
    pub(crate) fn for_caller(manager: Manager, key: CallerKey, roles: Vec<String>) -> Self {
        Self {
            manager,
            subject: Subject::Caller { key, roles },
        }
    }

    pub(crate) fn for_role(manager: Manager, name: String) -> Self {
        Self {
            manager,
            subject: Subject::Role(name),
        }
    }

    pub fn principal(&self) -> Principal {
        match &self.subject {
            Subject::Caller { key, .. } => Principal::Caller(key.clone()),
            Subject::Role(name) => Principal::Role(name.clone()),
        }
    }

    /// Roles consulted during resolution. Always empty for a role lock.
    pub fn roles(&self) -> &[String] {
        match &self.subject {
            Subject::Caller { roles, .. } => roles.as_slice(),
            Subject::Role(_) => &[],
        }
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// The principal's own permissions, as stored by the driver.
    pub fn permissions(&self) -> Result<Vec<Permission>> {
        self.manager.driver().permissions(&self.principal())
    }

    /// Determines whether every given action is allowed on the target.
    ///
    /// Restrictions take precedence over privileges, and a caller's own
    /// restrictions take precedence over grants of its roles. An empty set of
    /// actions is never allowed.
    pub fn can(&self, actions: impl Into<Actions>, target: Option<&Target>) -> Result<bool> {
        let actions = actions.into();
        if actions.is_empty() {
            return Ok(false);
        }

        let allowed = self.can_all(&actions.0, target, &mut Vec::new())?;
        if !allowed {
            debug!(
                principal = %self.principal(),
                actions = ?actions.0,
                target = ?target,
                "not allowed"
            );
        }
        Ok(allowed)
    }

    pub fn cannot(&self, actions: impl Into<Actions>, target: Option<&Target>) -> Result<bool> {
        self.can(actions, target).map(|allowed| !allowed)
    }

    /// Gives the principal permission to do something.
    ///
    /// Restrictions that currently block the action are lifted first.
    pub fn allow(&self, actions: impl Into<Actions>, target: Option<&Target>) -> Result<()> {
        self.allow_when(actions, target, Conditions::none())
    }

    /// Like [`allow`](Lock::allow), with conditions on the new privileges.
    pub fn allow_when(
        &self,
        actions: impl Into<Actions>,
        target: Option<&Target>,
        conditions: Conditions,
    ) -> Result<()> {
        let actions = actions.into();
        self.exclusive(|| self.grant(&actions, target, &conditions))
    }

    /// Denies the principal from doing something.
    ///
    /// Privileges that currently grant the action are removed first.
    pub fn deny(&self, actions: impl Into<Actions>, target: Option<&Target>) -> Result<()> {
        self.deny_when(actions, target, Conditions::none())
    }

    /// Like [`deny`](Lock::deny), with conditions on the new restrictions.
    pub fn deny_when(
        &self,
        actions: impl Into<Actions>,
        target: Option<&Target>,
        conditions: Conditions,
    ) -> Result<()> {
        let actions = actions.into();
        self.exclusive(|| self.restrict(&actions, target, &conditions))
    }

    /// Denies what is currently allowed, allows what is not.
    pub fn toggle(&self, actions: impl Into<Actions>, target: Option<&Target>) -> Result<()> {
        let actions = actions.into();
        self.exclusive(|| {
            if self.can(actions.clone(), target)? {
                self.restrict(&actions, target, &Conditions::none())
            } else {
                self.grant(&actions, target, &Conditions::none())
            }
        })
    }

    /// Ids of `target_type` targets the principal holds a privilege on and is
    /// still allowed to act upon.
    pub fn allowed(&self, actions: impl Into<Actions>, target_type: &str) -> Result<Vec<u64>> {
        let actions = actions.into();
        let mut ids = Vec::new();
        for id in self.target_ids(Kind::Privilege, target_type)? {
            if self.can(actions.clone(), Some(&Target::with_id(target_type, id)))? {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Ids of `target_type` targets the principal holds a restriction on and
    /// is still not allowed to act upon.
    pub fn denied(&self, actions: impl Into<Actions>, target_type: &str) -> Result<Vec<u64>> {
        let actions = actions.into();
        let mut ids = Vec::new();
        for id in self.target_ids(Kind::Restriction, target_type)? {
            if self.cannot(actions.clone(), Some(&Target::with_id(target_type, id)))? {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Clears privileges for the given actions on the target, leaving
    /// restrictions in place.
    ///
    /// Without actions and without a target every permission of the
    /// principal is removed. Clearing a target without naming actions is not
    /// supported and fails with [`Error::UnsupportedClear`].
    pub fn clear(&self, actions: impl Into<Actions>, target: Option<&Target>) -> Result<()> {
        let actions = actions.into();
        match (actions.is_empty(), target) {
            (true, None) => self.clear_all(),
            (true, Some(_)) => Err(Error::UnsupportedClear),
            (false, _) => self.exclusive(|| {
                let principal = self.principal();
                let mut permissions = self.permissions()?;
                for action in actions.iter() {
                    permissions = self.clear_privileges(&principal, action, target, permissions)?;
                }
                debug!(principal = %principal, actions = ?actions.0, target = ?target, "cleared");
                Ok(())
            }),
        }
    }

    /// Removes every permission of the principal.
    pub fn clear_all(&self) -> Result<()> {
        self.exclusive(|| {
            let principal = self.principal();
            let driver = self.manager.driver();
            for permission in self.permissions()? {
                driver.remove_permission(&principal, &permission)?;
            }
            debug!(principal = %principal, "cleared all permissions");
            Ok(())
        })
    }

    fn can_all(
        &self,
        actions: &[String],
        target: Option<&Target>,
        path: &mut Vec<String>,
    ) -> Result<bool> {
        let permissions = self.permissions()?;
        for action in actions {
            path.push(action.clone());
            let allowed = self.can_action(&permissions, action, target, path);
            path.pop();
            if !allowed? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `path` holds the action and the aliases being resolved above it.
    fn can_action(
        &self,
        permissions: &[Permission],
        action: &str,
        target: Option<&Target>,
        path: &mut Vec<String>,
    ) -> Result<bool> {
        // an action is also allowed through every alias that contains it,
        // unless the action itself is restricted.
        let aliases: Vec<String> = self
            .manager
            .aliases_for_action(action)?
            .into_iter()
            .filter(|alias| !path.contains(alias))
            .collect();

        if !aliases.is_empty() {
            trace!(action = %action, aliases = ?aliases, "expanding aliases");
            if self.can_all(&aliases, target, path)?
                && self.resolve_restrictions(permissions, action, target)?
            {
                return Ok(true);
            }
        }

        self.resolve_permissions(permissions, action, target)
    }

    fn resolve_permissions(
        &self,
        permissions: &[Permission],
        action: &str,
        target: Option<&Target>,
    ) -> Result<bool> {
        // restrictions first: they override any privilege.
        if !self.resolve_restrictions(permissions, action, target)? {
            return Ok(false);
        }

        if let Subject::Caller { roles, .. } = &self.subject {
            for role in roles {
                if self.manager.role(role.as_str()).can(action, target)? {
                    trace!(role = %role, action = %action, "granted through role");
                    return Ok(true);
                }
            }
        }

        self.resolve_privileges(permissions, action, target)
    }

    fn resolve_restrictions(
        &self,
        permissions: &[Permission],
        action: &str,
        target: Option<&Target>,
    ) -> Result<bool> {
        for permission in permissions.iter().filter(|p| p.is_restriction()) {
            if !permission.is_allowed(self, action, target)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn resolve_privileges(
        &self,
        permissions: &[Permission],
        action: &str,
        target: Option<&Target>,
    ) -> Result<bool> {
        for permission in permissions.iter().filter(|p| p.is_privilege()) {
            if permission.is_allowed(self, action, target)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn grant(
        &self,
        actions: &Actions,
        target: Option<&Target>,
        conditions: &Conditions,
    ) -> Result<()> {
        let principal = self.principal();
        let driver = self.manager.driver();
        let mut permissions = self.permissions()?;

        for action in actions.iter() {
            let mut kept = Vec::with_capacity(permissions.len());
            for permission in permissions {
                if permission.is_restriction() && !permission.is_allowed(self, action, target)? {
                    driver.remove_permission(&principal, &permission)?;
                } else {
                    kept.push(permission);
                }
            }
            permissions = kept;

            let restriction = Permission::restriction(action, target.cloned());
            if driver.has_permission(&principal, &restriction)? {
                driver.remove_permission(&principal, &restriction)?;
            }

            let privilege =
                Permission::new(Kind::Privilege, action, target.cloned(), conditions.clone());
            self.store(&principal, privilege)?;
            debug!(principal = %principal, action = %action, target = ?target, "allowed");
        }
        Ok(())
    }

    fn restrict(
        &self,
        actions: &Actions,
        target: Option<&Target>,
        conditions: &Conditions,
    ) -> Result<()> {
        let principal = self.principal();
        let mut permissions = self.permissions()?;

        for action in actions.iter() {
            permissions = self.clear_privileges(&principal, action, target, permissions)?;

            let restriction =
                Permission::new(Kind::Restriction, action, target.cloned(), conditions.clone());
            self.store(&principal, restriction)?;
            debug!(principal = %principal, action = %action, target = ?target, "denied");
        }
        Ok(())
    }

    /// Removes privileges that currently grant the action on the target, plus
    /// the exact privilege for it. Returns the permissions left over.
    fn clear_privileges(
        &self,
        principal: &Principal,
        action: &str,
        target: Option<&Target>,
        permissions: Vec<Permission>,
    ) -> Result<Vec<Permission>> {
        let driver = self.manager.driver();
        let mut kept = Vec::with_capacity(permissions.len());
        for permission in permissions {
            if permission.is_privilege() && permission.is_allowed(self, action, target)? {
                driver.remove_permission(principal, &permission)?;
            } else {
                kept.push(permission);
            }
        }

        let privilege = Permission::privilege(action, target.cloned());
        if driver.has_permission(principal, &privilege)? {
            driver.remove_permission(principal, &privilege)?;
        }
        Ok(kept)
    }

    fn store(&self, principal: &Principal, permission: Permission) -> Result<()> {
        let driver = self.manager.driver();
        if !driver.has_permission(principal, &permission)? {
            driver.store_permission(principal, permission)?;
        }
        Ok(())
    }

    fn target_ids(&self, kind: Kind, target_type: &str) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        for permission in self.permissions()? {
            if permission.kind() != kind || permission.target_type() != Some(target_type) {
                continue;
            }
            if let Some(id) = permission.target_id() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    /// Runs a read-modify-write cycle while holding the principal's guard.
    fn exclusive<T>(&self, operation: impl FnOnce() -> Result<T>) -> Result<T> {
        let principal = self.principal();
        let guard = self.manager.guard(&principal)?;
        let result = {
            let _held = guard.lock().map_err(|_| Error::Poisoned)?;
            operation()
        };
        drop(guard);
        self.manager.release(&principal)?;
        result
    }
}
