use std::collections::HashMap;
use std::sync::RwLock;

use crate::driver::{CallerKey, Driver};
use crate::errors::Result;
use crate::{Error, Permission};

/// In-memory driver.
///
/// Keeps an insertion-ordered, duplicate-free permission list per caller and
/// per role. Everything is lost when the driver is dropped.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    callers: RwLock<HashMap<CallerKey, Vec<Permission>>>,
    roles: RwLock<HashMap<String, Vec<Permission>>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<K, Q>(map: &RwLock<HashMap<K, Vec<Permission>>>, key: &Q) -> Result<Vec<Permission>>
where
    K: std::borrow::Borrow<Q> + std::hash::Hash + Eq,
    Q: std::hash::Hash + Eq + ?Sized,
{
    let map = map.read().map_err(|_| Error::Poisoned)?;
    Ok(map.get(key).cloned().unwrap_or_default())
}

fn store<K>(
    map: &RwLock<HashMap<K, Vec<Permission>>>,
    key: K,
    permission: Permission,
) -> Result<()>
where
    K: std::hash::Hash + Eq,
{
    let mut map = map.write().map_err(|_| Error::Poisoned)?;
    let permissions = map.entry(key).or_default();
    if !permissions.iter().any(|p| p.matches_permission(&permission)) {
        permissions.push(permission);
    }
    Ok(())
}

fn remove<K, Q>(
    map: &RwLock<HashMap<K, Vec<Permission>>>,
    key: &Q,
    permission: &Permission,
) -> Result<()>
where
    K: std::borrow::Borrow<Q> + std::hash::Hash + Eq,
    Q: std::hash::Hash + Eq + ?Sized,
{
    let mut map = map.write().map_err(|_| Error::Poisoned)?;
    if let Some(permissions) = map.get_mut(key) {
        permissions.retain(|p| !p.matches_permission(permission));
    }
    Ok(())
}

fn has<K, Q>(
    map: &RwLock<HashMap<K, Vec<Permission>>>,
    key: &Q,
    permission: &Permission,
) -> Result<bool>
where
    K: std::borrow::Borrow<Q> + std::hash::Hash + Eq,
    Q: std::hash::Hash + Eq + ?Sized,
{
    let map = map.read().map_err(|_| Error::Poisoned)?;
    Ok(map.get(key).map_or(false, |permissions| {
        permissions.iter().any(|p| p.matches_permission(permission))
    }))
}

impl Driver for MemoryDriver {
    fn caller_permissions(&self, caller: &CallerKey) -> Result<Vec<Permission>> {
        read(&self.callers, caller)
    }

    fn store_caller_permission(&self, caller: &CallerKey, permission: Permission) -> Result<()> {
        store(&self.callers, caller.clone(), permission)
    }

    fn remove_caller_permission(&self, caller: &CallerKey, permission: &Permission) -> Result<()> {
        remove(&self.callers, caller, permission)
    }

    fn has_caller_permission(&self, caller: &CallerKey, permission: &Permission) -> Result<bool> {
        has(&self.callers, caller, permission)
    }

    fn role_permissions(&self, role: &str) -> Result<Vec<Permission>> {
        read(&self.roles, role)
    }

    fn store_role_permission(&self, role: &str, permission: Permission) -> Result<()> {
        store(&self.roles, role.to_string(), permission)
    }

    fn remove_role_permission(&self, role: &str, permission: &Permission) -> Result<()> {
        remove(&self.roles, role, permission)
    }

    fn has_role_permission(&self, role: &str, permission: &Permission) -> Result<bool> {
        has(&self.roles, role, permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Target;

    fn caller() -> CallerKey {
        CallerKey::new("users", 1)
    }

    fn seeded() -> MemoryDriver {
        let driver = MemoryDriver::new();
        driver
            .store_caller_permission(&caller(), Permission::privilege("read", None))
            .unwrap();
        driver
            .store_caller_permission(
                &caller(),
                Permission::privilege("edit", Some(Target::with_id("users", 1))),
            )
            .unwrap();
        driver
            .store_caller_permission(
                &caller(),
                Permission::privilege("manage", Some(Target::new("tasks"))),
            )
            .unwrap();
        driver
    }

    #[test]
    fn returns_caller_permissions_in_insertion_order() {
        let permissions = seeded().caller_permissions(&caller()).unwrap();

        let actions: Vec<_> = permissions.iter().map(Permission::action).collect();
        assert_eq!(vec!["read", "edit", "manage"], actions);
    }

    #[test]
    fn unknown_principal_has_no_permissions() {
        let driver = seeded();

        assert!(driver
            .caller_permissions(&CallerKey::new("users", 2))
            .unwrap()
            .is_empty());
        assert!(driver.role_permissions("editor").unwrap().is_empty());
    }

    #[test]
    fn stores_a_caller_permission() {
        let driver = seeded();
        driver
            .store_caller_permission(
                &caller(),
                Permission::privilege("create", Some(Target::new("events"))),
            )
            .unwrap();

        assert_eq!(4, driver.caller_permissions(&caller()).unwrap().len());
    }

    #[test]
    fn refuses_duplicates() {
        let driver = seeded();
        driver
            .store_caller_permission(&caller(), Permission::privilege("read", None))
            .unwrap();

        assert_eq!(3, driver.caller_permissions(&caller()).unwrap().len());
    }

    #[test]
    fn removes_a_caller_permission() {
        let driver = seeded();
        driver
            .remove_caller_permission(
                &caller(),
                &Permission::privilege("manage", Some(Target::new("tasks"))),
            )
            .unwrap();

        assert_eq!(2, driver.caller_permissions(&caller()).unwrap().len());
    }

    #[test]
    fn removal_is_exact() {
        let driver = seeded();
        // a specific id does not remove the type-level privilege.
        driver
            .remove_caller_permission(
                &caller(),
                &Permission::privilege("manage", Some(Target::with_id("tasks", 4))),
            )
            .unwrap();

        assert_eq!(3, driver.caller_permissions(&caller()).unwrap().len());
    }

    #[test]
    fn confirms_a_caller_permission() {
        let driver = seeded();

        assert!(driver
            .has_caller_permission(
                &caller(),
                &Permission::privilege("manage", Some(Target::new("tasks")))
            )
            .unwrap());
        assert!(!driver
            .has_caller_permission(
                &caller(),
                &Permission::privilege("edit", Some(Target::new("events")))
            )
            .unwrap());
    }

    #[test]
    fn role_permissions_are_independent_of_callers() {
        let driver = seeded();
        driver
            .store_role_permission("editor", Permission::restriction("read", None))
            .unwrap();

        assert_eq!(1, driver.role_permissions("editor").unwrap().len());
        assert!(driver
            .has_role_permission("editor", &Permission::restriction("read", None))
            .unwrap());
        assert!(!driver
            .has_caller_permission(&caller(), &Permission::restriction("read", None))
            .unwrap());

        driver
            .remove_role_permission("editor", &Permission::restriction("read", None))
            .unwrap();
        assert!(driver.role_permissions("editor").unwrap().is_empty());
    }
}
