mod builder;
pub use builder::ManagerBuilder;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use crate::driver::{Driver, Principal};
use crate::errors::Result;
use crate::{Caller, Error, Lock};

/// Entry point of the engine.
///
/// Owns the driver and the registries of roles and action aliases, and hands
/// out [`Lock`]s bound to a caller or a role. Cloning is cheap: clones share
/// the same driver and registries.
#[derive(Clone)]
pub struct Manager {
    inner: Arc<Inner>,
}

struct Inner {
    driver: Box<dyn Driver>,
    aliases: RwLock<BTreeMap<String, Alias>>,
    roles: RwLock<BTreeMap<String, Role>>,
    // serializes read-modify-write cycles per principal.
    guards: Mutex<HashMap<Principal, Arc<Mutex<()>>>>,
}

impl Manager {
    pub fn new(driver: impl Driver + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                driver: Box::new(driver),
                aliases: RwLock::new(BTreeMap::new()),
                roles: RwLock::new(BTreeMap::new()),
                guards: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Lock bound to a caller.
    ///
    /// The caller's type, id and roles are read once, here. Create a new lock
    /// after the caller's role membership changes.
    pub fn caller<C>(&self, caller: &C) -> Lock
    where
        C: Caller + ?Sized,
    {
        Lock::for_caller(self.clone(), caller.caller_key(), caller.caller_roles())
    }

    /// Lock bound to a role.
    pub fn role(&self, name: impl Into<String>) -> Lock {
        Lock::for_role(self.clone(), name.into())
    }

    /// Registers an alias, replacing any alias with the same name.
    pub fn alias<I, S>(&self, name: impl Into<String>, actions: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let alias = Alias::new(name, actions);
        let mut aliases = self.inner.aliases.write().map_err(|_| Error::Poisoned)?;
        aliases.insert(alias.name.clone(), alias);
        Ok(())
    }

    pub fn remove_alias(&self, name: &str) -> Result<Option<Alias>> {
        let mut aliases = self.inner.aliases.write().map_err(|_| Error::Poisoned)?;
        Ok(aliases.remove(name))
    }

    pub fn aliases(&self) -> Result<Vec<Alias>> {
        let aliases = self.inner.aliases.read().map_err(|_| Error::Poisoned)?;
        Ok(aliases.values().cloned().collect())
    }

    pub fn set_role(&self, name: impl Into<String>) -> Result<()> {
        let role = Role::new(name);
        let mut roles = self.inner.roles.write().map_err(|_| Error::Poisoned)?;
        roles.insert(role.name.clone(), role);
        Ok(())
    }

    pub fn remove_role(&self, name: &str) -> Result<Option<Role>> {
        let mut roles = self.inner.roles.write().map_err(|_| Error::Poisoned)?;
        Ok(roles.remove(name))
    }

    pub fn roles(&self) -> Result<Vec<Role>> {
        let roles = self.inner.roles.read().map_err(|_| Error::Poisoned)?;
        Ok(roles.values().cloned().collect())
    }

    pub fn driver(&self) -> &dyn Driver {
        self.inner.driver.as_ref()
    }

    /// Names of every alias that contains `action`.
    pub(crate) fn aliases_for_action(&self, action: &str) -> Result<Vec<String>> {
        let aliases = self.inner.aliases.read().map_err(|_| Error::Poisoned)?;
        Ok(aliases
            .values()
            .filter(|alias| alias.has_action(action))
            .map(|alias| alias.name.clone())
            .collect())
    }

    pub(crate) fn guard(&self, principal: &Principal) -> Result<Arc<Mutex<()>>> {
        let mut guards = self.inner.guards.lock().map_err(|_| Error::Poisoned)?;
        Ok(guards.entry(principal.clone()).or_default().clone())
    }

    /// Drops the principal's guard once no one else holds it.
    pub(crate) fn release(&self, principal: &Principal) -> Result<()> {
        let mut guards = self.inner.guards.lock().map_err(|_| Error::Poisoned)?;
        if guards
            .get(principal)
            .map_or(false, |guard| Arc::strong_count(guard) == 1)
        {
            guards.remove(principal);
        }
        Ok(())
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager").finish_non_exhaustive()
    }
}

/// A named shorthand for one or more actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    name: String,
    actions: BTreeSet<String>,
}

impl Alias {
    pub fn new<I, S>(name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains(action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
