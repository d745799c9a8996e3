use crate::driver::Principal;
use crate::errors::Result;
use crate::{Actions, Conditions, Error, Lock, Target};

/// Slot a host object keeps its lock in.
#[derive(Debug, Clone, Default)]
pub struct LockBinding(Option<Lock>);

impl LockBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bound(&self) -> bool {
        self.0.is_some()
    }

    pub fn lock(&self) -> Result<&Lock> {
        self.0.as_ref().ok_or(Error::NotBound)
    }
}

/// Gives a host object (a user, a role record...) the lock API on itself.
///
/// The host hands out its principal and its [`LockBinding`]; once a lock
/// for that same principal is set with [`set_lock`](LockAware::set_lock),
/// every call is forwarded to it.
pub trait LockAware {
    fn principal(&self) -> Principal;

    fn binding(&self) -> &LockBinding;

    fn binding_mut(&mut self) -> &mut LockBinding;

    /// Binds a lock. Fails if the lock belongs to another principal.
    fn set_lock(&mut self, lock: Lock) -> Result<()> {
        if lock.principal() != self.principal() {
            return Err(Error::InvalidBinding);
        }
        self.binding_mut().0 = Some(lock);
        Ok(())
    }

    fn can<A>(&self, actions: A, target: Option<&Target>) -> Result<bool>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.can(actions, target)
    }

    fn cannot<A>(&self, actions: A, target: Option<&Target>) -> Result<bool>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.cannot(actions, target)
    }

    fn allow<A>(&self, actions: A, target: Option<&Target>) -> Result<()>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.allow(actions, target)
    }

    fn allow_when<A>(
        &self,
        actions: A,
        target: Option<&Target>,
        conditions: Conditions,
    ) -> Result<()>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.allow_when(actions, target, conditions)
    }

    fn deny<A>(&self, actions: A, target: Option<&Target>) -> Result<()>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.deny(actions, target)
    }

    fn deny_when<A>(
        &self,
        actions: A,
        target: Option<&Target>,
        conditions: Conditions,
    ) -> Result<()>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.deny_when(actions, target, conditions)
    }

    fn toggle<A>(&self, actions: A, target: Option<&Target>) -> Result<()>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.toggle(actions, target)
    }

    fn allowed<A>(&self, actions: A, target_type: &str) -> Result<Vec<u64>>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.allowed(actions, target_type)
    }

    fn denied<A>(&self, actions: A, target_type: &str) -> Result<Vec<u64>>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.denied(actions, target_type)
    }

    fn clear<A>(&self, actions: A, target: Option<&Target>) -> Result<()>
    where
        A: Into<Actions>,
    {
        self.binding().lock()?.clear(actions, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Caller, Manager, MemoryDriver};
    use assert_matches::assert_matches;

    struct User {
        id: u64,
        roles: Vec<String>,
        lock: LockBinding,
    }

    impl User {
        fn new(id: u64) -> Self {
            Self {
                id,
                roles: Vec::new(),
                lock: LockBinding::new(),
            }
        }
    }

    impl Caller for User {
        fn caller_type(&self) -> &str {
            "users"
        }

        fn caller_id(&self) -> u64 {
            self.id
        }

        fn caller_roles(&self) -> Vec<String> {
            self.roles.clone()
        }
    }

    impl LockAware for User {
        fn principal(&self) -> Principal {
            Principal::Caller(self.caller_key())
        }

        fn binding(&self) -> &LockBinding {
            &self.lock
        }

        fn binding_mut(&mut self) -> &mut LockBinding {
            &mut self.lock
        }
    }

    #[test]
    fn forwards_to_the_bound_lock() {
        let manager = Manager::new(MemoryDriver::new());
        let mut user = User::new(1);
        let lock = manager.caller(&user);
        user.set_lock(lock).unwrap();

        let post = Target::with_id("posts", 4);
        user.allow("edit", Some(&post)).unwrap();
        assert!(user.can("edit", Some(&post)).unwrap());
        assert_eq!(vec![4], user.allowed("edit", "posts").unwrap());

        user.deny("edit", Some(&post)).unwrap();
        assert!(user.cannot("edit", Some(&post)).unwrap());
        assert_eq!(vec![4], user.denied("edit", "posts").unwrap());

        user.toggle("edit", Some(&post)).unwrap();
        assert!(user.can("edit", Some(&post)).unwrap());

        user.clear("edit", Some(&post)).unwrap();
        assert!(user.cannot("edit", Some(&post)).unwrap());

        // the host's lock and a fresh lock see the same driver.
        user.allow_when("read", None, Conditions::none()).unwrap();
        assert!(manager.caller(&user).can("read", None).unwrap());
        user.deny_when("read", None, Conditions::none()).unwrap();
        assert!(manager.caller(&user).cannot("read", None).unwrap());
    }

    #[test]
    fn rejects_a_lock_of_another_principal() {
        let manager = Manager::new(MemoryDriver::new());
        let mut user = User::new(1);

        let result = user.set_lock(manager.caller(&User::new(2)));
        assert_matches!(result, Err(Error::InvalidBinding));

        let result = user.set_lock(manager.role("users"));
        assert_matches!(result, Err(Error::InvalidBinding));
        assert!(!user.binding().is_bound());
    }

    #[test]
    fn fails_before_binding() {
        let user = User::new(1);

        assert_matches!(user.can("edit", None), Err(Error::NotBound));
        assert_matches!(user.allow("edit", None), Err(Error::NotBound));
        assert_matches!(user.allowed("edit", "posts"), Err(Error::NotBound));
        assert_matches!(user.clear("edit", None), Err(Error::NotBound));
    }
}
