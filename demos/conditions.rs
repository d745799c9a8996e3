use gatekeep::{
    Condition, Conditions, Lock, Manager, MemoryDriver, Permission, Result, SimpleCaller, Target,
};

// allows only targets with an id up to a limit.
struct IdAtMost(u64);

impl Condition for IdAtMost {
    fn assert(
        &self,
        _lock: &Lock,
        _permission: &Permission,
        _action: &str,
        target: Option<&Target>,
    ) -> Result<bool> {
        Ok(target.and_then(Target::id).map_or(false, |id| id <= self.0))
    }
}

fn main() -> Result<()> {
    let manager = Manager::new(MemoryDriver::new());
    let lock = manager.caller(&SimpleCaller::new("users", 1));

    lock.allow_when(
        "archive",
        Some(&Target::new("posts")),
        Conditions::single(IdAtMost(100)),
    )?;
    assert!(lock.can("archive", Some(&Target::with_id("posts", 42)))?);
    assert!(lock.cannot("archive", Some(&Target::with_id("posts", 420)))?);

    // Editing depends on being allowed to publish.
    lock.allow("publish", None)?;
    lock.allow_when(
        "edit",
        None,
        Conditions::predicate(|lock, _, _, _| lock.can("publish", None)),
    )?;
    assert!(lock.can("edit", None)?);

    lock.deny("publish", None)?;
    match lock.can("edit", None)? {
        true => panic!("Allowed!"),
        false => println!("Denied"),
    }

    Ok(())
}
