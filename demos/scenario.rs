use gatekeep::{Manager, MemoryDriver, Result, SimpleCaller, Target};

fn main() -> Result<()> {
    let manager = Manager::new(MemoryDriver::new());
    manager.alias("manage", vec!["create", "read", "update", "delete"])?;

    // Roles hold permissions of their own.
    manager.role("editor").allow("manage", Some(&Target::new("posts")))?;

    let caller = SimpleCaller::new("users", 1).with_roles(vec!["editor"]);
    let lock = manager.caller(&caller);

    lock.allow("read", None)?;
    lock.allow("edit", Some(&Target::with_id("users", 1)))?;
    lock.deny("delete", Some(&Target::with_id("posts", 7)))?;

    let checks = vec![
        ("read", Target::with_id("events", 3)),
        ("edit", Target::with_id("users", 1)),
        ("edit", Target::with_id("users", 2)),
        ("update", Target::with_id("posts", 7)),
        ("delete", Target::with_id("posts", 7)),
        ("delete", Target::with_id("posts", 8)),
    ];
    for (action, target) in &checks {
        let decision = if lock.can(*action, Some(target))? {
            "allowed"
        } else {
            "denied"
        };
        println!("{} {}: {}", action, target, decision);
    }

    lock.toggle("read", None)?;
    assert!(lock.cannot("read", None)?);

    println!("denied posts: {:?}", lock.denied("delete", "posts")?);

    Ok(())
}
