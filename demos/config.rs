use gatekeep::{
    permissions_from_json, Caller, Driver, ManagerBuilder, MemoryDriver, Result, Target,
};

// a user record of the host application.
struct Account {
    id: u64,
    roles: Vec<String>,
}

impl Caller for Account {
    fn caller_type(&self) -> &str {
        "accounts"
    }

    fn caller_id(&self) -> u64 {
        self.id
    }

    fn caller_roles(&self) -> Vec<String> {
        self.roles.clone()
    }
}

fn main() -> Result<()> {
    let json = r#"{
        "aliases": {
            "manage": ["create", "read", "update", "delete"]
        },
        "roles": [
            {
                "name": "admin",
                "permissions": [
                    { "type": "privilege", "action": "all" }
                ]
            },
            {
                "name": "editor",
                "permissions": [
                    { "type": "privilege", "action": "manage", "target_type": "posts" },
                    { "type": "restriction", "action": "delete", "target_type": "posts", "target_id": 1 }
                ]
            }
        ]
    }"#;

    let manager = ManagerBuilder::from_json(json)
        .with_role("guest")
        .build(MemoryDriver::new())?;

    let editor = manager.caller(&Account {
        id: 10,
        roles: vec!["editor".into()],
    });
    assert!(editor.can("update", Some(&Target::with_id("posts", 1)))?);
    assert!(editor.cannot("update", Some(&Target::with_id("events", 1)))?);

    // Rows loaded from storage keep their kind.
    let rows = r#"[
        { "type": "privilege", "action": "read", "target_type": "events" },
        { "type": "restriction", "action": "read", "target_type": "events", "target_id": 9 }
    ]"#;
    for permission in permissions_from_json(rows)? {
        manager.driver().store_role_permission("guest", permission)?;
    }

    let visitor = manager.caller(&Account {
        id: 11,
        roles: vec!["guest".into()],
    });
    assert!(visitor.cannot("read", Some(&Target::with_id("events", 9)))?);
    match visitor.can("read", Some(&Target::with_id("events", 5)))? {
        true => println!("Allowed"),
        false => panic!("Denied!"),
    }

    Ok(())
}
