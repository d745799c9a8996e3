use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::validator::{DefaultValidator, Field, LabelValidator};
use crate::{Driver, Error, Manager, PermissionRecord, Result};

/// Builds a [`Manager`] from a JSON definition and/or programmatic
/// registrations.
///
/// ```json
/// {
///     "aliases": { "manage": ["create", "read", "update", "delete"] },
///     "roles": [
///         {
///             "name": "editor",
///             "permissions": [
///                 { "type": "privilege", "action": "edit", "target_type": "posts" }
///             ]
///         }
///     ]
/// }
/// ```
///
/// Every section is optional. Role permissions from the definition are stored
/// into the driver when the manager is built.
pub struct ManagerBuilder<V> {
    validator: V,
    json: Option<String>,
    aliases: Vec<(String, Vec<String>)>,
    roles: Vec<String>,
}

impl ManagerBuilder<DefaultValidator> {
    pub fn new() -> Self {
        Self {
            validator: DefaultValidator,
            json: None,
            aliases: Vec::new(),
            roles: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Self {
        Self {
            json: Some(json.into()),
            ..Self::new()
        }
    }
}

impl Default for ManagerBuilder<DefaultValidator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ManagerBuilder<V>
where
    V: LabelValidator,
{
    pub fn with_validator<W>(self, validator: W) -> ManagerBuilder<W>
    where
        W: LabelValidator,
    {
        ManagerBuilder {
            validator,
            json: self.json,
            aliases: self.aliases,
            roles: self.roles,
        }
    }

    /// Adds an alias. Overrides an alias of the same name from the definition.
    pub fn with_alias<I, S>(mut self, name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .push((name.into(), actions.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_role(mut self, name: impl Into<String>) -> Self {
        self.roles.push(name.into());
        self
    }

    pub fn build<D>(self, driver: D) -> Result<Manager>
    where
        D: Driver + 'static,
    {
        let mut definition = match &self.json {
            Some(json) => {
                serde_json::from_str::<ManagerDefinition>(json).map_err(Error::Deserializing)?
            }
            None => ManagerDefinition::default(),
        };

        for (name, actions) in self.aliases {
            definition.aliases.insert(name, actions);
        }

        for name in self.roles {
            if !definition.roles.iter().any(|role| role.name == name) {
                definition.roles.push(RoleDefinition {
                    name,
                    permissions: Vec::new(),
                });
            }
        }

        let manager = Manager::new(driver);

        for (name, actions) in definition.aliases {
            self.validator.validate(Field::Alias, &name)?;
            for action in &actions {
                self.validator.validate(Field::Action, action)?;
            }
            debug!(alias = %name, actions = ?actions, "registering alias");
            manager.alias(name, actions)?;
        }

        for role in definition.roles {
            self.validator.validate(Field::Role, &role.name)?;
            manager.set_role(role.name.as_str())?;

            for record in &role.permissions {
                let permission = record.to_permission_with(&self.validator)?;
                let driver = manager.driver();
                if !driver.has_role_permission(&role.name, &permission)? {
                    driver.store_role_permission(&role.name, permission)?;
                }
            }
            debug!(role = %role.name, permissions = role.permissions.len(), "registered role");
        }

        Ok(manager)
    }
}

#[derive(Deserialize, Default)]
struct ManagerDefinition {
    #[serde(default)]
    aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    roles: Vec<RoleDefinition>,
}

#[derive(Deserialize)]
struct RoleDefinition {
    name: String,
    #[serde(default)]
    permissions: Vec<PermissionRecord>,
}
