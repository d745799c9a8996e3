use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::validator::{DefaultValidator, Field, LabelValidator};
use crate::{Error, Kind, Permission, Target};

/// Flat, serializable form of a permission, as it would be kept in a table.
///
/// ```json
/// { "type": "privilege", "action": "edit", "target_type": "posts", "target_id": 3 }
/// ```
///
/// Conditions cannot be represented; a permission converted to a record
/// loses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub action: String,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_id: Option<u64>,
}

impl PermissionRecord {
    pub fn to_permission(&self) -> Result<Permission> {
        self.to_permission_with(&DefaultValidator)
    }

    /// Converts the record, checking its labels with the given validator.
    pub fn to_permission_with<V>(&self, validator: &V) -> Result<Permission>
    where
        V: LabelValidator + ?Sized,
    {
        let kind = match self.kind.as_str() {
            "privilege" => Kind::Privilege,
            "restriction" => Kind::Restriction,
            other => return Err(Error::InvalidPermissionType(other.to_string())),
        };

        validator.validate(Field::Action, &self.action)?;

        // a record without a target type is a global permission.
        let target = match &self.target_type {
            Some(target_type) => {
                validator.validate(Field::TargetType, target_type)?;
                Some(match self.target_id {
                    Some(id) => Target::with_id(target_type.as_str(), id),
                    None => Target::new(target_type.as_str()),
                })
            }
            None => None,
        };

        Ok(match kind {
            Kind::Privilege => Permission::privilege(self.action.as_str(), target),
            Kind::Restriction => Permission::restriction(self.action.as_str(), target),
        })
    }
}

impl From<&Permission> for PermissionRecord {
    fn from(permission: &Permission) -> Self {
        Self {
            kind: permission.kind().as_str().to_string(),
            action: permission.action().to_string(),
            target_type: permission.target_type().map(str::to_string),
            target_id: permission.target_id(),
        }
    }
}

impl TryFrom<PermissionRecord> for Permission {
    type Error = Error;

    fn try_from(record: PermissionRecord) -> Result<Self> {
        record.to_permission()
    }
}

impl TryFrom<&PermissionRecord> for Permission {
    type Error = Error;

    fn try_from(record: &PermissionRecord) -> Result<Self> {
        record.to_permission()
    }
}

/// Maps a batch of records to permissions. Fails on the first bad record.
pub fn permissions_from_records<I>(records: I) -> Result<Vec<Permission>>
where
    I: IntoIterator<Item = PermissionRecord>,
{
    records
        .into_iter()
        .map(|record| record.to_permission())
        .collect()
}

/// Parses a JSON array of records.
pub fn permissions_from_json(json: &str) -> Result<Vec<Permission>> {
    let records: Vec<PermissionRecord> =
        serde_json::from_str(json).map_err(Error::Deserializing)?;
    permissions_from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn record(kind: &str, target_type: Option<&str>, target_id: Option<u64>) -> PermissionRecord {
        PermissionRecord {
            kind: kind.into(),
            action: "update".into(),
            target_type: target_type.map(Into::into),
            target_id,
        }
    }

    #[test]
    fn maps_records_to_permissions() {
        let permissions = permissions_from_records(vec![
            record("privilege", Some("events"), Some(1)),
            record("restriction", Some("comments"), None),
        ])
        .unwrap();

        assert_eq!(2, permissions.len());
        assert!(permissions[0].is_privilege());
        assert_eq!(Some(&Target::with_id("events", 1)), permissions[0].target());
        assert!(permissions[1].is_restriction());
        assert_eq!(Some(&Target::new("comments")), permissions[1].target());
    }

    #[test]
    fn maps_json_to_permissions() {
        let json = r#"[
            { "type": "privilege", "action": "create", "target_type": "events", "target_id": 1 },
            { "type": "restriction", "action": "update", "target_type": "comments", "target_id": null },
            { "type": "privilege", "action": "read" }
        ]"#;

        let permissions = permissions_from_json(json).unwrap();

        assert_eq!(3, permissions.len());
        assert_eq!(None, permissions[2].target());
    }

    #[test]
    fn missing_target_type_means_global() {
        let permission = record("privilege", None, Some(5)).to_permission().unwrap();

        assert_eq!(None, permission.target());
    }

    #[test]
    fn rejects_unknown_permission_type() {
        let result = permissions_from_records(vec![record("something", Some("events"), Some(1))]);

        let error = result.unwrap_err();
        assert_eq!(
            "The permission type you provided \"something\" is incorrect.",
            error.to_string()
        );
        assert_matches!(error, Error::InvalidPermissionType(kind) if kind == "something");
    }

    #[test]
    fn rejects_malformed_json() {
        assert_matches!(permissions_from_json("[{"), Err(Error::Deserializing(_)));
    }

    #[test]
    fn rejects_blank_labels() {
        let mut bad = record("privilege", Some("events"), None);
        bad.action = " ".into();

        assert_matches!(bad.to_permission(), Err(Error::Validation(_)));
    }

    #[test]
    fn converts_permission_back_to_record() {
        let permission = Permission::restriction("edit", Some(Target::with_id("users", 2)));
        let record = PermissionRecord::from(&permission);

        assert_eq!("restriction", record.kind);
        assert_eq!("edit", record.action);
        assert_eq!(Some("users".to_string()), record.target_type);
        assert_eq!(Some(2), record.target_id);
        assert!(Permission::try_from(&record)
            .unwrap()
            .matches_permission(&permission));
    }
}
