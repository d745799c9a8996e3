use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::Result;
use crate::Error;

lazy_static! {
    static ref LABEL: Regex = Regex::new(r"^\S+$").expect("label pattern is valid");
}

/// Checks labels read from configuration and permission records.
pub trait LabelValidator {
    fn validate(&self, field: Field, value: &str) -> Result<()>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    Action,
    TargetType,
    Role,
    Alias,
}

/// Accepts any non-empty label without whitespace.
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultValidator;

impl LabelValidator for DefaultValidator {
    fn validate(&self, field: Field, value: &str) -> Result<()> {
        if LABEL.is_match(value) {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "{:?} \"{}\" must be a non-empty label without whitespace",
                field, value
            )))
        }
    }
}
