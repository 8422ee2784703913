//! Identity read-model types

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ()-]{6,19}$").expect("phone regex is valid")
});

/// Role of the acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Owner,
    Admin,
}

impl ActorRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, ActorRole::Admin)
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorRole::Owner => write!(f, "owner"),
            ActorRole::Admin => write!(f, "admin"),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Contact details required before an approval can be requested
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ActorProfile {
    #[validate(
        required,
        length(min = 1, max = 100),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,

    #[validate(required, regex(path = *PHONE_REGEX))]
    pub phone: Option<String>,
}

impl ActorProfile {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            phone: Some(phone.into()),
        }
    }

    /// Both name and phone are present and well formed
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}
