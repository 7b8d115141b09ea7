use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationMode {
    Team,
    Individual,
}

/// Roles the registration form offers. The wire format uses the site's
/// labels ("IT", "Medical", ...); parsing accepts any casing because role
/// matching is case-insensitive everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    #[serde(rename = "IT")]
    It,
    Medical,
    Design,
    Marketing,
}

impl MemberRole {
    pub fn label(self) -> &'static str {
        match self {
            MemberRole::It => "IT",
            MemberRole::Medical => "Medical",
            MemberRole::Design => "Design",
            MemberRole::Marketing => "Marketing",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown member role: '{0}'")]
pub struct ParseMemberRoleError(pub String);

impl FromStr for MemberRole {
    type Err = ParseMemberRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "it" => Ok(MemberRole::It),
            "medical" => Ok(MemberRole::Medical),
            "design" => Ok(MemberRole::Design),
            "marketing" => Ok(MemberRole::Marketing),
            _ => Err(ParseMemberRoleError(value.to_string())),
        }
    }
}

/// One entry in the member list. `role` stays the raw string the form
/// produced (empty until the registrant picks one); use [`Member::role`]
/// for the case-insensitive typed view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Member {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: role.into(),
        }
    }

    pub fn role(&self) -> Option<MemberRole> {
        self.role.parse().ok()
    }

    pub fn has_role(&self, role: MemberRole) -> bool {
        self.role() == Some(role)
    }
}
