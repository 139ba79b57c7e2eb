#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a platform account.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in
/// SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PARTICIPANT"))]
    Participant,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ORGANIZER"))]
    Organizer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "JUDGE"))]
    Judge,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ADMIN"))]
    Admin,
}

impl UserRole {
    /// Roles entitled to privileged, signed access to submission files.
    pub fn is_reviewer(&self) -> bool {
        matches!(self, Self::Organizer | Self::Judge | Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "PARTICIPANT",
            Self::Organizer => "ORGANIZER",
            Self::Judge => "JUDGE",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Participant
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PARTICIPANT" => Ok(Self::Participant),
            "ORGANIZER" => Ok(Self::Organizer),
            "JUDGE" => Ok(Self::Judge),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("invalid role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reviewer_set() {
        assert!(UserRole::Organizer.is_reviewer());
        assert!(UserRole::Judge.is_reviewer());
        assert!(UserRole::Admin.is_reviewer());
        assert!(!UserRole::Participant.is_reviewer());
    }

    #[test]
    fn parse_roundtrip() {
        for role in [
            UserRole::Participant,
            UserRole::Organizer,
            UserRole::Judge,
            UserRole::Admin,
        ] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
    }
}
