use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role.
///
/// Roles are informational for clients; event mutations are authorized by
/// ownership, and `Admin` grants no ownership bypass.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            // Rows written before roles existed carry an empty role.
            "user" | "" => Ok(Role::User),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}
