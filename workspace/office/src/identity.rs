use std::fmt;
use std::str::FromStr;

use crate::error::OfficeError;

/// The two permission labels the system knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleName {
    Admin,
    Emp,
}

impl RoleName {
    pub const ALL: [RoleName; 2] = [RoleName::Admin, RoleName::Emp];

    /// Name stored in the `roles` table and sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "ROLE_ADMIN",
            RoleName::Emp => "ROLE_EMP",
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = OfficeError;

    /// Accepts both `ROLE_ADMIN` and the short form `ADMIN`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            "ADMIN" => Ok(RoleName::Admin),
            "EMP" => Ok(RoleName::Emp),
            _ => Err(OfficeError::validation(format!("Unknown role '{}'", s))),
        }
    }
}

/// The authenticated identity a request acts as.
///
/// Built by the session gateway and handed to every workflow operation
/// explicitly; nothing in this crate looks identity up from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub username: String,
    pub roles: Vec<RoleName>,
}

impl Caller {
    pub fn new(user_id: i32, username: impl Into<String>, roles: Vec<RoleName>) -> Self {
        Self {
            user_id,
            username: username.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[RoleName]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(RoleName::Admin)
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.as_str().to_string()).collect()
    }
}
