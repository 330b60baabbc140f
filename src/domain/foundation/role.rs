//! Caller roles.
//!
//! Canonical numbering, as stored in the `role` token claim:
//!
//! | code | role               | elevated |
//! |------|--------------------|----------|
//! | 1    | `User`             | no       |
//! | 2    | `EventCoordinator` | yes      |
//! | 3    | `SuperAdmin`       | yes      |

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    EventCoordinator,
    SuperAdmin,
}

impl Role {
    pub fn code(&self) -> i16 {
        match self {
            Role::User => 1,
            Role::EventCoordinator => 2,
            Role::SuperAdmin => 3,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, ValidationError> {
        match code {
            1 => Ok(Role::User),
            2 => Ok(Role::EventCoordinator),
            3 => Ok(Role::SuperAdmin),
            other => Err(ValidationError::out_of_range("role", 1, 3, other as i64)),
        }
    }

    /// Coordinators and super admins review proposals and moderate sessions.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::EventCoordinator | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::EventCoordinator => "event_coordinator",
            Role::SuperAdmin => "super_admin",
        };
        write!(f, "{}", s)
    }
}
