//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the RBAC system.
///
/// The set is closed; there is no privilege ordering. Routes declare the
/// exact roles they admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// School administrator.
    Admin,
    /// Subject teacher.
    Guru,
    /// Homeroom teacher supervising a class.
    Guruwali,
    /// Student.
    Siswa,
    /// Parent of one or more students.
    Orangtua,
}

impl UserRole {
    /// Every role, in declaration order.
    pub const ALL: [UserRole; 5] = [
        Self::Admin,
        Self::Guru,
        Self::Guruwali,
        Self::Siswa,
        Self::Orangtua,
    ];

    /// Check if this role is one of the teaching roles.
    pub fn is_teacher(&self) -> bool {
        matches!(self, Self::Guru | Self::Guruwali)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Guru => "guru",
            Self::Guruwali => "guruwali",
            Self::Siswa => "siswa",
            Self::Orangtua => "orangtua",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = g7kaih_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "guru" => Ok(Self::Guru),
            "guruwali" => Ok(Self::Guruwali),
            "siswa" => Ok(Self::Siswa),
            "orangtua" => Ok(Self::Orangtua),
            _ => Err(g7kaih_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, guru, guruwali, siswa, orangtua"
            ))),
        }
    }
}
