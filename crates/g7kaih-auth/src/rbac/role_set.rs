//! Sets of roles admitted by a route group.

use std::fmt;

use g7kaih_core::error::AppError;
use g7kaih_core::AppResult;
use g7kaih_entity::user::UserRole;

/// A small, copyable set of [`UserRole`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// Admin only.
    pub const ADMIN_ONLY: RoleSet = RoleSet::empty().with(UserRole::Admin);

    /// Admin or any teacher (`admin`, `guru`, `guruwali`).
    pub const TEACHERS: RoleSet = RoleSet::empty()
        .with(UserRole::Admin)
        .with(UserRole::Guru)
        .with(UserRole::Guruwali);

    /// Admin or homeroom teacher (`admin`, `guruwali`).
    pub const HOMEROOM: RoleSet = RoleSet::empty()
        .with(UserRole::Admin)
        .with(UserRole::Guruwali);

    /// Parents only.
    pub const PARENTS: RoleSet = RoleSet::single(UserRole::Orangtua);

    /// The empty set. Nobody passes.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A set holding exactly one role.
    pub const fn single(role: UserRole) -> Self {
        Self::empty().with(role)
    }

    /// This set plus `role`.
    pub const fn with(self, role: UserRole) -> Self {
        Self(self.0 | bit(role))
    }

    /// Builds a set from any list of roles.
    pub fn of(roles: &[UserRole]) -> Self {
        roles.iter().fold(Self::empty(), |set, &role| set.with(role))
    }

    pub fn contains(&self, role: UserRole) -> bool {
        self.0 & bit(role) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Roles in the set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = UserRole> + '_ {
        UserRole::ALL.into_iter().filter(|r| self.contains(*r))
    }

    /// Succeeds when `role` is a member, otherwise `Forbidden`.
    pub fn check(&self, role: UserRole) -> AppResult<()> {
        if self.contains(role) {
            Ok(())
        } else {
            Err(AppError::forbidden("Insufficient permissions"))
        }
    }
}

const fn bit(role: UserRole) -> u8 {
    1 << (role as u8)
}

impl FromIterator<UserRole> for RoleSet {
    fn from_iter<I: IntoIterator<Item = UserRole>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, role| set.with(role))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|r| r.as_str()).collect();
        write!(f, "{}", names.join("|"))
    }
}
