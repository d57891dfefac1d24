//! Role Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Employee role (RBAC 角色)
///
/// Closed set; there is no implicit hierarchy between roles. A route open to
/// managers must list `Admin` explicitly to admit administrators too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Employee, Role::Manager, Role::Admin];

    /// Wire name (`EMPLOYEE`, `MANAGER`, `ADMIN`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "EMPLOYEE",
            Self::Manager => "MANAGER",
            Self::Admin => "ADMIN",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Employee => 0b001,
            Self::Manager => 0b010,
            Self::Admin => 0b100,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMPLOYEE" => Ok(Self::Employee),
            "MANAGER" => Ok(Self::Manager),
            "ADMIN" => Ok(Self::Admin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// A set of roles, used for route allow-lists and `has_role` checks
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Role::ALL.into_iter().collect()
    }

    pub fn with(mut self, role: Role) -> Self {
        self.insert(role);
        self
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> {
        let set = *self;
        Role::ALL.into_iter().filter(move |r| set.contains(*r))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self(role.bit())
    }
}

impl From<&[Role]> for RoleSet {
    fn from(roles: &[Role]) -> Self {
        roles.iter().copied().collect()
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl From<Vec<Role>> for RoleSet {
    fn from(roles: Vec<Role>) -> Self {
        roles.into_iter().collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = Self::empty();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"MANAGER\"").unwrap();
        assert_eq!(role, Role::Manager);
        assert!(serde_json::from_str::<Role>("\"SUPERUSER\"").is_err());
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("EMPLOYEE".parse::<Role>().unwrap(), Role::Employee);
        assert_eq!(
            "owner".parse::<Role>().unwrap_err(),
            ParseRoleError("owner".into())
        );
    }

    #[test]
    fn test_role_set_membership_has_no_hierarchy() {
        let managers = RoleSet::from(Role::Manager);
        assert!(managers.contains(Role::Manager));
        assert!(!managers.contains(Role::Admin));

        let staff = RoleSet::from([Role::Manager, Role::Admin]);
        assert!(staff.contains(Role::Admin));
        assert!(!staff.contains(Role::Employee));
        assert_eq!(staff.iter().collect::<Vec<_>>(), vec![Role::Manager, Role::Admin]);
    }

    #[test]
    fn test_role_set_constructors() {
        assert!(RoleSet::empty().is_empty());
        assert_eq!(RoleSet::all().iter().count(), 3);
        let slice: &[Role] = &[Role::Employee];
        assert_eq!(RoleSet::from(slice), RoleSet::empty().with(Role::Employee));
        assert_eq!(format!("{:?}", RoleSet::from(Role::Admin)), "{Admin}");
    }
}
