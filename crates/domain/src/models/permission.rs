//! Group-level capabilities and the static role to permission table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::group::GroupRole;

/// A named capability a role may hold within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewGroup,
    EditGroup,
    DeleteGroup,
    ViewMembers,
    InviteMembers,
    RemoveMembers,
    ChangeRoles,
    ManageContent,
    ViewContent,
}

impl Permission {
    /// Every capability known to the system.
    pub const ALL: [Permission; 9] = [
        Permission::ViewGroup,
        Permission::EditGroup,
        Permission::DeleteGroup,
        Permission::ViewMembers,
        Permission::InviteMembers,
        Permission::RemoveMembers,
        Permission::ChangeRoles,
        Permission::ManageContent,
        Permission::ViewContent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewGroup => "view_group",
            Permission::EditGroup => "edit_group",
            Permission::DeleteGroup => "delete_group",
            Permission::ViewMembers => "view_members",
            Permission::InviteMembers => "invite_members",
            Permission::RemoveMembers => "remove_members",
            Permission::ChangeRoles => "change_roles",
            Permission::ManageContent => "manage_content",
            Permission::ViewContent => "view_content",
        }
    }

    /// Human-readable description of what this permission allows.
    pub fn description(&self) -> &'static str {
        match self {
            Permission::ViewGroup => "View group details",
            Permission::EditGroup => "Rename and edit group settings",
            Permission::DeleteGroup => "Deactivate the group",
            Permission::ViewMembers => "View group members and their roles",
            Permission::InviteMembers => "Create invitation codes",
            Permission::RemoveMembers => "Remove members from the group",
            Permission::ChangeRoles => "Change the role of other members",
            Permission::ManageContent => "Create and edit shared pets, foods and meals",
            Permission::ViewContent => "View shared pets, foods and meals",
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown permission: {}", s))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const CREATOR_PERMISSIONS: &[Permission] = &Permission::ALL;

const MEMBER_PERMISSIONS: &[Permission] = &[
    Permission::ViewGroup,
    Permission::ViewMembers,
    Permission::InviteMembers,
    Permission::ManageContent,
    Permission::ViewContent,
];

const VIEWER_PERMISSIONS: &[Permission] = &[
    Permission::ViewGroup,
    Permission::ViewMembers,
    Permission::ViewContent,
];

/// The static permission table for a role.
pub fn role_permissions(role: GroupRole) -> &'static [Permission] {
    match role {
        GroupRole::Creator => CREATOR_PERMISSIONS,
        GroupRole::Member => MEMBER_PERMISSIONS,
        GroupRole::Viewer => VIEWER_PERMISSIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_names_are_unique() {
        let mut names: Vec<_> = Permission::ALL.iter().map(|p| p.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Permission::ALL.len());
    }

    #[test]
    fn test_permission_from_str() {
        assert_eq!(
            Permission::from_str("invite_members").unwrap(),
            Permission::InviteMembers
        );
        assert!(Permission::from_str("Invite_Members").is_err());
        assert!(Permission::from_str("fly").is_err());
    }

    #[test]
    fn test_permission_serializes_as_snake_case() {
        let json = serde_json::to_string(&Permission::ChangeRoles).unwrap();
        assert_eq!(json, "\"change_roles\"");
    }

    #[test]
    fn test_role_tables_are_nested() {
        for p in role_permissions(GroupRole::Viewer) {
            assert!(role_permissions(GroupRole::Member).contains(p));
        }
        for p in role_permissions(GroupRole::Member) {
            assert!(role_permissions(GroupRole::Creator).contains(p));
        }
    }

    #[test]
    fn test_descriptions_present() {
        assert!(Permission::ALL.iter().all(|p| !p.description().is_empty()));
    }
}
