//! Domain models for groups, memberships, invitations and permissions.

pub mod group;
pub mod invitation;
pub mod permission;

pub use group::{
    AssignableRole, CreateGroupRequest, Group, GroupInfo, GroupRole, GroupWithRole, Membership,
    NewGroup, NewMembership, RenameGroupRequest,
};
pub use invitation::{Invitation, InvitationPreview, InvitationStatus, NewInvitation};
pub use permission::Permission;
