//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod group;
pub mod invitation;

pub use group::{GroupEntity, GroupMembershipEntity, GroupRoleDb, GroupWithRoleEntity};
pub use invitation::{InvitationEntity, InvitationStatusDb};
