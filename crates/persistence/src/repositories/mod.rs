//! Repository implementations for database operations.

pub mod group;
pub mod invitation;

pub use group::{CreatedGroup, GroupRepository};
pub use invitation::{InvitationRepository, RedeemedInvitation};
