//! Domain services for pet groups.
//!
//! Services contain logic that operates on domain models without I/O.

pub mod clock;
pub mod permissions;

pub use clock::{Clock, ManualClock, SystemClock};
pub use permissions::{
    can_assign_role, can_manage_member, can_perform, has_permission, permission_names,
    permissions_for, permissions_for_role_name,
};
