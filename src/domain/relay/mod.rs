//! Relay module - room membership and message fan-out.
//!
//! Contains the member lifecycle, the notices members receive, and the
//! registry that decides who receives each notice.

mod member;
mod notice;
mod registry;

pub use member::{DisplayName, Member, MemberStatus};
pub use notice::{Delivery, Outbound};
pub use registry::MemberRegistry;
