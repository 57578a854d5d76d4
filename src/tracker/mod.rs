//! The check-in accounting engine.
//!  - [normalize] turns stored entries of any historical shape into the canonical collection.
//!  - [streak] derives current/best streaks and the dashboard window from that collection.
//!  - [service::CheckinService] ties both to a [store::CheckinStore] and owns the only mutation.

pub mod entities;
pub mod normalize;
pub mod service;
pub mod store;
pub mod streak;
