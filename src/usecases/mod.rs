pub mod delivery;
pub mod messages;
pub mod presences;
pub mod sessions;
