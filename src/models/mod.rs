pub mod delivery;
pub mod frames;
pub mod messages;
pub mod presences;
pub mod sessions;
