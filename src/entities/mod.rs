pub mod messages;
pub mod presences;
