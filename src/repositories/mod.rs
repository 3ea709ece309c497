pub mod connections;
pub mod messages;
pub mod presences;
pub mod users;
