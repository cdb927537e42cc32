pub mod announcements;
pub mod attendance;
pub mod auth;
pub mod health;
pub mod leaves;
pub mod profile;
pub mod users;
