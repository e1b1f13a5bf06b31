pub mod applications;
pub mod auth;
pub mod contracts;
pub mod disputes;
pub mod jobs;
pub mod ratings;
pub mod users;
