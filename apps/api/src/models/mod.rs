pub mod agency;
pub mod application;
pub mod job;
pub mod meeting;
pub mod user;
