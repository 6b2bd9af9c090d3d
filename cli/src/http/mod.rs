pub mod client;
pub mod projects;
