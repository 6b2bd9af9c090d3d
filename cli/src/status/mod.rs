pub mod console;
pub mod events;
pub mod fetcher;
pub mod poller;
pub mod profile;
