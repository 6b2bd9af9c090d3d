pub mod component;
pub mod task;
