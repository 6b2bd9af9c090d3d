pub mod manager;
pub mod reconcile;
