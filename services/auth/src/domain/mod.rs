pub mod reconcile;
pub mod repository;
pub mod types;
