pub mod dump;
pub mod reconcile;
