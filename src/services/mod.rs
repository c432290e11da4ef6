pub mod intent;
pub mod reconcile;
pub mod sweeper;
pub mod verify;
