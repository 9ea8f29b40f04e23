//! Load-balancer membership sync library.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod reconcile;
pub mod render;
pub mod supervisor;

pub use config::SyncConfig;
pub use lifecycle::Shutdown;
pub use reconcile::Reconciler;
