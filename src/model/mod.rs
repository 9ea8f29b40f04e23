//! Desired load-balancer state.
//!
//! # Data Flow
//! ```text
//! discovery (BackendDescriptor list, registry order)
//!     + static PortMapping list (from config)
//!     → desired.rs ConfigModel::build (sorted, immutable)
//!     → compared by value against the last applied model
//!     → render (only when different)
//! ```
//!
//! # Design Decisions
//! - Models are plain values; change detection is structural equality
//! - Backends are sorted on build so registry enumeration order never
//!   triggers a reload on its own
//! - Port mappings keep the order they were configured in

pub mod backend;
pub mod desired;
pub mod mapping;

pub use backend::BackendDescriptor;
pub use desired::ConfigModel;
pub use mapping::PortMapping;
