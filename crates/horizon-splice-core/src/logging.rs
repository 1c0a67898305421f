//! Tracing targets for Horizon Splice.
//!
//! Horizon Splice uses the `tracing` crate for instrumentation. Install a
//! subscriber in the embedding program to see the output, and use these
//! targets in filter directives to narrow it to one subsystem:
//!
//! ```text
//! RUST_LOG=horizon_splice::loader=debug,horizon_splice::resolve=warn
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Document parsing target.
    pub const PARSER: &str = "horizon_splice_core::parser";
    /// Module loading and bundling target.
    pub const LOADER: &str = "horizon_splice::loader";
    /// Definition registry target.
    pub const REGISTRY: &str = "horizon_splice::registry";
    /// Invocation resolution target.
    pub const RESOLVE: &str = "horizon_splice::resolve";
    /// Dependency graph target.
    pub const GRAPH: &str = "horizon_splice::graph";
    /// Artifact export target.
    pub const EXPORT: &str = "horizon_splice::export";
}
