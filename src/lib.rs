//! Strongly connected components of large directed graphs.
//!
//! The graph is read from an edge list twice: once with every edge inverted to
//! compute a DFS finish order, and once as-is to peel off one component per
//! traversal in reverse finish order. Both traversals use an explicit frontier
//! stack, so graph depth is bounded by heap memory rather than the call stack.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod io_status;
pub mod types;

pub use crate::algorithms::analysis::{summarize, verify_partition, ComponentSummary, SCCReport};
pub use crate::algorithms::scc::{find_components, ComponentRecord, SCCConfig, SCCController};
pub use crate::algorithms::top_k::{top_k, TopK};
pub use crate::error::{ConfigError, LoadError, SCCError};
pub use crate::types::edge_source::{Edge, EdgeFile, EdgeSource};
pub use crate::types::graph_query::GraphQuery;
pub use crate::types::CSRGraph;
