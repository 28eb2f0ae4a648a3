use std::io;

use thiserror::Error;

/// Failure while turning an edge source into a graph.
///
/// Line numbers are 1-based and count every line of the source, including
/// skipped comment and blank lines. For pre-parsed edge slices the "line" is
/// the 1-based position of the pair in the slice.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("line {line}: malformed edge record `{record}`: {reason}")]
    MalformedInput {
        line: usize,
        record: String,
        reason: String,
    },

    #[error("line {line}: vertex {vertex} is outside the range [1, {vertex_count}]")]
    VertexOutOfRange {
        line: usize,
        vertex: u64,
        vertex_count: u64,
    },

    #[error("vertex count {vertex_count} is too large to allocate a graph for")]
    VertexCountTooLarge { vertex_count: u64 },

    #[error("failed to read edge source {path}")]
    Io {
        path: String,
        #[source]
        error: io::Error,
    },
}

/// Failure of a component computation.
#[derive(Debug, Error)]
pub enum SCCError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("components cover {actual} vertices but the graph has {expected}")]
    InconsistentPartition { expected: u64, actual: u64 },

    #[error("invalid component led by vertex {leader}: {reason}")]
    InvalidComponent { leader: u64, reason: &'static str },
}

/// Failure while reading or resolving a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        error: io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        error: serde_yaml::Error,
    },

    #[error("`{0}` must be set on the command line or in the config file")]
    Missing(&'static str),
}
