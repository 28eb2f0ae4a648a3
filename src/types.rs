use tracing::debug;

use crate::error::LoadError;
use crate::types::edge_source::{Edge, EdgeSource};
use crate::types::graph_query::GraphQuery;

pub mod edge_source;
pub mod graph_query;

/// A CSR (Compressed Sparse Row) adjacency structure over vertices `1..=vertex_count`.
///
/// Vertex `v` owns `neighbor_list[offsets[v - 1]..offsets[v]]`, so every vertex in
/// range has an entry even if it never appears in an edge. Successors keep the
/// order in which their edges were read, and duplicate edges are kept.
///
/// The graph is immutable once built. The SCC passes load one orientation,
/// traverse it, and drop it before loading the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSRGraph {
    /// Total number of vertices in the graph
    pub vertex_count: u64,

    /// `vertex_count + 1` offsets into `neighbor_list`
    pub offsets: Vec<usize>,

    /// Flattened adjacency lists of all vertices, segmented by `offsets`
    pub neighbor_list: Vec<u64>,
}

impl CSRGraph {
    /// Loads a graph from `source`.
    ///
    /// With `invert` unset, an edge `(u, v)` makes `v` a successor of `u`; with
    /// `invert` set it makes `u` a successor of `v`, which builds the transposed
    /// graph straight from the source.
    ///
    /// # Errors
    /// Any malformed record or out-of-range vertex id fails the whole load, as
    /// does a `vertex_count` the offset array cannot be allocated for. The
    /// vertex count is checked before the source is read.
    pub fn load<S>(source: &S, vertex_count: u64, invert: bool) -> Result<Self, LoadError>
    where
        S: EdgeSource + ?Sized,
    {
        let offsets = zeroed_slots(vertex_count)?;
        let edges = source.read_edges(vertex_count)?;
        let graph = Self::from_checked_edges(&edges, vertex_count, offsets, invert)?;
        debug!(
            vertex_count,
            edge_count = graph.edge_count(),
            invert,
            "graph loaded"
        );
        Ok(graph)
    }

    /// Builds the CSR arrays from edges already checked against `vertex_count`.
    ///
    /// `offsets` arrives zeroed with `vertex_count + 1` slots. Slot `v` first
    /// counts the out-degree of vertex `v`, and the prefix sum then turns it
    /// into the end of `v`'s segment.
    fn from_checked_edges(
        edges: &[Edge],
        vertex_count: u64,
        mut offsets: Vec<usize>,
        invert: bool,
    ) -> Result<Self, LoadError> {
        let orient = |&(src, dst): &Edge| if invert { (dst, src) } else { (src, dst) };

        for edge in edges {
            let (from, _) = orient(edge);
            offsets[from as usize] += 1;
        }
        for v in 1..offsets.len() {
            offsets[v] += offsets[v - 1];
        }

        // Stable fill: each vertex's write cursor starts at its offset.
        let slots = offsets.len() - 1;
        let mut cursors = Vec::new();
        cursors
            .try_reserve_exact(slots)
            .map_err(|_| LoadError::VertexCountTooLarge { vertex_count })?;
        cursors.extend_from_slice(&offsets[..slots]);

        let mut neighbor_list = vec![0u64; edges.len()];
        for edge in edges {
            let (from, to) = orient(edge);
            let cursor = &mut cursors[(from - 1) as usize];
            neighbor_list[*cursor] = to;
            *cursor += 1;
        }

        Ok(Self {
            vertex_count,
            offsets,
            neighbor_list,
        })
    }

    /// Out-degree of `vertex_id`, or 0 for ids outside the vertex range.
    pub fn degree(&self, vertex_id: &u64) -> usize {
        self.read_neighbor(vertex_id).len()
    }
}

impl GraphQuery for CSRGraph {
    fn vertex_count(&self) -> u64 {
        self.vertex_count
    }

    fn edge_count(&self) -> usize {
        self.neighbor_list.len()
    }

    fn read_neighbor(&self, vertex_id: &u64) -> &[u64] {
        if !self.has_vertex(vertex_id) {
            return &[];
        }
        let slot = (*vertex_id - 1) as usize;
        &self.neighbor_list[self.offsets[slot]..self.offsets[slot + 1]]
    }
}

/// A zeroed offset array with one slot per vertex plus one.
fn zeroed_slots(vertex_count: u64) -> Result<Vec<usize>, LoadError> {
    let too_large = || LoadError::VertexCountTooLarge { vertex_count };
    let slots = usize::try_from(vertex_count)
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(too_large)?;

    let mut offsets = Vec::new();
    offsets.try_reserve_exact(slots).map_err(|_| too_large())?;
    offsets.resize(slots, 0);
    Ok(offsets)
}
