/// Read-only queries over a directed graph whose vertices are `1..=vertex_count`.
///
/// The traversal engine only needs this trait, so any adjacency layout can be
/// driven by it as long as successor order is stable between calls.
pub trait GraphQuery {
    /// Total number of vertices, including isolated ones.
    fn vertex_count(&self) -> u64;

    /// Total number of directed edges, duplicates included.
    fn edge_count(&self) -> usize;

    /// Successors of `vertex_id` in insertion order.
    ///
    /// Returns an empty slice for vertices without successors and for ids
    /// outside the vertex range.
    fn read_neighbor(&self, vertex_id: &u64) -> &[u64];

    /// Checks if a vertex exists in the graph.
    fn has_vertex(&self, vertex_id: &u64) -> bool {
        (1..=self.vertex_count()).contains(vertex_id)
    }

    /// Checks if at least one edge `src_id -> dst_id` exists.
    fn has_edge(&self, src_id: &u64, dst_id: &u64) -> bool {
        self.read_neighbor(src_id).contains(dst_id)
    }

    /// All vertex ids in ascending order.
    fn vertex_list(&self) -> Vec<u64> {
        (1..=self.vertex_count()).collect()
    }
}
