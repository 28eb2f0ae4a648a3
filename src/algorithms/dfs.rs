//! Post-order depth-first traversal over an explicit frontier stack.
//!
//! Both Kosaraju passes run the same loop; they differ only in what happens at
//! a vertex's post-order moment, selected by [`TraversalMode`].

use fixedbitset::FixedBitSet;

use crate::types::graph_query::GraphQuery;

/// Largest visit set allocated up front, in bits (256 MiB).
pub const MAX_PRESIZED_BITS: usize = 1 << 31;

/// Vertices already reached in the current pass.
///
/// Ids are dense in `[1, N]`, so the set is one bit per vertex plus a running
/// count; `len()` is O(1), which the grouping pass relies on to size components.
#[derive(Debug, Clone)]
pub struct VisitSet {
    bits: FixedBitSet,
    len: usize,
}

impl VisitSet {
    /// Creates an empty set sized for ids up to `vertex_count`.
    ///
    /// Counts beyond [`MAX_PRESIZED_BITS`] start the set empty; it then grows
    /// on demand in [`VisitSet::visit`].
    pub fn new(vertex_count: u64) -> Self {
        let mut bits = FixedBitSet::default();
        if let Some(n) = usize::try_from(vertex_count).ok().and_then(|n| n.checked_add(1)) {
            if n <= MAX_PRESIZED_BITS {
                bits.grow(n);
            }
        }
        Self { bits, len: 0 }
    }

    /// Marks `vertex` as visited.
    ///
    /// Returns `true` when this is the first time the vertex is visited.
    pub fn visit(&mut self, vertex: u64) -> bool {
        let idx = vertex as usize;
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        let newly_visited = !self.bits.put(idx);
        if newly_visited {
            self.len += 1;
        }
        newly_visited
    }

    /// True if `vertex` was visited; ids never visited, in range or not, are false.
    pub fn is_visited(&self, vertex: u64) -> bool {
        usize::try_from(vertex).map_or(false, |idx| self.bits.contains(idx))
    }

    /// Number of distinct vertices visited.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Vertices in the order their post-order moment fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishOrder {
    order: Vec<u64>,
    vertex_count: u64,
}

impl FinishOrder {
    /// Creates an empty order for a graph of `vertex_count` vertices.
    ///
    /// # Arguments
    ///
    /// * `vertex_count` - Vertices the order is complete at. Storage for them
    ///   is reserved up front when the count fits in `usize`.
    pub fn new(vertex_count: u64) -> Self {
        let mut order = Vec::new();
        if let Ok(n) = usize::try_from(vertex_count) {
            // Reservation is best effort; pushes still grow the vector.
            let _ = order.try_reserve_exact(n);
        }
        Self { order, vertex_count }
    }

    fn record(&mut self, vertex: u64) {
        self.order.push(vertex);
    }

    /// Number of vertices finished so far.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True once every vertex has been recorded.
    pub fn is_complete(&self) -> bool {
        self.order.len() as u64 == self.vertex_count
    }

    /// Finished vertices; rank 0 finished first.
    pub fn as_slice(&self) -> &[u64] {
        &self.order
    }

    /// Finished vertices from the last one finished back to the first.
    pub fn iter_rev(&self) -> impl Iterator<Item = u64> + '_ {
        self.as_slice().iter().rev().copied()
    }
}

/// What a traversal does at each vertex's post-order moment.
#[derive(Debug)]
pub enum TraversalMode<'a> {
    /// Append the vertex to the finish order.
    Scoring(&'a mut FinishOrder),
    /// Count the vertex towards the current component.
    Grouping(&'a mut usize),
}

impl TraversalMode<'_> {
    fn finish(&mut self, vertex: u64) {
        match self {
            TraversalMode::Scoring(order) => order.record(vertex),
            TraversalMode::Grouping(size) => **size += 1,
        }
    }
}

/// A suspended vertex: `next` is the first successor index not yet tried.
#[derive(Debug, Clone, Copy)]
struct Frame {
    vertex: u64,
    next: usize,
}

/// Traverses everything reachable from `start` through unvisited vertices.
///
/// Vertices are marked when discovered, not when finished, so no vertex is
/// pushed twice even when several open branches point at it. A resumed parent
/// is pushed below its child, so the child's whole subtree finishes before the
/// parent's post-order moment.
pub fn traverse<G>(graph: &G, start: u64, visited: &mut VisitSet, mode: &mut TraversalMode<'_>)
where
    G: GraphQuery + ?Sized,
{
    let mut stack = vec![Frame { vertex: start, next: 0 }];
    visited.visit(start);

    while let Some(Frame { vertex, next }) = stack.pop() {
        let neighbors = graph.read_neighbor(&vertex);
        let unvisited = neighbors
            .iter()
            .enumerate()
            .skip(next)
            .find(|(_, successor)| !visited.is_visited(**successor));

        match unvisited {
            None => mode.finish(vertex),
            Some((idx, &successor)) => {
                visited.visit(successor);
                stack.push(Frame { vertex, next: idx + 1 });
                stack.push(Frame { vertex: successor, next: 0 });
            }
        }
    }
}
