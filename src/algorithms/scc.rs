use serde::Serialize;
use tracing::{debug, info};

use crate::algorithms::analysis::verify_partition;
use crate::algorithms::dfs::{traverse, FinishOrder, TraversalMode, VisitSet};
use crate::algorithms::top_k::{top_k, TopK};
use crate::error::SCCError;
use crate::measure_phase;
use crate::types::edge_source::EdgeSource;
use crate::types::graph_query::GraphQuery;
use crate::types::CSRGraph;

/// One strongly connected component, identified by the vertex whose grouping
/// traversal reached it first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ComponentRecord {
    pub leader: u64,
    pub size: u64,
}

/// Configuration for Strongly Connected Components (SCC) algorithm
///
/// # Fields
///
/// * `vertex_count` - Number of vertices; ids run from 1 to `vertex_count`
/// * `verify` - Check the partition after grouping and fail with
///   [`SCCError::InconsistentPartition`] if it does not cover every vertex
///   exactly once. Debug builds always check it as an assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SCCConfig {
    pub vertex_count: u64,
    pub verify: bool,
}

/// Controller for Strongly Connected Components (SCC) algorithm operations
///
/// Runs Kosaraju's two passes over an [`EdgeSource`]. The source is loaded
/// twice, reversed for the first pass and forward for the second, so that the
/// two adjacency structures are never in memory at the same time.
pub struct SCCController {
    config: SCCConfig,
}

impl SCCController {
    /// Creates a new SCC controller with the specified configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Vertex count of the graph and whether to verify the result
    pub fn new(config: SCCConfig) -> Self {
        Self { config }
    }

    /// The configuration this controller runs with.
    pub fn config(&self) -> &SCCConfig {
        &self.config
    }

    /// Computes one `(leader, size)` record per strongly connected component.
    ///
    /// # Errors
    ///
    /// * [`SCCError::Load`] - the source failed to load; no traversal has run
    /// * [`SCCError::InconsistentPartition`] - only with `verify` set, and only
    ///   if the records do not partition the vertex set
    pub fn find_components<S>(&self, source: &S) -> Result<Vec<ComponentRecord>, SCCError>
    where
        S: EdgeSource + ?Sized,
    {
        let vertex_count = self.config.vertex_count;

        info!(vertex_count, "scoring pass over the reversed graph");
        let finish_order = measure_phase!("scoring", {
            CSRGraph::load(source, vertex_count, true).map(|reversed| score(&reversed))
        })?;

        info!(vertex_count, "grouping pass over the forward graph");
        let components = measure_phase!("grouping", {
            CSRGraph::load(source, vertex_count, false).map(|forward| group(&forward, &finish_order))
        })?;

        if self.config.verify {
            verify_partition(&components, vertex_count)?;
        } else {
            debug_assert!(
                verify_partition(&components, vertex_count).is_ok(),
                "components do not partition the vertex set"
            );
        }

        info!(components = components.len(), "strongly connected components found");
        Ok(components)
    }

    /// The `k` largest components, largest first.
    pub fn top_k(&self, components: &[ComponentRecord], k: usize) -> TopK {
        top_k(components, k)
    }
}

/// Computes the finish order of a DFS over `reversed`, starting traversals
/// from vertices in increasing id order.
pub fn score<G>(reversed: &G) -> FinishOrder
where
    G: GraphQuery + ?Sized,
{
    let vertex_count = reversed.vertex_count();
    let mut visited = VisitSet::new(vertex_count);
    let mut finish_order = FinishOrder::new(vertex_count);

    for vertex in 1..=vertex_count {
        if !visited.is_visited(vertex) {
            traverse(reversed, vertex, &mut visited, &mut TraversalMode::Scoring(&mut finish_order));
        }
    }

    debug_assert!(finish_order.is_complete());
    debug!(finished = finish_order.len(), "scoring pass done");
    finish_order
}

/// Peels components off `forward`, launching a traversal from each vertex not
/// yet visited in reverse finish order.
pub fn group<G>(forward: &G, finish_order: &FinishOrder) -> Vec<ComponentRecord>
where
    G: GraphQuery + ?Sized,
{
    let mut visited = VisitSet::new(forward.vertex_count());
    let mut components = Vec::new();

    for vertex in finish_order.iter_rev() {
        if visited.is_visited(vertex) {
            continue;
        }

        let before = visited.len();
        let mut size = 0usize;
        traverse(forward, vertex, &mut visited, &mut TraversalMode::Grouping(&mut size));
        let grown = visited.len() - before;
        debug_assert_eq!(size, grown);

        components.push(ComponentRecord {
            leader: vertex,
            size: grown as u64,
        });
    }

    debug!(components = components.len(), "grouping pass done");
    components
}

/// Computes the strongly connected components of the graph in `source`.
///
/// Shorthand for an [`SCCController`] with default settings.
pub fn find_components<S>(source: &S, vertex_count: u64) -> Result<Vec<ComponentRecord>, SCCError>
where
    S: EdgeSource + ?Sized,
{
    SCCController::new(SCCConfig {
        vertex_count,
        verify: false,
    })
    .find_components(source)
}

#[cfg(test)]
mod test_scc {
    use std::collections::{HashSet, VecDeque};
    use std::path::Path;

    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::error::LoadError;
    use crate::types::edge_source::{Edge, EdgeFile};

    fn sorted_sizes(components: &[ComponentRecord]) -> Vec<u64> {
        let mut sizes: Vec<u64> = components.iter().map(|c| c.size).collect();
        sizes.sort_unstable();
        sizes
    }

    /// Vertices reachable from `start` in `graph`, `start` included.
    fn reachable(graph: &CSRGraph, start: u64) -> HashSet<u64> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(vertex) = queue.pop_front() {
            for &next in graph.read_neighbor(&vertex) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Checks the records against brute-force mutual reachability.
    ///
    /// Each leader's component must be exactly the vertices that reach it and
    /// are reached by it. Distinct leaders must not be mutually reachable, and
    /// with sizes summing to N this pins the records to the SCC decomposition.
    fn assert_valid(components: &[ComponentRecord], edges: &[Edge], vertex_count: u64) {
        let forward = CSRGraph::load(edges, vertex_count, false).unwrap();
        let reversed = CSRGraph::load(edges, vertex_count, true).unwrap();

        let total: u64 = components.iter().map(|c| c.size).sum();
        assert_eq!(total, vertex_count, "sizes must sum to the vertex count");

        let mut covered = HashSet::new();
        for component in components {
            let forward_reach = reachable(&forward, component.leader);
            let backward_reach = reachable(&reversed, component.leader);
            let members: HashSet<u64> = forward_reach.intersection(&backward_reach).copied().collect();

            assert_eq!(
                members.len() as u64,
                component.size,
                "component led by {} has the wrong size",
                component.leader
            );
            for member in members {
                assert!(covered.insert(member), "vertex {} is in two components", member);
            }
        }
        assert_eq!(covered.len() as u64, vertex_count);
    }

    /// Tests the SCC computation on the example edge file.
    ///
    /// The example has one component of nine vertices, four singletons and an
    /// isolated vertex that only exists through the vertex count.
    #[test]
    fn test_scc_real() {
        let source = EdgeFile::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data/example.edges"));
        let controller = SCCController::new(SCCConfig {
            vertex_count: 14,
            verify: true,
        });

        let start_time = std::time::Instant::now();
        let components = controller.find_components(&source).unwrap();
        println!("SCC Time: {}ms", start_time.elapsed().as_millis());

        assert_eq!(components.len(), 6);
        assert_eq!(sorted_sizes(&components), vec![1, 1, 1, 1, 1, 9]);

        let giant = components.iter().find(|c| c.size == 9).unwrap();
        assert!([1, 3, 4, 5, 6, 7, 8, 9, 11].contains(&giant.leader));

        let singleton_leaders: HashSet<u64> =
            components.iter().filter(|c| c.size == 1).map(|c| c.leader).collect();
        assert_eq!(singleton_leaders, HashSet::from([2, 10, 12, 13, 14]));
    }

    /// Two 2-cycles become two components of size 2.
    #[test]
    fn test_two_cycles() {
        let components = find_components("1 2\n2 1\n3 4\n4 3\n", 4).unwrap();
        assert_eq!(sorted_sizes(&components), vec![2, 2]);
    }

    /// `3 -> 4` without a way back leaves 3 and 4 in separate components.
    #[test]
    fn test_one_way_edge_splits() {
        let components = find_components("1 2\n2 1\n3 4\n", 4).unwrap();
        assert_eq!(sorted_sizes(&components), vec![1, 1, 2]);
        assert_valid(&components, &[(1, 2), (2, 1), (3, 4)], 4);
    }

    /// The exact records follow from the traversal order, which is deterministic.
    #[test]
    fn test_leaders_follow_finish_order() {
        // Reversed graph: 2 -> 1, 1 -> 2, 4 -> 3. Finish order: 2, 1, 3, 4.
        let reversed = CSRGraph::load("1 2\n2 1\n3 4\n", 4, true).unwrap();
        let finish_order = score(&reversed);
        assert_eq!(finish_order.as_slice(), &[2, 1, 3, 4]);

        let forward = CSRGraph::load("1 2\n2 1\n3 4\n", 4, false).unwrap();
        let components = group(&forward, &finish_order);
        assert_eq!(
            components,
            vec![
                ComponentRecord { leader: 4, size: 1 },
                ComponentRecord { leader: 3, size: 1 },
                ComponentRecord { leader: 1, size: 2 },
            ]
        );
    }

    #[test]
    fn test_isolated_vertices() {
        let components = find_components("", 5).unwrap();
        assert_eq!(components.len(), 5);
        assert!(components.iter().all(|c| c.size == 1));

        let top = top_k(&components, 3);
        assert_eq!(top.records.len(), 3);
        assert!(!top.exhausted);
        assert!(top.records.iter().all(|c| c.size == 1));
    }

    #[test]
    fn test_empty_graph() {
        assert!(find_components("", 0).unwrap().is_empty());
    }

    /// A malformed edge fails before any traversal and yields no records.
    #[test]
    fn test_load_error_aborts() {
        let result = find_components("1 2\n2 seven\n", 3);
        assert_matches!(result, Err(SCCError::Load(LoadError::MalformedInput { line: 2, .. })));

        let result = find_components("1 2\n2 9\n", 3);
        assert_matches!(
            result,
            Err(SCCError::Load(LoadError::VertexOutOfRange { vertex: 9, .. }))
        );
    }

    /// A vertex count no graph can be allocated for is an error, not a panic.
    #[test]
    fn test_vertex_count_too_large() {
        for vertex_count in [u64::MAX, u64::MAX / 2] {
            assert_matches!(
                find_components("1 2\n", vertex_count),
                Err(SCCError::Load(LoadError::VertexCountTooLarge { vertex_count: reported }))
                    if reported == vertex_count
            );
        }
    }

    /// A long path is N singletons; closing it into a cycle is one component.
    #[test]
    fn test_deep_path_and_cycle() {
        let n = 200_000u64;
        let mut edges: Vec<Edge> = (1..n).map(|v| (v, v + 1)).collect();

        let components = find_components(&edges, n).unwrap();
        assert_eq!(components.len(), n as usize);
        assert!(components.iter().all(|c| c.size == 1));

        edges.push((n, 1));
        let components = find_components(&edges, n).unwrap();
        assert_eq!(components, vec![ComponentRecord { leader: components[0].leader, size: n }]);
    }

    /// Random sparse graphs checked against brute-force reachability.
    #[test]
    fn test_random_graphs() {
        let mut rng = StdRng::seed_from_u64(0x5cc);
        for _ in 0..5 {
            let n = rng.gen_range(200..800u64);
            let m = rng.gen_range(n..3 * n) as usize;
            let edges: Vec<Edge> = (0..m)
                .map(|_| (rng.gen_range(1..=n), rng.gen_range(1..=n)))
                .collect();

            let components = SCCController::new(SCCConfig { vertex_count: n, verify: true })
                .find_components(&edges)
                .unwrap();
            assert_valid(&components, &edges, n);
        }
    }

    /// Same input, same records in the same order.
    #[test]
    fn test_deterministic() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 1_000u64;
        let edges: Vec<Edge> = (0..3_000)
            .map(|_| (rng.gen_range(1..=n), rng.gen_range(1..=n)))
            .collect();

        let first = find_components(&edges, n).unwrap();
        let second = find_components(&edges, n).unwrap();
        assert_eq!(first, second);
    }

    fn arb_graph() -> impl Strategy<Value = (u64, Vec<Edge>)> {
        (1u64..40).prop_flat_map(|n| {
            (Just(n), prop::collection::vec((1..=n, 1..=n), 0..120))
        })
    }

    proptest! {
        #[test]
        fn proptest_components_are_sccs((n, edges) in arb_graph()) {
            let components = find_components(&edges, n).unwrap();
            prop_assert!(verify_partition(&components, n).is_ok());
            assert_valid(&components, &edges, n);
        }

        #[test]
        fn proptest_reload_is_transpose((n, edges) in arb_graph()) {
            let forward = CSRGraph::load(&edges, n, false).unwrap();
            let reversed = CSRGraph::load(&edges, n, true).unwrap();
            prop_assert_eq!(forward.edge_count(), reversed.edge_count());

            for src in 1..=n {
                for &dst in forward.read_neighbor(&src) {
                    let there = forward.read_neighbor(&src).iter().filter(|&&v| v == dst).count();
                    let back = reversed.read_neighbor(&dst).iter().filter(|&&v| v == src).count();
                    prop_assert_eq!(there, back);
                }
            }
        }
    }
}
