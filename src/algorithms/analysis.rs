use std::fmt::Write as _;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::algorithms::scc::ComponentRecord;
use crate::algorithms::top_k::TopK;
use crate::error::SCCError;

/// Checks that `components` partition the vertex set `[1, vertex_count]`.
///
/// The grouping pass only ever reports what it visited, so the check is on
/// the records themselves: sizes are positive, leaders are in range and
/// distinct, and the sizes add up to the vertex count.
pub fn verify_partition(components: &[ComponentRecord], vertex_count: u64) -> Result<(), SCCError> {
    let mut leaders: FxHashSet<u64> = FxHashSet::default();
    let mut covered = 0u64;

    for component in components {
        if component.size == 0 {
            return Err(SCCError::InvalidComponent {
                leader: component.leader,
                reason: "component is empty",
            });
        }
        if !(1..=vertex_count).contains(&component.leader) {
            return Err(SCCError::InvalidComponent {
                leader: component.leader,
                reason: "leader is outside the vertex range",
            });
        }
        if !leaders.insert(component.leader) {
            return Err(SCCError::InvalidComponent {
                leader: component.leader,
                reason: "leader reported twice",
            });
        }
        covered = covered.saturating_add(component.size);
    }

    if covered != vertex_count {
        return Err(SCCError::InconsistentPartition {
            expected: vertex_count,
            actual: covered,
        });
    }
    Ok(())
}

/// Number of components of one size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeBucket {
    pub size: u64,
    pub components: usize,
}

/// Aggregate shape of a component decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    pub vertex_count: u64,
    pub component_count: usize,
    pub singleton_count: usize,
    pub largest: Option<u64>,
    /// Ascending by size.
    pub histogram: Vec<SizeBucket>,
}

/// Summarizes a component decomposition.
///
/// # Arguments
///
/// * `components` - One record per component, in any order
///
/// # Returns
///
/// Component and singleton counts, the largest size, and a histogram of
/// component sizes in ascending size order.
pub fn summarize(components: &[ComponentRecord]) -> ComponentSummary {
    let mut buckets: FxHashMap<u64, usize> = FxHashMap::default();
    for component in components {
        *buckets.entry(component.size).or_insert(0) += 1;
    }

    let mut histogram: Vec<SizeBucket> = buckets
        .into_iter()
        .map(|(size, components)| SizeBucket { size, components })
        .collect();
    histogram.sort_unstable_by_key(|bucket| bucket.size);

    ComponentSummary {
        vertex_count: components.iter().map(|c| c.size).sum(),
        component_count: components.len(),
        singleton_count: components.iter().filter(|c| c.size == 1).count(),
        largest: histogram.last().map(|bucket| bucket.size),
        histogram,
    }
}

/// Everything printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SCCReport {
    pub top: TopK,
    pub summary: ComponentSummary,
}

impl SCCReport {
    /// Pairs the selected components with the summary of all of them.
    pub fn new(top: TopK, summary: ComponentSummary) -> Self {
        Self { top, summary }
    }

    /// One `Leader: <id>, Size: <size>` line per reported component, then
    /// `Finished` if the components ran out before `k` were reported.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for record in &self.top.records {
            let _ = writeln!(out, "Leader: {}, Size: {}", record.leader, record.size);
        }
        if self.top.exhausted {
            out.push_str("Finished\n");
        }
        out
    }

    /// The whole report as a YAML document.
    pub fn render_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod test_analysis {
    use assert_matches::assert_matches;

    use super::*;
    use crate::algorithms::top_k::top_k;

    fn record(leader: u64, size: u64) -> ComponentRecord {
        ComponentRecord { leader, size }
    }

    #[test]
    fn test_verify_accepts_partition() {
        let components = vec![record(4, 1), record(3, 1), record(1, 2)];
        assert!(verify_partition(&components, 4).is_ok());
        assert!(verify_partition(&[], 0).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_total() {
        let components = vec![record(1, 2), record(3, 1)];
        assert_matches!(
            verify_partition(&components, 4),
            Err(SCCError::InconsistentPartition { expected: 4, actual: 3 })
        );
        assert_matches!(
            verify_partition(&[record(1, 5)], 4),
            Err(SCCError::InconsistentPartition { expected: 4, actual: 5 })
        );
    }

    #[test]
    fn test_verify_rejects_bad_records() {
        assert_matches!(
            verify_partition(&[record(1, 0), record(2, 2)], 2),
            Err(SCCError::InvalidComponent { leader: 1, .. })
        );
        assert_matches!(
            verify_partition(&[record(5, 2)], 2),
            Err(SCCError::InvalidComponent { leader: 5, .. })
        );
        assert_matches!(
            verify_partition(&[record(1, 1), record(1, 1)], 2),
            Err(SCCError::InvalidComponent { leader: 1, .. })
        );
    }

    #[test]
    fn test_verify_huge_vertex_count() {
        assert_matches!(
            verify_partition(&[record(1, 1)], u64::MAX),
            Err(SCCError::InconsistentPartition { actual: 1, .. })
        );
    }

    #[test]
    fn test_summarize() {
        let components = vec![record(1, 9), record(2, 1), record(10, 1), record(12, 3), record(14, 1)];
        let summary = summarize(&components);

        assert_eq!(summary.vertex_count, 15);
        assert_eq!(summary.component_count, 5);
        assert_eq!(summary.singleton_count, 3);
        assert_eq!(summary.largest, Some(9));
        assert_eq!(
            summary.histogram,
            vec![
                SizeBucket { size: 1, components: 3 },
                SizeBucket { size: 3, components: 1 },
                SizeBucket { size: 9, components: 1 },
            ]
        );
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.component_count, 0);
        assert_eq!(summary.largest, None);
        assert!(summary.histogram.is_empty());
    }

    #[test]
    fn test_render_text() {
        let components = vec![record(1, 2), record(3, 5)];
        let report = SCCReport::new(top_k(&components, 5), summarize(&components));
        assert_eq!(report.render_text(), "Leader: 3, Size: 5\nLeader: 1, Size: 2\nFinished\n");

        let report = SCCReport::new(top_k(&components, 1), summarize(&components));
        assert_eq!(report.render_text(), "Leader: 3, Size: 5\n");
    }

    #[test]
    fn test_render_yaml() {
        let components = vec![record(1, 2), record(3, 5)];
        let report = SCCReport::new(top_k(&components, 1), summarize(&components));
        let yaml = report.render_yaml().unwrap();

        assert!(yaml.contains("exhausted: false"), "unexpected yaml: {}", yaml);
        assert!(yaml.contains("leader: 3"), "unexpected yaml: {}", yaml);
        assert!(yaml.contains("singleton_count: 0"), "unexpected yaml: {}", yaml);
    }
}
