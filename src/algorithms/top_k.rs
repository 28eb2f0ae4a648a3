use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::algorithms::scc::ComponentRecord;

/// The largest components, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopK {
    pub records: Vec<ComponentRecord>,
    /// Fewer components existed than were requested; `records` holds all of them.
    pub exhausted: bool,
}

/// Heap key: larger size ranks higher, and on equal sizes the smaller leader does.
type Rank = (u64, Reverse<u64>);

fn rank(record: &ComponentRecord) -> Rank {
    (record.size, Reverse(record.leader))
}

/// Selects the `k` largest records by size without sorting all of them.
///
/// Keeps a min-heap of at most `k` entries whose root is the weakest record
/// kept so far; each record either replaces that root or is dropped. Runs in
/// O(n log k).
pub fn top_k(records: &[ComponentRecord], k: usize) -> TopK {
    let exhausted = records.len() < k;
    if k == 0 {
        return TopK {
            records: Vec::new(),
            exhausted,
        };
    }

    let mut heap: BinaryHeap<Reverse<Rank>> = BinaryHeap::with_capacity(k.min(records.len()));
    for record in records {
        let candidate = rank(record);
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if let Some(mut weakest) = heap.peek_mut() {
            if candidate > weakest.0 {
                *weakest = Reverse(candidate);
            }
        }
    }

    // Ascending order of `Reverse<Rank>` is descending order of rank.
    let records = heap
        .into_sorted_vec()
        .into_iter()
        .map(|Reverse((size, Reverse(leader)))| ComponentRecord { leader, size })
        .collect();

    TopK { records, exhausted }
}
