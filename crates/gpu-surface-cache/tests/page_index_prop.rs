#![cfg(not(target_arch = "wasm32"))]

use std::collections::BTreeMap;

use gpu_surface_cache::PageIndex;
use proptest::prelude::*;

const PAGE_BITS: u32 = 12;

#[derive(Debug, Clone)]
struct Range {
    addr: u64,
    size: u64,
}

fn range_strategy() -> impl Strategy<Value = Range> {
    (0u64..0x4_0000, 1u64..0x8000).prop_map(|(addr, size)| Range { addr, size })
}

/// Reference model: explicit per-page counts.
fn model_counts(live: &[Range]) -> BTreeMap<u64, u32> {
    let mut counts = BTreeMap::new();
    for r in live {
        let first = r.addr >> PAGE_BITS;
        let last = (r.addr + r.size - 1) >> PAGE_BITS;
        for page in first..=last {
            *counts.entry(page).or_insert(0) += 1;
        }
    }
    counts
}

fn index_counts(index: &PageIndex) -> BTreeMap<u64, u32> {
    let mut counts = BTreeMap::new();
    for (start, end, count) in index.segments() {
        for page in start..end {
            counts.insert(page, count);
        }
    }
    counts
}

proptest! {
    #[test]
    fn register_unregister_sequences_stay_balanced(
        ranges in prop::collection::vec(range_strategy(), 1..24),
        removal_order in prop::collection::vec(any::<prop::sample::Index>(), 24),
    ) {
        let mut index = PageIndex::new(PAGE_BITS);
        let mut live: Vec<Range> = Vec::new();

        for r in &ranges {
            index.update(r.addr, r.size, 1);
            live.push(r.clone());
            prop_assert_eq!(index_counts(&index), model_counts(&live));
        }

        for pick in removal_order.iter().take(ranges.len()) {
            let r = live.remove(pick.index(live.len()));
            index.update(r.addr, r.size, -1);
            prop_assert_eq!(index_counts(&index), model_counts(&live));
        }

        prop_assert!(live.is_empty());
        prop_assert!(index.is_empty());
    }

    #[test]
    fn segments_are_disjoint_and_maximal(
        ranges in prop::collection::vec(range_strategy(), 1..16),
    ) {
        let mut index = PageIndex::new(PAGE_BITS);
        for r in &ranges {
            index.update(r.addr, r.size, 1);
        }

        let segments: Vec<_> = index.segments().collect();
        for (start, end, count) in &segments {
            prop_assert!(start < end);
            prop_assert!(*count > 0);
        }
        for pair in segments.windows(2) {
            let (_, a_end, a_count) = pair[0];
            let (b_start, _, b_count) = pair[1];
            prop_assert!(a_end <= b_start);
            // Touching neighbours must differ, otherwise they would have been merged.
            prop_assert!(a_end != b_start || a_count != b_count);
        }
    }

    #[test]
    fn transitions_report_pages_crossing_zero(
        ranges in prop::collection::vec(range_strategy(), 1..12),
    ) {
        let mut index = PageIndex::new(PAGE_BITS);
        let mut occupied: BTreeMap<u64, bool> = BTreeMap::new();

        for r in &ranges {
            let before = index_counts(&index);
            for t in index.update(r.addr, r.size, 1) {
                prop_assert!(t.cached);
                for page in t.start..t.end {
                    prop_assert!(!before.contains_key(&page));
                    occupied.insert(page, true);
                }
            }
        }
        let after: Vec<u64> = index_counts(&index).into_keys().collect();
        let reported: Vec<u64> = occupied.into_keys().collect();
        prop_assert_eq!(after, reported);
    }
}
