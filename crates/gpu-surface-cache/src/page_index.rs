//! Page occupancy index over the guest GPU address space.
//!
//! Stores disjoint `[start, end)` page segments with the number of registered surfaces touching
//! each page. Adjacent segments with equal counts are merged and pages with a zero count are
//! not stored, so an index with nothing registered is empty.

use std::collections::BTreeMap;

use tegra_hw::GpuVAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    end: u64,
    count: u32,
}

/// A run of pages whose occupancy crossed zero during one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTransition {
    /// First page of the run.
    pub start: u64,
    /// One past the last page of the run.
    pub end: u64,
    /// `true` when the pages became occupied, `false` when they became free.
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct PageIndex {
    page_bits: u32,
    segments: BTreeMap<u64, Segment>,
}

impl PageIndex {
    pub fn new(page_bits: u32) -> Self {
        assert!(page_bits < 64, "page_bits {page_bits} out of range");
        Self {
            page_bits,
            segments: BTreeMap::new(),
        }
    }

    pub fn page_bits(&self) -> u32 {
        self.page_bits
    }

    pub fn page_size(&self) -> u64 {
        1 << self.page_bits
    }

    /// Pages `[start, end)` covering the byte range `[addr, addr + size)`.
    pub fn page_span(&self, addr: GpuVAddr, size: u64) -> (u64, u64) {
        if size == 0 {
            return (addr >> self.page_bits, addr >> self.page_bits);
        }
        let last = addr.saturating_add(size - 1) >> self.page_bits;
        (addr >> self.page_bits, last + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Occupancy of a single page.
    pub fn count(&self, page: u64) -> u32 {
        match self.segments.range(..=page).next_back() {
            Some((_, seg)) if seg.end > page => seg.count,
            _ => 0,
        }
    }

    /// Iterates `(start_page, end_page, count)` in address order.
    pub fn segments(&self) -> impl Iterator<Item = (u64, u64, u32)> + '_ {
        self.segments
            .iter()
            .map(|(&start, seg)| (start, seg.end, seg.count))
    }

    /// Whether any occupied page intersects the byte range `[addr, addr + size)`.
    pub fn intersects(&self, addr: GpuVAddr, size: u64) -> bool {
        let (first, end) = self.page_span(addr, size);
        if first == end {
            return false;
        }
        match self.segments.range(..end).next_back() {
            Some((_, seg)) => seg.end > first,
            None => false,
        }
    }

    /// Adds `delta` to every page covering `[addr, addr + size)`.
    ///
    /// Returns the runs of pages whose occupancy went from zero to non-zero or back, in address
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if a page count would drop below zero.
    pub fn update(&mut self, addr: GpuVAddr, size: u64, delta: i32) -> Vec<PageTransition> {
        let (first, end) = self.page_span(addr, size);
        if first == end || delta == 0 {
            return Vec::new();
        }

        self.split_at(first);
        self.split_at(end);

        let existing: Vec<(u64, Segment)> = self
            .segments
            .range(first..end)
            .map(|(&start, &seg)| (start, seg))
            .collect();

        let mut transitions = Vec::new();
        let mut cursor = first;
        for (start, seg) in existing {
            if cursor < start {
                self.fill_gap(cursor, start, delta, &mut transitions);
            }
            let count = apply_delta(seg.count, delta, start);
            if count == 0 {
                self.segments.remove(&start);
                push_transition(&mut transitions, start, seg.end, false);
            } else {
                self.segments.insert(start, Segment { end: seg.end, count });
            }
            cursor = seg.end;
        }
        if cursor < end {
            self.fill_gap(cursor, end, delta, &mut transitions);
        }

        self.merge_around(first, end);
        transitions
    }

    fn fill_gap(&mut self, start: u64, end: u64, delta: i32, transitions: &mut Vec<PageTransition>) {
        let count = apply_delta(0, delta, start);
        self.segments.insert(start, Segment { end, count });
        push_transition(transitions, start, end, true);
    }

    /// Ensures no segment straddles `page`.
    fn split_at(&mut self, page: u64) {
        let Some((&start, &seg)) = self.segments.range(..page).next_back() else {
            return;
        };
        if seg.end > page {
            self.segments.insert(
                start,
                Segment {
                    end: page,
                    count: seg.count,
                },
            );
            self.segments.insert(
                page,
                Segment {
                    end: seg.end,
                    count: seg.count,
                },
            );
        }
    }

    /// Coalesces equal-count neighbours in and directly around `[first, end)`.
    fn merge_around(&mut self, first: u64, end: u64) {
        let lo = self
            .segments
            .range(..first)
            .next_back()
            .map_or(first, |(&start, _)| start);
        let keys: Vec<u64> = self.segments.range(lo..=end).map(|(&k, _)| k).collect();

        let mut prev: Option<u64> = None;
        for key in keys {
            let Some(&seg) = self.segments.get(&key) else {
                continue;
            };
            if let Some(p) = prev {
                if let Some(prev_seg) = self.segments.get_mut(&p) {
                    if prev_seg.end == key && prev_seg.count == seg.count {
                        prev_seg.end = seg.end;
                        self.segments.remove(&key);
                        continue;
                    }
                }
            }
            prev = Some(key);
        }
    }
}

fn apply_delta(count: u32, delta: i32, page: u64) -> u32 {
    let next = i64::from(count) + i64::from(delta);
    assert!(
        next >= 0,
        "page 0x{page:x} occupancy underflow: {count} + {delta}"
    );
    next as u32
}

fn push_transition(transitions: &mut Vec<PageTransition>, start: u64, end: u64, cached: bool) {
    if let Some(last) = transitions.last_mut() {
        if last.end == start && last.cached == cached {
            last.end = end;
            return;
        }
    }
    transitions.push(PageTransition { start, end, cached });
}
