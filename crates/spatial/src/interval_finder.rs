//! A recursive interval tree over a fixed one-dimensional domain.

/// Minimum node width below which nodes never split.
const MIN_SPLIT_WIDTH: f32 = 1e-6;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
struct Entry<T> {
    begin: f32,
    end: f32,
    value: T,
}

/// Answers "which entries' intervals contain x" over a fixed domain
/// `[begin, end]`.
///
/// Each tree node covers a sub-range of the domain and stores the entries
/// that straddle its midpoint; entries entirely on one side sink into the
/// matching half-width child. A node splits once more than
/// `SPLIT_THRESHOLD` entries would prefer one of its sides.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct IntervalFinder<T, const SPLIT_THRESHOLD: usize = 4> {
    begin: f32,
    end: f32,
    center: f32,
    entries: Vec<Entry<T>>,
    // Entries currently held that would fit entirely in the left/right
    // half; drives the decision to split.
    side_counts: [usize; 2],
    children: Option<Box<[IntervalFinder<T, SPLIT_THRESHOLD>; 2]>>,
}

impl<T: Clone, const SPLIT_THRESHOLD: usize> IntervalFinder<T, SPLIT_THRESHOLD> {
    /// Creates a finder over the domain `[begin, end]`; inverted bounds
    /// are swapped.
    pub fn new(begin: f32, end: f32) -> Self {
        let (begin, end) = if begin <= end { (begin, end) } else { (end, begin) };
        IntervalFinder {
            begin,
            end,
            center: 0.5 * (begin + end),
            entries: Vec::new(),
            side_counts: [0, 0],
            children: None,
        }
    }

    pub fn domain(&self) -> (f32, f32) {
        (self.begin, self.end)
    }

    /// Records that `value` covers `interval` (inclusive bounds; inverted
    /// bounds are swapped, a zero-width interval behaves as a point).
    pub fn add_entry(&mut self, interval: (f32, f32), value: T) {
        let (begin, end) = if interval.0 <= interval.1 {
            interval
        } else {
            (interval.1, interval.0)
        };

        if let Some(children) = &mut self.children {
            if end <= self.center {
                children[0].add_entry((begin, end), value);
            } else if begin >= self.center {
                children[1].add_entry((begin, end), value);
            } else {
                self.entries.push(Entry { begin, end, value });
            }
            return;
        }

        if end <= self.center {
            self.side_counts[0] += 1;
        } else if begin >= self.center {
            self.side_counts[1] += 1;
        }
        self.entries.push(Entry { begin, end, value });

        let wide_enough = self.end - self.begin > MIN_SPLIT_WIDTH;
        if wide_enough && self.side_counts.iter().any(|&c| c > SPLIT_THRESHOLD) {
            self.split();
        }
    }

    /// Appends to `out` every value whose interval contains `x`. Values
    /// are appended in no particular order; a value inserted more than
    /// once may appear more than once.
    pub fn find_entries(&self, x: f32, out: &mut Vec<T>) {
        if x < self.begin || x > self.end {
            return;
        }
        for e in &self.entries {
            if e.begin <= x && x <= e.end {
                out.push(e.value.clone());
            }
        }
        if let Some(children) = &self.children {
            children[0].find_entries(x, out);
            children[1].find_entries(x, out);
        }
    }

    fn split(&mut self) {
        debug_assert!(self.children.is_none());
        let mut children = Box::new([
            IntervalFinder::new(self.begin, self.center),
            IntervalFinder::new(self.center, self.end),
        ]);
        for e in core::mem::take(&mut self.entries) {
            if e.end <= self.center {
                children[0].add_entry((e.begin, e.end), e.value);
            } else if e.begin >= self.center {
                children[1].add_entry((e.begin, e.end), e.value);
            } else {
                self.entries.push(e);
            }
        }
        self.side_counts = [0, 0];
        self.children = Some(children);
    }
}
