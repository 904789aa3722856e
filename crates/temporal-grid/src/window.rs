//! Trailing-window sums per cell and dataset.
//!
//! For head offset `h` the window key is its tail, `h - delta + 1`, and the
//! sum covers the raw values at offsets `[tail, h]` that fall inside the
//! cell's `[min, max]` span. Once the declared offsets run out the tail keeps
//! advancing up to `max` (the trailing drain), so the sums decay to the last
//! observed values instead of stopping abruptly.

use crate::decoder::CellRecord;

/// Fixed-capacity FIFO of raw values.
#[derive(Debug, Clone)]
pub struct RingWindow {
    slots: Box<[i64]>,
    start: usize,
    len: usize,
}

impl RingWindow {
    /// Create a ring holding at most `capacity` values (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity.max(1)].into_boxed_slice(),
            start: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a value. When the ring is full the oldest value is overwritten
    /// and returned.
    pub fn push_back(&mut self, value: i64) -> Option<i64> {
        let cap = self.capacity();
        if self.len == cap {
            let overwritten = std::mem::replace(&mut self.slots[self.start], value);
            self.start = (self.start + 1) % cap;
            return Some(overwritten);
        }
        let idx = (self.start + self.len) % cap;
        self.slots[idx] = value;
        self.len += 1;
        None
    }

    /// Remove and return the oldest value.
    pub fn pop_front(&mut self) -> Option<i64> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.start];
        self.start = (self.start + 1) % self.capacity();
        self.len -= 1;
        Some(value)
    }
}

/// Window state of one cell: a ring and a running sum per dataset.
///
/// Values are kept in fixed-point units, so sums are exact.
#[derive(Debug, Clone)]
pub struct CellWindow {
    rings: Vec<RingWindow>,
    sums: Vec<i64>,
    delta: i64,
    min_offset: i64,
    max_offset: i64,
    /// Offset of the next frame to push.
    head: i64,
}

impl CellWindow {
    pub fn new(delta: u32, num_datasets: usize, min_offset: u32, max_offset: u32) -> Self {
        let delta = i64::from(delta.max(1));
        let span = i64::from(max_offset) - i64::from(min_offset) + 1;
        // Never more than delta values in the window, nor more than the span holds.
        let capacity = delta.min(span).max(1) as usize;
        Self {
            rings: (0..num_datasets)
                .map(|_| RingWindow::with_capacity(capacity))
                .collect(),
            sums: vec![0; num_datasets],
            delta,
            min_offset: i64::from(min_offset),
            max_offset: i64::from(max_offset),
            head: i64::from(min_offset),
        }
    }

    fn next_tail(&self) -> i64 {
        self.head - self.delta + 1
    }

    /// Push one frame (one raw value per dataset) at the current head.
    ///
    /// Returns the tail offset keying the updated sums.
    pub fn advance(&mut self, frame: &[u32]) -> i64 {
        let tail = self.next_tail();
        let evict = tail > self.min_offset;
        for ((ring, sum), &raw) in self.rings.iter_mut().zip(&mut self.sums).zip(frame) {
            let evicted = if evict {
                ring.pop_front().unwrap_or(0)
            } else {
                0
            };
            let value = i64::from(raw);
            ring.push_back(value);
            *sum += value - evicted;
        }
        self.head += 1;
        tail
    }

    /// Advance the tail once past the last pushed frame, with no new input.
    ///
    /// Returns `None` once the tail would pass the cell's max offset. Only
    /// meaningful after every frame of the record has been pushed.
    pub fn drain_step(&mut self) -> Option<i64> {
        let tail = self.next_tail();
        if tail > self.max_offset {
            return None;
        }
        if tail > self.min_offset {
            for (ring, sum) in self.rings.iter_mut().zip(&mut self.sums) {
                *sum -= ring.pop_front().unwrap_or(0);
            }
        }
        self.head += 1;
        Some(tail)
    }

    /// Current windowed sums, one per dataset.
    pub fn sums(&self) -> &[i64] {
        &self.sums
    }
}

/// Run the trailing window over a record, main phase then drain.
///
/// `emit` receives every tail offset with the per-dataset sums for it.
pub fn for_each_window<F>(record: &CellRecord<'_>, delta: u32, mut emit: F)
where
    F: FnMut(i64, &[i64]),
{
    let mut window = CellWindow::new(
        delta,
        record.num_datasets(),
        record.min_offset,
        record.max_offset,
    );
    for frame in record.frames() {
        let tail = window.advance(frame);
        emit(tail, window.sums());
    }
    while let Some(tail) = window.drain_step() {
        emit(tail, window.sums());
    }
}
