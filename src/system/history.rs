use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 60;

/// Fixed-capacity sliding window of `(tick, value)` samples.
///
/// The tick index keeps counting across evictions, so the oldest retained
/// sample after `n` pushes is always `n - capacity`.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    points: VecDeque<(u64, f64)>,
    capacity: usize,
    ticks: u64,
}

impl RollingSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            ticks: 0,
        }
    }

    /// Appends a sample and returns the tick index it was recorded under.
    pub fn push(&mut self, value: f64) -> u64 {
        let tick = self.ticks;
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back((tick, value));
        self.ticks += 1;
        tick
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples ever recorded.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn oldest_tick(&self) -> Option<u64> {
        self.points.front().map(|(tick, _)| *tick)
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.back().map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.points.iter().copied()
    }

    /// Chart-ready points with the tick as x.
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|(tick, value)| (*tick as f64, *value))
            .collect()
    }

    /// Visible x-axis window `[max(0, ticks - capacity), ticks]`.
    pub fn x_bounds(&self) -> [f64; 2] {
        let end = self.ticks;
        let start = end.saturating_sub(self.capacity as u64);
        [start as f64, end as f64]
    }
}

impl Default for RollingSeries {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
