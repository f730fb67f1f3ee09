/// Cumulative byte counters summed over all interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub sent: u64,
    pub received: u64,
}

/// Traffic since the session baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetDelta {
    pub sent: u64,
    pub received: u64,
    /// A counter dropped below its baseline (interface reset or wraparound).
    pub counter_reset: bool,
}

impl NetDelta {
    pub fn sent_mb(&self) -> f64 {
        self.sent as f64 / 1_048_576.0
    }

    pub fn received_mb(&self) -> f64 {
        self.received as f64 / 1_048_576.0
    }
}

/// Counters recorded once at startup. There is no way to move it after
/// construction.
#[derive(Debug, Clone, Copy)]
pub struct Baseline {
    counters: NetCounters,
}

impl Baseline {
    pub fn capture(counters: NetCounters) -> Self {
        Self { counters }
    }

    pub fn counters(&self) -> NetCounters {
        self.counters
    }

    pub fn delta(&self, current: NetCounters) -> NetDelta {
        let counter_reset =
            current.sent < self.counters.sent || current.received < self.counters.received;
        NetDelta {
            sent: current.sent.saturating_sub(self.counters.sent),
            received: current.received.saturating_sub(self.counters.received),
            counter_reset,
        }
    }
}
