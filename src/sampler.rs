use tracing::{debug, info, warn};

use crate::band::{Band, Thresholds, battery_urgency};
use crate::format::format_battery_time;
use crate::system::collector::Collector;
use crate::system::history::RollingSeries;
use crate::system::network::{Baseline, NetCounters, NetDelta};
use crate::system::process::ProcessRow;
use crate::system::snapshot::{BatteryStatus, Snapshot};

/// Where snapshots come from. `Collector` reads the live host; tests script
/// their own sequences.
pub trait MetricsSource {
    fn sample(&mut self) -> Snapshot;
    fn network_counters(&self) -> NetCounters;
}

impl MetricsSource for Collector {
    fn sample(&mut self) -> Snapshot {
        Collector::sample(self)
    }

    fn network_counters(&self) -> NetCounters {
        Collector::network_counters(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeView {
    pub percent: f64,
    pub band: Band,
}

impl Default for GaugeView {
    fn default() -> Self {
        GaugeView {
            percent: 0.0,
            band: Band::Nominal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatteryView {
    pub percent: f64,
    pub plugged: bool,
    pub status: BatteryStatus,
    pub time_label: String,
    /// Band of the depletion urgency, not of the charge level.
    pub band: Band,
}

/// Display-ready values derived from the latest snapshot.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub samples: u64,
    pub cpu: GaugeView,
    pub cpu_temp_c: f32,
    pub memory: GaugeView,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk: GaugeView,
    pub disk_used: u64,
    pub disk_total: u64,
    pub network: NetDelta,
    pub battery: Option<BatteryView>,
    pub uptime_secs: u64,
    pub processes: Vec<ProcessRow>,
}

pub struct Sampler<S = Collector> {
    source: S,
    baseline: Baseline,
    thresholds: Thresholds,
    cpu_history: RollingSeries,
    ram_history: RollingSeries,
    dashboard: Dashboard,
    reset_reported: bool,
}

impl<S: MetricsSource> Sampler<S> {
    /// Captures the network baseline; this is the only place it is taken.
    pub fn new(source: S, history_length: usize, thresholds: Thresholds) -> Self {
        let baseline = Baseline::capture(source.network_counters());
        info!(
            sent = baseline.counters().sent,
            received = baseline.counters().received,
            "captured network baseline"
        );
        Self {
            source,
            baseline,
            thresholds: thresholds.normalized(),
            cpu_history: RollingSeries::new(history_length),
            ram_history: RollingSeries::new(history_length),
            dashboard: Dashboard::default(),
            reset_reported: false,
        }
    }

    pub fn tick(&mut self) -> &Dashboard {
        let snapshot = self.source.sample();
        self.ingest(snapshot)
    }

    pub fn ingest(&mut self, snapshot: Snapshot) -> &Dashboard {
        let cpu = f64::from(snapshot.cpu_percent);
        let ram = snapshot.memory_percent();
        let tick = self.cpu_history.push(cpu);
        self.ram_history.push(ram);

        let network = self.baseline.delta(snapshot.network);
        if network.counter_reset && !self.reset_reported {
            warn!(
                baseline_sent = self.baseline.counters().sent,
                baseline_received = self.baseline.counters().received,
                current_sent = snapshot.network.sent,
                current_received = snapshot.network.received,
                "network counters dropped below baseline, clamping traffic to zero"
            );
        }
        self.reset_reported = network.counter_reset;

        let battery = snapshot.battery.map(|b| {
            let percent = f64::from(b.percent);
            BatteryView {
                percent,
                plugged: b.plugged,
                status: b.status,
                time_label: format_battery_time(b.time),
                band: self.thresholds.band(battery_urgency(percent, b.plugged)),
            }
        });

        let disk_percent = snapshot.disk.percent();
        self.dashboard = Dashboard {
            samples: tick + 1,
            cpu: self.gauge(cpu),
            cpu_temp_c: snapshot.cpu_temp_c,
            memory: self.gauge(ram),
            memory_used: snapshot.memory_used,
            memory_total: snapshot.memory_total,
            disk: self.gauge(disk_percent),
            disk_used: snapshot.disk.used,
            disk_total: snapshot.disk.total,
            network,
            battery,
            uptime_secs: snapshot.uptime_secs,
            processes: snapshot.processes,
        };
        debug!(tick, cpu, ram, "sample ingested");
        &self.dashboard
    }

    fn gauge(&self, percent: f64) -> GaugeView {
        GaugeView {
            percent,
            band: self.thresholds.band(percent),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn cpu_history(&self) -> &RollingSeries {
        &self.cpu_history
    }

    pub fn ram_history(&self) -> &RollingSeries {
        &self.ram_history
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use super::*;
    use crate::system::snapshot::{BatteryReading, BatteryTime, DiskUsage};

    /// Replays queued snapshots, then repeats the last one.
    pub(crate) struct ScriptedSource {
        pub start: NetCounters,
        pub queue: VecDeque<Snapshot>,
        pub last: Snapshot,
    }

    impl ScriptedSource {
        pub(crate) fn steady(snapshot: Snapshot) -> Self {
            Self {
                start: snapshot.network,
                queue: VecDeque::new(),
                last: snapshot,
            }
        }
    }

    impl MetricsSource for ScriptedSource {
        fn sample(&mut self) -> Snapshot {
            if let Some(next) = self.queue.pop_front() {
                self.last = next;
            }
            self.last.clone()
        }

        fn network_counters(&self) -> NetCounters {
            self.start
        }
    }

    pub(crate) fn snapshot(cpu: f32, memory_used: u64) -> Snapshot {
        Snapshot {
            cpu_percent: cpu,
            cpu_temp_c: 0.0,
            memory_used,
            memory_total: 1_000,
            disk: DiskUsage {
                total: 1_000,
                used: 900,
            },
            network: NetCounters {
                sent: 10_000,
                received: 20_000,
            },
            battery: None,
            processes: vec![ProcessRow {
                pid: 1,
                name: "init".to_string(),
                cpu_percent: cpu,
                mem_percent: 0.5,
            }],
            uptime_secs: 3 * 3600 + 25 * 60,
        }
    }

    #[test]
    fn history_length_tracks_tick_count() {
        let mut sampler = Sampler::new(ScriptedSource::steady(snapshot(10.0, 500)), 60, Thresholds::default());
        for t in 0..130u64 {
            sampler.tick();
            let expected = ((t + 1) as usize).min(60);
            assert_eq!(sampler.cpu_history().len(), expected);
            assert_eq!(sampler.ram_history().len(), expected);
        }
    }

    #[test]
    fn sixty_one_ticks_keep_ticks_one_through_sixty() {
        let mut sampler = Sampler::new(ScriptedSource::steady(snapshot(10.0, 500)), 60, Thresholds::default());
        for _ in 0..61 {
            sampler.tick();
        }
        let ticks: Vec<u64> = sampler.cpu_history().iter().map(|(t, _)| t).collect();
        assert_eq!(ticks.first(), Some(&1));
        assert_eq!(ticks.last(), Some(&60));
        assert_eq!(ticks.len(), 60);
        assert_eq!(sampler.dashboard().samples, 61);
    }

    #[test]
    fn derived_values_and_bands() {
        let mut sampler = Sampler::new(ScriptedSource::steady(snapshot(59.9, 600)), 60, Thresholds::default());
        let dash = sampler.tick().clone();
        assert_eq!(dash.cpu.band, Band::Nominal);
        assert_eq!(dash.memory.band, Band::Elevated);
        assert!((dash.memory.percent - 60.0).abs() < 1e-9);
        assert_eq!(dash.disk.band, Band::Critical);
        assert_eq!(dash.uptime_secs, 3 * 3600 + 25 * 60);
        assert!(dash.battery.is_none());
    }

    #[test]
    fn network_delta_is_session_relative_and_clamped() {
        let base = snapshot(1.0, 1);
        let mut source = ScriptedSource::steady(base.clone());
        let mut grown = base.clone();
        grown.network = NetCounters {
            sent: 10_000 + 2_097_152,
            received: 20_000 + 1_048_576,
        };
        let mut dropped = base.clone();
        dropped.network = NetCounters {
            sent: 5,
            received: 20_000 + 1_048_576,
        };
        source.queue.extend([base, grown, dropped]);

        let mut sampler = Sampler::new(source, 60, Thresholds::default());
        assert_eq!(sampler.tick().network.sent, 0);

        let dash = sampler.tick();
        assert!((dash.network.sent_mb() - 2.0).abs() < 1e-9);
        assert!((dash.network.received_mb() - 1.0).abs() < 1e-9);
        assert!(!dash.network.counter_reset);

        let dash = sampler.tick();
        assert_eq!(dash.network.sent, 0);
        assert!(dash.network.counter_reset);
        assert_eq!(sampler.baseline().counters().sent, 10_000);
    }

    #[test]
    fn battery_band_reflects_depletion_urgency() {
        let mut discharging = snapshot(1.0, 1);
        discharging.battery = Some(BatteryReading {
            percent: 30.0,
            plugged: false,
            status: BatteryStatus::Discharging,
            time: BatteryTime::Remaining(Duration::from_secs(4500)),
        });
        let mut plugged = discharging.clone();
        if let Some(b) = plugged.battery.as_mut() {
            b.plugged = true;
            b.status = BatteryStatus::Charging;
            b.time = BatteryTime::PluggedIn;
        }
        let mut source = ScriptedSource::steady(discharging.clone());
        source.queue.extend([discharging, plugged]);
        let mut sampler = Sampler::new(source, 60, Thresholds::default());

        let view = sampler.tick().battery.clone().unwrap();
        assert_eq!(view.band, Band::Elevated);
        assert_eq!(view.time_label, "1h 15m");
        assert_eq!(view.percent, 30.0);

        let view = sampler.tick().battery.clone().unwrap();
        assert_eq!(view.band, Band::Nominal);
        assert_eq!(view.time_label, "Plugged In");
    }
}
