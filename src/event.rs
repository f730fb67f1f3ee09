use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::system::maintenance::{self, MaintenanceSettings, MaintenanceTask, TaskOutcome};

#[derive(Clone, Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Resize,
    TaskFinished(TaskOutcome),
}

/// Owns the sampling period and the producer task feeding the event
/// channel. Cancelling (or dropping) the scheduler stops the ticks.
///
/// The first tick arrives one full period after construction, never at once:
/// sysinfo needs that gap after the collector's initial CPU refresh.
pub struct Scheduler {
    period: Duration,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl Scheduler {
    /// Ticks plus terminal input.
    pub fn new(period: Duration) -> Self {
        Self::spawn(period, true)
    }

    /// Ticks only, for headless use.
    pub fn ticks_only(period: Duration) -> Self {
        Self::spawn(period, false)
    }

    fn spawn(period: Duration, with_input: bool) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        let producer = tx.clone();

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut tick_interval = tokio::time::interval_at(start, period);
            tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            if !with_input {
                loop {
                    tick_interval.tick().await;
                    if producer.send(Event::Tick).is_err() {
                        break;
                    }
                }
                return;
            }

            let mut reader = event::EventStream::new();
            loop {
                tokio::select! {
                    maybe_event = reader.next() => {
                        match maybe_event {
                            Some(Ok(evt)) => {
                                let mapped = match evt {
                                    CrosstermEvent::Key(key) => Some(Event::Key(key)),
                                    CrosstermEvent::Resize(_, _) => Some(Event::Resize),
                                    _ => None,
                                };
                                if let Some(e) = mapped
                                    && producer.send(e).is_err()
                                {
                                    break;
                                }
                            }
                            Some(Err(_)) => break,
                            None => break,
                        }
                    }
                    _ = tick_interval.tick() => {
                        if producer.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            period,
            tx,
            rx,
            task: Some(task),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn runner(&self, settings: MaintenanceSettings) -> TaskRunner {
        TaskRunner {
            settings: Arc::new(settings),
            tx: self.tx.clone(),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("cancelling scheduler");
            task.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawns maintenance tasks off the UI thread and posts their outcome back
/// as `Event::TaskFinished`.
#[derive(Clone)]
pub struct TaskRunner {
    settings: Arc<MaintenanceSettings>,
    tx: mpsc::UnboundedSender<Event>,
}

impl TaskRunner {
    pub fn submit(&self, task: MaintenanceTask) {
        let settings = Arc::clone(&self.settings);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = maintenance::run(task, &settings).await;
            let _ = tx.send(Event::TaskFinished(outcome));
        });
    }
}
