//! Periodic ingestion, one task per provider

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::domain::provider::NewsProvider;
use crate::infrastructure::services::IngestionService;

/// A provider and how often to poll it
#[derive(Debug, Clone)]
pub struct ScheduledProvider {
    pub provider: Arc<dyn NewsProvider>,
    pub period: Duration,
}

impl ScheduledProvider {
    pub fn new(provider: Arc<dyn NewsProvider>, period: Duration) -> Self {
        Self { provider, period }
    }
}

#[derive(Debug)]
pub struct IngestionScheduler {
    service: IngestionService,
    providers: Vec<ScheduledProvider>,
    run_on_startup: bool,
}

impl IngestionScheduler {
    pub fn new(service: IngestionService, providers: Vec<ScheduledProvider>) -> Self {
        Self {
            service,
            providers,
            run_on_startup: false,
        }
    }

    /// Fire the first tick immediately instead of after one full period
    pub fn with_run_on_startup(mut self, run_on_startup: bool) -> Self {
        self.run_on_startup = run_on_startup;
        self
    }

    /// Spawn one task per provider. Providers with a zero period are logged
    /// and left unscheduled.
    ///
    /// Each run completes before the task waits for its next tick, so a
    /// provider never overlaps itself; ticks missed during a slow run are
    /// skipped.
    pub fn start(self) -> SchedulerHandle {
        let tasks = self
            .providers
            .into_iter()
            .filter(|scheduled| {
                if scheduled.period.is_zero() {
                    error!(
                        provider = scheduled.provider.source().slug(),
                        "Ingestion period must be non-zero; provider not scheduled"
                    );
                    return false;
                }
                true
            })
            .map(|scheduled| {
                let service = self.service.clone();
                let run_on_startup = self.run_on_startup;

                tokio::spawn(async move {
                    let ScheduledProvider { provider, period } = scheduled;
                    let mut ticker = if run_on_startup {
                        interval(period)
                    } else {
                        interval_at(Instant::now() + period, period)
                    };
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                    info!(
                        provider = provider.source().slug(),
                        period_secs = period.as_secs(),
                        "Ingestion schedule started"
                    );

                    loop {
                        ticker.tick().await;
                        // Failures are logged by the service; the next tick retries.
                        let _ = service.run(provider.as_ref()).await;
                    }
                })
            })
            .collect();

        SchedulerHandle { tasks }
    }
}

/// Owns the spawned schedule tasks
#[derive(Debug)]
pub struct SchedulerHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every schedule task and wait for them to wind down
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }

        for task in self.tasks {
            let _ = task.await;
        }

        info!("Ingestion scheduler stopped");
    }
}
