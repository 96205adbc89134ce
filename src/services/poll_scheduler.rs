//! Poll scheduler.
//!
//! Periodically asks every registered source for updates and forwards
//! the resulting change events to the notifier. A failing source is
//! logged and skipped; it never holds back the others.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::{Notify, RwLock};
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::domain::errors::{SourceError, SourceResult};
use crate::domain::models::ChangeEvent;
use crate::domain::ports::{Notifier, Source};

/// Configuration for the poll scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between two ticks.
    pub interval: Duration,
    /// Whether to tick immediately when the loop starts.
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3_600),
            run_on_startup: false,
        }
    }
}

impl SchedulerConfig {
    /// Create config ticking every `hours` hours.
    pub fn from_hours(hours: u64) -> Self {
        Self {
            interval: Duration::from_secs(hours.saturating_mul(3_600)),
            ..Default::default()
        }
    }
}

/// A source that failed during a tick.
#[derive(Debug)]
pub struct SourceFailure {
    /// Name of the failing source.
    pub source: String,
    /// What went wrong.
    pub error: SourceError,
}

/// Outcome of one pass over all sources.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Sources whose baseline was (re)established this tick.
    pub initialized: usize,
    /// Sources successfully checked for updates.
    pub checked: usize,
    /// Events forwarded to the notifier, in registration order.
    pub events: Vec<ChangeEvent>,
    /// Sources that failed.
    pub failures: Vec<SourceFailure>,
}

impl TickReport {
    /// True when no source failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Status of the scheduler.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus {
    /// Whether the loop is running.
    pub running: bool,
    /// Ticks completed.
    pub ticks: u64,
    /// Events handed to the notifier.
    pub events_published: u64,
    /// Source failures across all ticks.
    pub failures: u64,
    /// When the last tick finished.
    pub last_tick: Option<DateTime<Utc>>,
}

/// Handle to control a running scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
    status: Arc<RwLock<SchedulerStatus>>,
}

impl SchedulerHandle {
    /// Request the scheduler to stop.
    ///
    /// A tick in progress is finished first.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Check if stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    /// Get current scheduler status.
    pub async fn status(&self) -> SchedulerStatus {
        self.status.read().await.clone()
    }
}

enum Outcome {
    Initialized,
    Checked(Vec<ChangeEvent>),
}

/// Drives all registered sources on a fixed interval.
pub struct PollScheduler {
    sources: Vec<Box<dyn Source>>,
    notifier: Arc<dyn Notifier>,
    config: SchedulerConfig,
    status: Arc<RwLock<SchedulerStatus>>,
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl PollScheduler {
    /// Create a scheduler with no sources.
    pub fn new(notifier: Arc<dyn Notifier>, config: SchedulerConfig) -> Self {
        Self {
            sources: Vec::new(),
            notifier,
            config,
            status: Arc::new(RwLock::new(SchedulerStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Register a source. Sources are polled in registration order.
    pub fn register(&mut self, source: Box<dyn Source>) {
        if self.sources.iter().any(|s| s.identity() == source.identity()) {
            tracing::warn!(source = %source.identity(), "Registering duplicate source name");
        }
        tracing::debug!(source = %source.identity(), target = %source.describe(), "Registered source");
        self.sources.push(source);
    }

    /// Register several sources.
    #[must_use]
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = Box<dyn Source>>) -> Self {
        for source in sources {
            self.register(source);
        }
        self
    }

    /// Names of the registered sources, in registration order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.identity()).collect()
    }

    /// The registered sources.
    pub fn sources(&self) -> &[Box<dyn Source>] {
        &self.sources
    }

    /// Get a handle to control the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            stop_flag: Arc::clone(&self.stop_flag),
            wake: Arc::clone(&self.wake),
            status: Arc::clone(&self.status),
        }
    }

    /// Initialize every source that has no baseline yet.
    ///
    /// Failures are reported, not fatal: a source that fails here is
    /// initialized again on the next tick.
    pub async fn initialize_all(&mut self) -> TickReport {
        let results = join_all(
            self.sources
                .iter_mut()
                .filter(|source| !source.is_initialized())
                .map(|source| async move {
                    let result = source.initialize().await.map(|()| Outcome::Initialized);
                    (source.identity().to_string(), result)
                }),
        )
        .await;

        self.collect(results).await
    }

    /// Run one pass over all sources.
    ///
    /// Initialized sources are checked for updates concurrently; sources
    /// without a baseline are initialized instead. Events are forwarded to
    /// the notifier in registration order once every source has answered.
    pub async fn tick(&mut self) -> TickReport {
        let started = Instant::now();
        let results = join_all(self.sources.iter_mut().map(|source| async move {
            let result = if source.is_initialized() {
                source.check_for_updates().await.map(Outcome::Checked)
            } else {
                source.initialize().await.map(|()| Outcome::Initialized)
            };
            (source.identity().to_string(), result)
        }))
        .await;

        let report = self.collect(results).await;

        {
            let mut status = self.status.write().await;
            status.ticks += 1;
            status.events_published += report.events.len() as u64;
            status.failures += report.failures.len() as u64;
            status.last_tick = Some(Utc::now());
        }

        tracing::info!(
            sources = self.sources.len(),
            checked = report.checked,
            initialized = report.initialized,
            events = report.events.len(),
            failures = report.failures.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Poll tick complete"
        );

        report
    }

    /// Run ticks on the configured interval until stopped.
    pub async fn run(mut self) {
        self.status.write().await.running = true;
        tracing::info!(
            sources = self.sources.len(),
            interval_secs = self.config.interval.as_secs(),
            "Poll scheduler started"
        );

        let mut timer = interval(self.config.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.config.run_on_startup {
            // The first tick of a tokio interval completes immediately.
            timer.tick().await;
        }

        loop {
            if self.stop_flag.load(Ordering::Acquire) {
                break;
            }

            tokio::select! {
                _ = timer.tick() => {}
                () = self.wake.notified() => {}
            }

            if self.stop_flag.load(Ordering::Acquire) {
                break;
            }

            self.tick().await;
        }

        self.status.write().await.running = false;
        tracing::info!("Poll scheduler stopped");
    }

    async fn collect(&self, results: Vec<(String, SourceResult<Outcome>)>) -> TickReport {
        let mut report = TickReport::default();

        for (name, result) in results {
            match result {
                Ok(Outcome::Initialized) => report.initialized += 1,
                Ok(Outcome::Checked(events)) => {
                    report.checked += 1;
                    for event in events {
                        self.notifier.notify(&event).await;
                        report.events.push(event);
                    }
                }
                Err(error) => {
                    match &error {
                        SourceError::RateLimitExceeded { reset_at } => tracing::warn!(
                            source = %name,
                            reset_at = ?reset_at,
                            "GitHub rate limit exhausted, skipping source this tick"
                        ),
                        _ => tracing::warn!(
                            source = %name,
                            error = %error,
                            retryable = error.is_retryable(),
                            "Source poll failed"
                        ),
                    }
                    report.failures.push(SourceFailure {
                        source: name,
                        error,
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::models::ChangeKind;

    /// Source replaying scripted results.
    struct ScriptedSource {
        name: String,
        initialized: bool,
        init_results: VecDeque<SourceResult<()>>,
        check_results: VecDeque<SourceResult<Vec<ChangeEvent>>>,
    }

    impl ScriptedSource {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                initialized: false,
                init_results: VecDeque::new(),
                check_results: VecDeque::new(),
            }
        }

        fn init_fails(mut self, error: SourceError) -> Self {
            self.init_results.push_back(Err(error));
            self
        }

        fn check(mut self, result: SourceResult<Vec<ChangeEvent>>) -> Self {
            self.check_results.push_back(result);
            self
        }
    }

    #[async_trait]
    impl Source for ScriptedSource {
        async fn initialize(&mut self) -> SourceResult<()> {
            self.init_results.pop_front().unwrap_or(Ok(()))?;
            self.initialized = true;
            Ok(())
        }

        async fn check_for_updates(&mut self) -> SourceResult<Vec<ChangeEvent>> {
            self.check_results.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }

        fn identity(&self) -> &str {
            &self.name
        }

        fn is_initialized(&self) -> bool {
            self.initialized
        }

        fn describe(&self) -> String {
            format!("scripted {}", self.name)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<ChangeEvent>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn publish(&self, _payload: Vec<u8>) {}

        async fn notify(&self, event: &ChangeEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn channel_name(&self) -> &str {
            "recording"
        }
    }

    fn event(source: &str) -> ChangeEvent {
        ChangeEvent::new(source, ChangeKind::NewComments, json!(0), json!(1))
    }

    fn scheduler(notifier: &Arc<RecordingNotifier>) -> PollScheduler {
        PollScheduler::new(
            Arc::clone(notifier) as Arc<dyn Notifier>,
            SchedulerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_failing_source_does_not_block_others() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(&notifier).with_sources([
            Box::new(ScriptedSource::new("a").check(Err(SourceError::Remote {
                status: 500,
                body: String::new(),
            }))) as Box<dyn Source>,
            Box::new(ScriptedSource::new("b").check(Ok(vec![event("b")]))),
        ]);

        let init = scheduler.initialize_all().await;
        assert_eq!(init.initialized, 2);

        let report = scheduler.tick().await;
        assert_eq!(report.checked, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source, "a");
        assert_eq!(report.events.len(), 1);
        assert_eq!(notifier.events.lock().unwrap()[0].source_name, "b");
    }

    #[tokio::test]
    async fn test_uninitialized_source_retried_on_tick() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(&notifier).with_sources([Box::new(
            ScriptedSource::new("flaky").init_fails(SourceError::RateLimitExceeded { reset_at: None }),
        ) as Box<dyn Source>]);

        let init = scheduler.initialize_all().await;
        assert_eq!(init.initialized, 0);
        assert_eq!(init.failures.len(), 1);
        assert!(!scheduler.sources()[0].is_initialized());

        let report = scheduler.tick().await;
        assert_eq!(report.initialized, 1);
        assert_eq!(report.checked, 0);
        assert!(report.is_clean());
        assert!(scheduler.sources()[0].is_initialized());
    }

    #[tokio::test]
    async fn test_events_forwarded_in_registration_order() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(&notifier).with_sources([
            Box::new(ScriptedSource::new("first").check(Ok(vec![event("first"), event("first")])))
                as Box<dyn Source>,
            Box::new(ScriptedSource::new("second").check(Ok(vec![event("second")]))),
        ]);
        scheduler.initialize_all().await;

        scheduler.tick().await;
        let names: Vec<String> = notifier
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.source_name.clone())
            .collect();
        assert_eq!(names, vec!["first", "first", "second"]);

        let status = scheduler.handle().status().await;
        assert_eq!(status.ticks, 1);
        assert_eq!(status.events_published, 3);
        assert!(status.last_tick.is_some());
    }

    #[tokio::test]
    async fn test_source_names_in_registration_order() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(&notifier);
        scheduler.register(Box::new(ScriptedSource::new("z")));
        scheduler.register(Box::new(ScriptedSource::new("a")));
        assert_eq!(scheduler.source_names(), vec!["z", "a"]);
    }

    #[tokio::test]
    async fn test_run_ticks_until_stopped() {
        let notifier = Arc::new(RecordingNotifier::default());
        let config = SchedulerConfig {
            interval: Duration::from_millis(20),
            run_on_startup: true,
        };
        let scheduler = PollScheduler::new(Arc::clone(&notifier) as Arc<dyn Notifier>, config)
            .with_sources([Box::new(ScriptedSource::new("s")) as Box<dyn Source>]);
        let handle = scheduler.handle();

        let task = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("scheduler should stop")
            .unwrap();

        let status = handle.status().await;
        assert!(!status.running);
        assert!(status.ticks >= 2, "ticks: {}", status.ticks);
        assert!(handle.is_stop_requested());
    }

    #[tokio::test]
    async fn test_stop_before_run_exits_immediately() {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = scheduler(&notifier);
        let handle = scheduler.handle();
        handle.stop();

        tokio::time::timeout(Duration::from_secs(1), scheduler.run())
            .await
            .expect("scheduler should not wait for the interval");
        assert_eq!(handle.status().await.ticks, 0);
    }

    #[test]
    fn test_config_from_hours() {
        assert_eq!(SchedulerConfig::from_hours(2).interval, Duration::from_secs(7_200));
        assert!(!SchedulerConfig::from_hours(1).run_on_startup);
    }
}
