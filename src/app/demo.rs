//! Demo Modules
//!
//! A small set of modules the host registers so that a plain run exercises
//! the engine: `Clock` is a hard dependency of `EventLog` and `Heartbeat`,
//! `Stats` depends on whatever provides `EventSink`, and the soft uses
//! between `Stats`, `Heartbeat` and the sink are filled opportunistically.

use crate::module::api::{Capabilities, HookResult, Module, ModuleManager, ModuleResult, Slot, Slots};
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Default period of the heartbeat task
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Capability of modules that collect event lines
pub trait EventSink: Send + Sync {
    fn record(&self, event: String);
}

/// Uptime source shared by the other demo modules
#[derive(Debug, Default)]
pub struct Clock {
    started: Mutex<Option<Instant>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time since `start`, zero before that
    pub fn uptime(&self) -> Duration {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|at| at.elapsed())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Module for Clock {
    async fn start(&self) -> HookResult {
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        Ok(())
    }
}

/// In-memory event journal stamped with the clock's uptime
#[derive(Default)]
pub struct EventLog {
    clock: Slot<Clock>,
    entries: Mutex<Vec<String>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for EventLog {
    fn record(&self, event: String) {
        let at = self.clock.get().map(|c| c.uptime()).unwrap_or_default();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("[{:>9.3}s] {}", at.as_secs_f64(), event));
    }
}

#[async_trait::async_trait]
impl Module for EventLog {
    async fn init(&self) -> HookResult {
        self.record("event log opened".to_string());
        Ok(())
    }

    async fn save(&self) -> HookResult {
        self.log_info(&format!("{} event(s) recorded", self.entries().len()));
        Ok(())
    }

    fn declare<'a>(&'a self, slots: &mut Slots<'a>) {
        slots.depends(&self.clock);
    }

    fn provide(self: Arc<Self>, capabilities: &mut Capabilities) {
        capabilities.provide::<dyn EventSink>(self);
    }
}

/// Periodic task that counts beats and reports them to the sink, if any
pub struct Heartbeat {
    clock: Slot<Clock>,
    sink: Slot<dyn EventSink>,
    interval: Duration,
    beats: Arc<AtomicU64>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Heartbeat {
    pub fn new(interval: Duration) -> Self {
        Self {
            clock: Slot::new(),
            sink: Slot::new(),
            interval,
            beats: Arc::new(AtomicU64::new(0)),
            task: Mutex::new(None),
        }
    }

    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl Module for Heartbeat {
    async fn start(&self) -> HookResult {
        let clock = self.clock.get().cloned().ok_or("clock not injected")?;
        let sink = self.sink.get().cloned();
        let beats = self.beats.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let beat = beats.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(sink) = &sink {
                    sink.record(format!(
                        "heartbeat {} at {:.1}s uptime",
                        beat,
                        clock.uptime().as_secs_f64()
                    ));
                }
            }
        });
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    async fn stop(&self) -> HookResult {
        if let Some(handle) = self.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
        self.log_info(&format!("stopped after {} beat(s)", self.beats()));
        Ok(())
    }

    fn declare<'a>(&'a self, slots: &mut Slots<'a>) {
        slots.depends(&self.clock).uses(&self.sink);
    }
}

/// Reports lifecycle events to the sink and summarizes at shutdown
#[derive(Default)]
pub struct Stats {
    sink: Slot<dyn EventSink>,
    heartbeat: Slot<Heartbeat>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_heartbeat(&self) -> bool {
        self.heartbeat.is_set()
    }

    fn sink(&self) -> Result<&Arc<dyn EventSink>, &'static str> {
        self.sink.get().ok_or("event sink not injected")
    }
}

#[async_trait::async_trait]
impl Module for Stats {
    async fn start(&self) -> HookResult {
        self.sink()?.record("stats online".to_string());
        Ok(())
    }

    async fn stop(&self) -> HookResult {
        let summary = match self.heartbeat.get() {
            Some(heartbeat) => format!("stats offline, {} heartbeat(s) seen", heartbeat.beats()),
            None => "stats offline, no heartbeat".to_string(),
        };
        self.sink()?.record(summary);
        Ok(())
    }

    fn declare<'a>(&'a self, slots: &mut Slots<'a>) {
        slots.depends(&self.sink).uses(&self.heartbeat);
    }
}

/// Register every demo module whose name `is_disabled` rejects
///
/// Returns the names of the registered modules.
pub fn register_demo_modules(
    manager: &ModuleManager,
    heartbeat_interval: Duration,
    is_disabled: impl Fn(&str) -> bool,
) -> ModuleResult<Vec<String>> {
    let mut registered = Vec::new();
    register(manager, Clock::new(), &is_disabled, &mut registered)?;
    register(manager, EventLog::new(), &is_disabled, &mut registered)?;
    register(manager, Stats::new(), &is_disabled, &mut registered)?;
    register(
        manager,
        Heartbeat::new(heartbeat_interval),
        &is_disabled,
        &mut registered,
    )?;
    Ok(registered)
}

fn register<M: Module>(
    manager: &ModuleManager,
    module: M,
    is_disabled: &impl Fn(&str) -> bool,
    registered: &mut Vec<String>,
) -> ModuleResult<()> {
    let name = module.name();
    if is_disabled(&name) {
        info!("Module '{}' is disabled", name);
        return Ok(());
    }
    manager.add_module(module)?;
    registered.push(name);
    Ok(())
}
