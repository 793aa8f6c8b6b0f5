/*!
 * Recording controller implementations.
 *
 * These controllers perform no translation. They keep the run state the
 * engine expects, and append every call they receive to a shared
 * [`CallLog`], so tests and the simulator can check exactly which side
 * effects the engine issued:
 * - `RecordingDomTranslator::working()` - honours its contract
 * - `RecordingDomTranslator::forgets_direction()` - runs without reporting a direction
 * - `RecordingDomTranslator::failing_run()` - refuses to start
 * - `RecordingSelectionFactory::stalling_from(n)` - builds selection
 *   translators whose `start` is accepted but never takes effect, from the
 *   n-th instance on
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use super::{DomTranslator, SelectionTranslator, SelectionTranslatorFactory, SelectionTranslatorOptions};
use crate::app_config::PageTranslatorConfig;
use crate::errors::ControllerError;
use crate::state::TranslateDirection;

/// One side effect issued by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ControllerCall {
    DomRun { direction: TranslateDirection },
    DomStop,
    DomConfigure,
    SelectionCreated { instance: usize },
    SelectionStart { instance: usize },
    SelectionStop { instance: usize },
    SelectionDropped { instance: usize },
}

impl ControllerCall {
    /// Whether this call starts or stops a controller
    pub fn is_run_toggle(&self) -> bool {
        matches!(
            self,
            Self::DomRun { .. } | Self::DomStop | Self::SelectionStart { .. } | Self::SelectionStop { .. }
        )
    }
}

/// Shared, ordered record of controller calls
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<ControllerCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: ControllerCall) {
        self.calls.lock().push(call);
    }

    /// Copy of every call so far
    pub fn calls(&self) -> Vec<ControllerCall> {
        self.calls.lock().clone()
    }

    /// Number of calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&ControllerCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(*call)).count()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Behavior mode for the recording DOM translator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomBehavior {
    /// Honours the controller contract
    Working,
    /// Reports running but no direction
    ForgetsDirection,
    /// `run` always fails
    FailingRun,
}

#[derive(Debug)]
struct DomInner {
    running: bool,
    direction: Option<TranslateDirection>,
    config: Option<PageTranslatorConfig>,
}

/// DOM translator that only records what it is asked to do
#[derive(Debug, Clone)]
pub struct RecordingDomTranslator {
    behavior: DomBehavior,
    latency: Option<Duration>,
    inner: Arc<Mutex<DomInner>>,
    log: CallLog,
}

impl RecordingDomTranslator {
    pub fn new(behavior: DomBehavior, log: CallLog) -> Self {
        Self {
            behavior,
            latency: None,
            inner: Arc::new(Mutex::new(DomInner {
                running: false,
                direction: None,
                config: None,
            })),
            log,
        }
    }

    pub fn working(log: CallLog) -> Self {
        Self::new(DomBehavior::Working, log)
    }

    pub fn forgets_direction(log: CallLog) -> Self {
        Self::new(DomBehavior::ForgetsDirection, log)
    }

    pub fn failing_run(log: CallLog) -> Self {
        Self::new(DomBehavior::FailingRun, log)
    }

    /// Make every call suspend for `latency` before taking effect
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Last configuration pushed by the engine
    pub fn configuration(&self) -> Option<PageTranslatorConfig> {
        self.inner.lock().config.clone()
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl DomTranslator for RecordingDomTranslator {
    fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    fn current_direction(&self) -> Option<TranslateDirection> {
        let inner = self.inner.lock();
        match self.behavior {
            DomBehavior::ForgetsDirection => None,
            _ => inner.direction.clone(),
        }
    }

    async fn run(&self, direction: &TranslateDirection) -> Result<(), ControllerError> {
        self.pause().await;
        if self.behavior == DomBehavior::FailingRun {
            return Err(ControllerError::Failed(format!(
                "cannot translate page {}",
                direction
            )));
        }

        {
            let mut inner = self.inner.lock();
            inner.running = true;
            inner.direction = Some(direction.clone());
        }
        self.log.record(ControllerCall::DomRun {
            direction: direction.clone(),
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), ControllerError> {
        self.pause().await;
        {
            let mut inner = self.inner.lock();
            inner.running = false;
            inner.direction = None;
        }
        self.log.record(ControllerCall::DomStop);
        Ok(())
    }

    async fn update_configuration(&self, config: &PageTranslatorConfig) -> Result<(), ControllerError> {
        self.pause().await;
        self.inner.lock().config = Some(config.clone());
        self.log.record(ControllerCall::DomConfigure);
        Ok(())
    }
}

/// Selection translator built by [`RecordingSelectionFactory`]
pub struct RecordingSelectionTranslator {
    instance: usize,
    stalled: bool,
    running: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    log: CallLog,
}

#[async_trait]
impl SelectionTranslator for RecordingSelectionTranslator {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn start(&self) -> Result<(), ControllerError> {
        if !self.stalled {
            self.running.store(true, Ordering::SeqCst);
        }
        self.log.record(ControllerCall::SelectionStart {
            instance: self.instance,
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), ControllerError> {
        self.running.store(false, Ordering::SeqCst);
        self.log.record(ControllerCall::SelectionStop {
            instance: self.instance,
        });
        Ok(())
    }
}

impl Drop for RecordingSelectionTranslator {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        self.log.record(ControllerCall::SelectionDropped {
            instance: self.instance,
        });
    }
}

/// Observer view of one selection translator built by the factory
#[derive(Debug, Clone)]
pub struct SelectionHandle {
    pub instance: usize,
    pub options: SelectionTranslatorOptions,
    running: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
}

impl SelectionHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// False once the engine has discarded the instance
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

/// Factory keeping a handle on every selection translator it builds
#[derive(Clone, Default)]
pub struct RecordingSelectionFactory {
    next_instance: Arc<AtomicUsize>,
    stall_from: Option<usize>,
    handles: Arc<Mutex<Vec<SelectionHandle>>>,
    log: CallLog,
}

impl RecordingSelectionFactory {
    pub fn new(log: CallLog) -> Self {
        Self {
            next_instance: Arc::new(AtomicUsize::new(0)),
            stall_from: None,
            handles: Arc::new(Mutex::new(Vec::new())),
            log,
        }
    }

    /// Instances numbered `instance` and above never actually start
    pub fn stalling_from(log: CallLog, instance: usize) -> Self {
        Self {
            stall_from: Some(instance),
            ..Self::new(log)
        }
    }

    /// Number of instances built so far
    pub fn created(&self) -> usize {
        self.handles.lock().len()
    }

    /// The most recently built instance that has not been discarded
    pub fn current(&self) -> Option<SelectionHandle> {
        self.handles
            .lock()
            .iter()
            .rev()
            .find(|handle| handle.is_alive())
            .cloned()
    }

    /// Number of instances not yet discarded
    pub fn alive(&self) -> usize {
        self.handles.lock().iter().filter(|handle| handle.is_alive()).count()
    }
}

impl SelectionTranslatorFactory for RecordingSelectionFactory {
    fn create(&self, options: SelectionTranslatorOptions) -> Box<dyn SelectionTranslator> {
        let instance = self.next_instance.fetch_add(1, Ordering::SeqCst) + 1;
        let running = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));

        self.handles.lock().push(SelectionHandle {
            instance,
            options,
            running: Arc::clone(&running),
            alive: Arc::clone(&alive),
        });
        self.log.record(ControllerCall::SelectionCreated { instance });

        Box::new(RecordingSelectionTranslator {
            instance,
            stalled: self.stall_from.is_some_and(|first| instance >= first),
            running,
            alive,
            log: self.log.clone(),
        })
    }
}
