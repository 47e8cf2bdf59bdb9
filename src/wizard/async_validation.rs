use crate::error::AsyncValidatorError;
use crate::evaluator::coercion::is_blank;
use crate::model::FieldDefinition;
use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const UNVERIFIED_MESSAGE: &str = "Could not verify this value";

/// The verdict of an async validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncVerdict {
    Valid,
    /// Carries the message shown to the user.
    Invalid(String),
}

/// A validator that needs to leave the process, e.g. an availability check.
///
/// An `Err` means the validator could not decide; the field is then left in a
/// neutral "unverified" state rather than failing.
#[async_trait]
pub trait AsyncValidator: Send + Sync {
    async fn validate(&self, value: &Value) -> Result<AsyncVerdict, AsyncValidatorError>;
}

#[async_trait]
impl<F, Fut> AsyncValidator for F
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<AsyncVerdict, AsyncValidatorError>> + Send + 'static,
{
    async fn validate(&self, value: &Value) -> Result<AsyncVerdict, AsyncValidatorError> {
        (self)(value.clone()).await
    }
}

/// What to do with a field whose validator failed to reach a verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnverifiedPolicy {
    #[default]
    Allow,
    Block,
}

#[derive(Debug, Clone)]
pub struct AsyncValidationConfig {
    /// Used for fields without their own `debounce_ms`.
    pub default_debounce: Duration,
    pub unverified_policy: UnverifiedPolicy,
}

impl Default for AsyncValidationConfig {
    fn default() -> Self {
        Self {
            default_debounce: Duration::from_millis(300),
            unverified_policy: UnverifiedPolicy::Allow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncStatus {
    Idle,
    Pending,
    Valid,
    Invalid(String),
    Unverified(String),
}

/// Identifies one validator run: the field, its generation, and the value checked.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncTicket {
    pub field: String,
    pub generation: u64,
    pub value: Value,
}

#[derive(Debug, Clone)]
struct FieldSlot {
    generation: u64,
    value: Option<Value>,
    status: AsyncStatus,
}

/// Per-field async validation outcomes, guarded against out-of-order results.
#[derive(Debug, Clone, Default)]
pub struct AsyncValidationState {
    fields: AHashMap<String, FieldSlot>,
}

impl AsyncValidationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run for `value`, superseding any run still in flight.
    pub fn begin(&mut self, field: &str, value: Value) -> AsyncTicket {
        let slot = self.fields.entry(field.to_string()).or_insert(FieldSlot {
            generation: 0,
            value: None,
            status: AsyncStatus::Idle,
        });
        slot.generation += 1;
        slot.value = Some(value.clone());
        slot.status = AsyncStatus::Pending;
        AsyncTicket {
            field: field.to_string(),
            generation: slot.generation,
            value,
        }
    }

    /// Forgets the field's outcome and invalidates any run in flight.
    pub fn clear(&mut self, field: &str) {
        if let Some(slot) = self.fields.get_mut(field) {
            slot.generation += 1;
            slot.value = None;
            slot.status = AsyncStatus::Idle;
        }
    }

    /// Applies a finished run. Returns false, changing nothing, when the run is stale.
    pub fn resolve(
        &mut self,
        ticket: &AsyncTicket,
        outcome: Result<AsyncVerdict, AsyncValidatorError>,
    ) -> bool {
        let Some(slot) = self.fields.get_mut(&ticket.field) else {
            return false;
        };
        if slot.generation != ticket.generation || slot.value.as_ref() != Some(&ticket.value) {
            log::debug!(
                "Discarding stale async result for '{}' (generation {}, current {})",
                ticket.field,
                ticket.generation,
                slot.generation
            );
            return false;
        }
        slot.status = match outcome {
            Ok(AsyncVerdict::Valid) => AsyncStatus::Valid,
            Ok(AsyncVerdict::Invalid(message)) => AsyncStatus::Invalid(message),
            Err(e) => {
                log::warn!("Async validator for '{}' failed: {}", ticket.field, e);
                AsyncStatus::Unverified(UNVERIFIED_MESSAGE.to_string())
            }
        };
        true
    }

    pub fn status(&self, field: &str) -> AsyncStatus {
        self.fields
            .get(field)
            .map_or(AsyncStatus::Idle, |slot| slot.status.clone())
    }

    /// The status as it applies to `current`: an outcome for another value is `Idle`.
    pub fn status_for(&self, field: &str, current: &Value) -> AsyncStatus {
        match self.fields.get(field) {
            Some(slot) if slot.status == AsyncStatus::Pending => AsyncStatus::Pending,
            Some(slot) if slot.value.as_ref() == Some(current) => slot.status.clone(),
            _ => AsyncStatus::Idle,
        }
    }

    /// The user-facing message for the field's current outcome, if any.
    pub fn error(&self, field: &str) -> Option<String> {
        match self.status(field) {
            AsyncStatus::Invalid(message) | AsyncStatus::Unverified(message) => Some(message),
            _ => None,
        }
    }
}

/// Runs field validators on a Tokio runtime with per-field debouncing.
///
/// A new value for a field cancels that field's pending run; other fields
/// are unaffected and validate concurrently.
pub struct AsyncValidationDispatcher {
    config: AsyncValidationConfig,
    state: Arc<Mutex<AsyncValidationState>>,
    pending: Mutex<AHashMap<String, JoinHandle<()>>>,
}

impl Default for AsyncValidationDispatcher {
    fn default() -> Self {
        Self::new(AsyncValidationConfig::default())
    }
}

impl AsyncValidationDispatcher {
    pub fn new(config: AsyncValidationConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(AsyncValidationState::new())),
            pending: Mutex::new(AHashMap::new()),
        }
    }

    pub fn config(&self) -> &AsyncValidationConfig {
        &self.config
    }

    /// Schedules validation of a new value after the field's debounce delay.
    pub fn on_change(&self, field: &FieldDefinition, value: Value) {
        let delay = field
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(self.config.default_debounce);
        self.schedule(field, value, delay);
    }

    /// Validates a value immediately, without debouncing.
    pub fn validate_now(&self, field: &FieldDefinition, value: Value) {
        self.schedule(field, value, Duration::ZERO);
    }

    fn schedule(&self, field: &FieldDefinition, value: Value, delay: Duration) {
        let Some(validator) = field.async_validate.clone() else {
            return;
        };
        let name = field.name().to_string();

        if is_blank(&value) {
            self.cancel(&name);
            self.state.lock().clear(&name);
            return;
        }

        let ticket = self.state.lock().begin(&name, value);
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("No Tokio runtime to validate '{}': {}", name, e);
                self.state
                    .lock()
                    .resolve(&ticket, Err(AsyncValidatorError(e.to_string())));
                return;
            }
        };

        let state = Arc::clone(&self.state);
        let handle = runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = validator.0.validate(&ticket.value).await;
            state.lock().resolve(&ticket, outcome);
        });

        if let Some(previous) = self.pending.lock().insert(name, handle) {
            previous.abort();
        }
    }

    /// Cancels the pending run for a field, if any.
    pub fn cancel(&self, field: &str) {
        if let Some(handle) = self.pending.lock().remove(field) {
            handle.abort();
        }
    }

    /// Waits for every scheduled run to finish or be cancelled.
    pub async fn settle(&self) {
        let handles: Vec<(String, JoinHandle<()>)> = self.pending.lock().drain().collect();
        Self::join_all(handles).await;
    }

    /// Waits for the scheduled runs of the named fields only.
    pub async fn settle_fields(&self, fields: &[&str]) {
        let handles: Vec<(String, JoinHandle<()>)> = {
            let mut pending = self.pending.lock();
            fields
                .iter()
                .filter_map(|name| pending.remove(*name).map(|h| (name.to_string(), h)))
                .collect()
        };
        Self::join_all(handles).await;
    }

    async fn join_all(handles: Vec<(String, JoinHandle<()>)>) {
        for (name, handle) in handles {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::warn!("Async validation task for '{}' failed: {}", name, e);
                }
            }
        }
    }

    pub fn status(&self, field: &str) -> AsyncStatus {
        self.state.lock().status(field)
    }

    /// A copy of the current outcomes, for the step gate.
    pub fn snapshot(&self) -> AsyncValidationState {
        self.state.lock().clone()
    }
}
