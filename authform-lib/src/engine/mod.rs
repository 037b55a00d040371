//! The configuration-driven form engine
//!
//! [`FormEngine`] owns one form: its configuration and the artifacts derived
//! from it, the current values and field errors, and the submission state.
//! It is cheap to clone; clones share the same form.

mod builder;
mod derived;
mod options;

pub use builder::*;
pub use options::*;

use std::collections::BTreeMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::Weak;

use log::debug;
use log::trace;
use log::warn;

use self::derived::Derived;
use crate::challenge::Challenge;
use crate::error::ConfigError;
use crate::error::FieldAccessError;
use crate::error::FieldError;
use crate::field::FieldFamily;
use crate::field::FieldValue;
use crate::field::FileRef;
use crate::field::FormConfiguration;
use crate::field::FormValues;
use crate::layout::LayoutPlan;
use crate::render::ButtonProps;
use crate::render::ChallengeSurface;
use crate::render::ChangeHandler;
use crate::render::RenderPlan;
use crate::render::RenderedForm;
use crate::render::Renderers;
use crate::schema::ValidationSchema;
use crate::submit::SubmissionMachine;
use crate::submit::SubmissionState;
use crate::submit::SubmitOutcome;
use crate::submit::SubmitPhase;
use crate::submit::TokenDecision;
use crate::transport::build_payload;
use crate::transport::RequestConfig;
use crate::transport::Transport;

/// Unique identifier of an engine, used in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormId(usize);

impl FormId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "form#{}", self.0)
    }
}

/// A configuration-driven form.
///
/// # Example
///
/// ```ignore
/// use authform_lib::{FormEngine, SubmitOutcome};
/// use authform_lib::transport::{ReqwestTransport, RequestConfig};
///
/// let engine = FormEngine::builder()
///     .transport(ReqwestTransport::new())
///     .request(RequestConfig::post("https://example.com/login"))
///     .on_error(|message| eprintln!("{message}"))
///     .build()?;
///
/// engine.set_value("email", "ada@example.com")?;
/// engine.set_value("password", "hunter22")?;
///
/// match engine.submit().await {
///     SubmitOutcome::Succeeded(body) => println!("{body}"),
///     other => println!("{other:?}"),
/// }
/// ```
#[derive(Clone)]
pub struct FormEngine {
    inner: Arc<FormEngineInner>,
}

struct FormEngineInner {
    id: FormId,
    transport: Arc<dyn Transport>,
    request: RequestConfig,
    renderers: Renderers,
    display: DisplayText,
    challenge: Option<Challenge>,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    schema_override: Option<Arc<ValidationSchema>>,
    derived: RwLock<Derived>,
    values: RwLock<FormValues>,
    errors: RwLock<BTreeMap<String, FieldError>>,
    machine: SubmissionMachine,
}

/// Everything [`FormEngineBuilder::build`] hands over.
pub(crate) struct Parts {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) request: RequestConfig,
    pub(crate) renderers: Renderers,
    pub(crate) display: DisplayText,
    pub(crate) challenge: Option<Challenge>,
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) schema_override: Option<Arc<ValidationSchema>>,
    pub(crate) derived: Derived,
}

impl FormEngine {
    /// Creates a new builder for constructing an engine.
    pub fn builder() -> FormEngineBuilder<Missing, Missing> {
        FormEngineBuilder::new()
    }

    pub(crate) fn from_parts(parts: Parts) -> Self {
        let id = FormId::new();
        debug!(
            "{id}: created with {} fields ({})",
            parts.derived.config.len(),
            parts.derived.fingerprint
        );
        Self {
            inner: Arc::new(FormEngineInner {
                id,
                transport: parts.transport,
                request: parts.request,
                renderers: parts.renderers,
                display: parts.display,
                challenge: parts.challenge,
                on_success: parts.on_success,
                on_error: parts.on_error,
                schema_override: parts.schema_override,
                derived: RwLock::new(parts.derived),
                values: RwLock::new(FormValues::new()),
                errors: RwLock::new(BTreeMap::new()),
                machine: SubmissionMachine::new(),
            }),
        }
    }

    /// Returns the engine's identifier.
    pub fn id(&self) -> FormId {
        self.inner.id
    }

    // -------------------------------------------------------------------------
    // Lock helpers
    // -------------------------------------------------------------------------

    fn derived(&self) -> RwLockReadGuard<'_, Derived> {
        self.inner.derived.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn values_mut(&self) -> RwLockWriteGuard<'_, FormValues> {
        self.inner.values.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn values_ref(&self) -> RwLockReadGuard<'_, FormValues> {
        self.inner.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn errors_mut(&self) -> RwLockWriteGuard<'_, BTreeMap<String, FieldError>> {
        self.inner.errors.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn errors_ref(&self) -> RwLockReadGuard<'_, BTreeMap<String, FieldError>> {
        self.inner.errors.read().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Values
    // -------------------------------------------------------------------------

    /// Sets a field's value and validates that field.
    ///
    /// Returns the field's validation error, if any. Hidden fields are
    /// read-only, and files can only go into file or image fields.
    pub fn set_value(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Option<FieldError>, FieldAccessError> {
        let value = value.into();
        let family = self
            .derived()
            .config
            .get(name)
            .map(|field| field.family())
            .ok_or_else(|| FieldAccessError::unknown(name))?;

        match (family, &value) {
            (FieldFamily::Hidden, _) => return Err(FieldAccessError::read_only(name)),
            (FieldFamily::Text | FieldFamily::Select, FieldValue::File(_)) => {
                return Err(FieldAccessError::type_mismatch(name, "text", value.type_name()));
            }
            _ => {}
        }

        trace!("{}: {} <- {}", self.inner.id, name, value.type_name());
        self.values_mut().set(name, value);
        Ok(self.validate_field(name))
    }

    /// Stores a selected file and validates that field.
    pub fn set_file(&self, name: &str, file: FileRef) -> Result<Option<FieldError>, FieldAccessError> {
        let is_file_like = self
            .derived()
            .config
            .get(name)
            .map(|field| field.is_file_like())
            .ok_or_else(|| FieldAccessError::unknown(name))?;
        if !is_file_like {
            return Err(FieldAccessError::type_mismatch(name, "text", "file"));
        }
        self.set_value(name, file)
    }

    /// Returns a field's current value.
    ///
    /// Hidden fields hold no value here; theirs is fixed by the descriptor.
    pub fn value(&self, name: &str) -> FieldValue {
        self.values_ref().get(name).clone()
    }

    /// Returns all current values.
    pub fn values(&self) -> FormValues {
        self.values_ref().clone()
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Validates one field against the active schema and records the result.
    pub fn validate_field(&self, name: &str) -> Option<FieldError> {
        let schema = Arc::clone(&self.derived().schema);
        let error = schema.validate_field(name, &self.value(name));

        let mut errors = self.errors_mut();
        match &error {
            Some(error) => {
                errors.insert(name.to_string(), error.clone());
            }
            None => {
                errors.remove(name);
            }
        }
        error
    }

    /// Returns the recorded error of a field.
    pub fn field_error(&self, name: &str) -> Option<FieldError> {
        self.errors_ref().get(name).cloned()
    }

    /// Returns all recorded field errors in configuration order.
    pub fn errors(&self) -> Vec<FieldError> {
        let config = Arc::clone(&self.derived().config);
        let errors = self.errors_ref();
        let mut ordered: Vec<FieldError> = config
            .fields()
            .iter()
            .filter_map(|field| errors.get(&field.name).cloned())
            .collect();
        // Override schemas may validate names the configuration lacks.
        ordered.extend(
            errors
                .values()
                .filter(|error| config.get(&error.field).is_none())
                .cloned(),
        );
        ordered
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Replaces the field configuration.
    ///
    /// Derived artifacts are recomputed only when the configuration's
    /// fingerprint changes. Returns `Ok(true)` if they were. Values and
    /// errors of removed fields are dropped.
    pub fn set_configuration(&self, config: FormConfiguration) -> Result<bool, ConfigError> {
        if self.derived().matches(&config) {
            trace!("{}: configuration unchanged", self.inner.id);
            return Ok(false);
        }

        let derived = Derived::compute(config, self.inner.schema_override.as_ref())?;
        debug!(
            "{}: configuration changed to {} fields ({})",
            self.inner.id,
            derived.config.len(),
            derived.fingerprint
        );

        let config = Arc::clone(&derived.config);
        *self.inner.derived.write().unwrap_or_else(PoisonError::into_inner) = derived;
        self.values_mut().retain(|name| config.get(name).is_some());
        self.errors_mut().retain(|name, _| config.get(name).is_some());
        Ok(true)
    }

    /// Returns the active (normalized) configuration.
    pub fn configuration(&self) -> Arc<FormConfiguration> {
        Arc::clone(&self.derived().config)
    }

    /// Returns the active validation schema.
    pub fn schema(&self) -> Arc<ValidationSchema> {
        Arc::clone(&self.derived().schema)
    }

    /// Returns the active layout.
    pub fn layout(&self) -> LayoutPlan {
        self.derived().layout
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Resolves renderer props for every visible field.
    ///
    /// Change handlers in the plan write back into this engine.
    pub fn render_plan(&self) -> RenderPlan {
        let (config, layout) = {
            let derived = self.derived();
            (Arc::clone(&derived.config), derived.layout)
        };
        let values = self.values();
        let errors = self.errors_ref().clone();
        let weak = Arc::downgrade(&self.inner);
        RenderPlan::resolve(&config, layout, &values, &errors, |name| {
            change_handler(&weak, name)
        })
    }

    /// Renders the form in its current state.
    ///
    /// While the challenge is visible, the fields and submit control are
    /// replaced by the challenge surface.
    pub fn render(&self) -> RenderedForm {
        let state = self.state();
        let renderers = &self.inner.renderers;

        if state.challenge_visible {
            let challenge = self.inner.challenge.as_ref().map(|challenge| ChallengeSurface {
                site_key: challenge.site_key.clone(),
            });
            return RenderedForm::new(Vec::new(), challenge, None, state.last_error);
        }

        let fields = self.render_plan().render(renderers);
        let button = ButtonProps {
            is_loading: state.is_submitting,
            label: self.inner.display.button_label(state.is_submitting).to_string(),
        };
        RenderedForm::new(fields, None, Some((renderers, button)), state.last_error)
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Returns a snapshot of the submission state.
    pub fn state(&self) -> SubmissionState {
        self.inner.machine.snapshot()
    }

    /// Returns the current submission phase.
    pub fn phase(&self) -> SubmitPhase {
        self.inner.machine.phase()
    }

    /// Submits the form.
    ///
    /// Validates every field first. With human verification enabled, the
    /// challenge is presented and the call returns
    /// [`SubmitOutcome::ChallengePending`]; transmission then starts from
    /// [`complete_challenge`](Self::complete_challenge). Calls made while a
    /// submission is running return [`SubmitOutcome::Rejected`].
    pub async fn submit(&self) -> SubmitOutcome {
        let machine = &self.inner.machine;
        if !machine.begin_validation() {
            warn!("{}: submit ignored in phase {}", self.inner.id, machine.phase());
            return SubmitOutcome::Rejected;
        }

        let schema = Arc::clone(&self.derived().schema);
        let result = schema.validate(&self.values());
        *self.errors_mut() = result
            .errors()
            .iter()
            .map(|error| (error.field.clone(), error.clone()))
            .collect();

        if result.is_invalid() {
            debug!("{}: {} invalid fields", self.inner.id, result.errors().len());
            machine.validation_failed();
            return SubmitOutcome::Invalid(result.into_errors());
        }

        if let Some(challenge) = &self.inner.challenge {
            machine.await_challenge();
            challenge.present();
            return SubmitOutcome::ChallengePending;
        }

        machine.begin_transmit();
        self.transmit(None).await
    }

    /// Hands the challenge result to a pending submission.
    ///
    /// `None` or an empty token means the challenge was dismissed; the
    /// challenge stays pending and nothing is sent.
    pub async fn complete_challenge(&self, token: Option<&str>) -> SubmitOutcome {
        match self.inner.machine.accept_token(token) {
            TokenDecision::Rejected => SubmitOutcome::Rejected,
            TokenDecision::Dismissed => SubmitOutcome::ChallengePending,
            TokenDecision::Accepted(token) => self.transmit(Some(&token)).await,
        }
    }

    async fn transmit(&self, token: Option<&str>) -> SubmitOutcome {
        let payload = {
            let derived = self.derived();
            let values = self.values_ref();
            build_payload(&derived.config, &values, token)
        };

        debug!("{}: sending {} fields", self.inner.id, payload.len());
        let in_flight = InFlight::new(self);
        let result = self.inner.transport.send(&self.inner.request, &payload).await;
        in_flight.finish();

        let machine = &self.inner.machine;
        let outcome = match result {
            Ok(response) => {
                debug!("{}: submitted with status {}", self.inner.id, response.status);
                machine.enter_settling(None);
                if let Some(on_success) = &self.inner.on_success {
                    on_success(&response.body);
                }
                SubmitOutcome::Succeeded(response.body)
            }
            Err(error) => {
                let message = error.display_message(&self.inner.display.error_text);
                warn!("{}: submission failed: {}", self.inner.id, error);
                machine.enter_settling(Some(message.clone()));
                if let Some(on_error) = &self.inner.on_error {
                    on_error(&message);
                }
                SubmitOutcome::Failed(message)
            }
        };

        self.settle();
        outcome
    }

    /// `Settling → Idle`, then resets the challenge provider.
    fn settle(&self) {
        self.inner.machine.finish();
        if let Some(challenge) = &self.inner.challenge {
            challenge.reset();
        }
    }
}

/// Settles a transmission whose future is dropped before the transport answers.
struct InFlight<'a> {
    engine: &'a FormEngine,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn new(engine: &'a FormEngine) -> Self {
        Self {
            engine,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("{}: submission dropped while in flight", self.engine.inner.id);
        self.engine.inner.machine.enter_settling(None);
        self.engine.settle();
    }
}

fn change_handler(inner: &Weak<FormEngineInner>, name: &str) -> ChangeHandler {
    let inner = Weak::clone(inner);
    let field = name.to_string();
    ChangeHandler::new(name, move |value| {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        if let Err(error) = (FormEngine { inner }).set_value(&field, value) {
            warn!("Ignoring change: {error}");
        }
    })
}

impl std::fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormEngine")
            .field("id", &self.inner.id)
            .field("request", &self.inner.request)
            .field("challenge", &self.inner.challenge)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
