//! End-to-end submission tests against recording fakes.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::FutureExt;
use serde_json::json;
use serde_json::Value;

use authform_lib::error::TransportError;
use authform_lib::field::FieldDescriptor;
use authform_lib::field::FileRef;
use authform_lib::field::FormConfiguration;
use authform_lib::render::Markup;
use authform_lib::render::SelectProps;
use authform_lib::render::SelectRenderer;
use authform_lib::transport::Payload;
use authform_lib::transport::RequestConfig;
use authform_lib::transport::Transport;
use authform_lib::transport::TransportResponse;
use authform_lib::ChallengeProvider;
use authform_lib::FormEngine;
use authform_lib::SubmitOutcome;
use authform_lib::SubmitPhase;

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct RecordingTransport {
    payloads: Mutex<Vec<Value>>,
    multipart: Mutex<Vec<bool>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    reply: Mutex<Option<Result<TransportResponse, TransportError>>>,
}

impl RecordingTransport {
    fn failing(error: TransportError) -> Self {
        Self {
            reply: Mutex::new(Some(Err(error))),
            ..Default::default()
        }
    }

    fn gated() -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let transport = Self {
            gate: Mutex::new(Some(rx)),
            ..Default::default()
        };
        (transport, tx)
    }

    fn calls(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }

    fn last_payload(&self) -> Value {
        self.payloads.lock().unwrap().last().cloned().unwrap_or(Value::Null)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        _request: &RequestConfig,
        payload: &Payload,
    ) -> Result<TransportResponse, TransportError> {
        self.payloads.lock().unwrap().push(payload.to_json());
        self.multipart.lock().unwrap().push(payload.has_files());

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(TransportResponse::new(201, json!({ "id": 7 }))))
    }
}

#[derive(Clone, Default)]
struct RecordingChallenge {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingChallenge {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ChallengeProvider for RecordingChallenge {
    fn present(&self, site_key: &str) {
        self.events.lock().unwrap().push(format!("present:{site_key}"));
    }

    fn reset(&self) {
        self.events.lock().unwrap().push("reset".into());
    }
}

fn registration() -> FormConfiguration {
    FormConfiguration::new(vec![
        FieldDescriptor::text("name").placeholder("Full name"),
        FieldDescriptor::email("email").placeholder("Email"),
        FieldDescriptor::password("password").placeholder("Password"),
        FieldDescriptor::number("age").placeholder("Age"),
        FieldDescriptor::text("accountTypeId"),
    ])
}

fn engine_with(transport: Arc<RecordingTransport>, config: FormConfiguration) -> FormEngine {
    FormEngine::builder()
        .shared_transport(transport)
        .request(RequestConfig::post("http://localhost/register"))
        .config(config)
        .build()
        .unwrap()
}

fn fill(engine: &FormEngine) {
    engine.set_value("name", "Ada Lovelace").unwrap();
    engine.set_value("email", "ada@example.com").unwrap();
    engine.set_value("password", "analytical").unwrap();
    engine.set_value("age", "36").unwrap();
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_empty_form_reports_one_required_error_per_field() {
    let transport = Arc::new(RecordingTransport::default());
    let engine = engine_with(transport.clone(), registration());

    let SubmitOutcome::Invalid(errors) = engine.submit().await else {
        panic!("expected validation failure");
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, ["name", "email", "password", "age"]);
    assert!(errors.iter().all(|e| e.is("required")));
    assert_eq!(errors[0].message, "Full name is required");
    assert_eq!(transport.calls(), 0);
    assert_eq!(engine.state().last_error, None);
}

#[tokio::test]
async fn test_invalid_email_is_reported_alone() {
    let transport = Arc::new(RecordingTransport::default());
    let engine = engine_with(transport.clone(), registration());
    fill(&engine);
    engine.set_value("email", "ada.example.com").unwrap();

    let SubmitOutcome::Invalid(errors) = engine.submit().await else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "email");
    assert_eq!(errors[0].message, "Invalid email format");
    assert_eq!(transport.calls(), 0);
}

// =============================================================================
// Transmission
// =============================================================================

#[tokio::test]
async fn test_valid_form_sends_once_with_coerced_numbers() {
    let transport = Arc::new(RecordingTransport::default());
    let successes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&successes);
    let engine = FormEngine::builder()
        .shared_transport(transport.clone())
        .request(RequestConfig::post("http://localhost/register"))
        .config(registration())
        .on_success(move |body| sink.lock().unwrap().push(body.clone()))
        .build()
        .unwrap();
    fill(&engine);

    let outcome = engine.submit().await;
    assert_eq!(outcome, SubmitOutcome::Succeeded(json!({ "id": 7 })));
    assert_eq!(transport.calls(), 1);
    assert_eq!(
        transport.last_payload(),
        json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "analytical",
            "age": 36,
            "accountTypeId": 1,
        })
    );
    assert_eq!(*successes.lock().unwrap(), [json!({ "id": 7 })]);

    let state = engine.state();
    assert_eq!(state.phase, SubmitPhase::Idle);
    assert!(!state.is_submitting);
    assert!(!state.challenge_visible);
}

#[tokio::test]
async fn test_reserved_field_is_never_rendered_but_always_sent() {
    let transport = Arc::new(RecordingTransport::default());
    let engine = engine_with(transport.clone(), registration());

    let rendered = engine.render();
    assert_eq!(rendered.field_names(), ["name", "email", "password", "age"]);
    assert!(!rendered.to_html().contains("accountTypeId"));
    assert!(engine.set_value("accountTypeId", "5").is_err());

    fill(&engine);
    engine.submit().await;
    assert_eq!(transport.last_payload()["accountTypeId"], json!(1));
}

#[tokio::test]
async fn test_failure_message_falls_back_to_display_text() {
    let transport = Arc::new(RecordingTransport::failing(TransportError::other("")));
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let engine = FormEngine::builder()
        .shared_transport(transport.clone())
        .request(RequestConfig::post("http://localhost/login"))
        .on_error(move |message| sink.lock().unwrap().push(message.to_string()))
        .build()
        .unwrap();
    engine.set_value("email", "ada@example.com").unwrap();
    engine.set_value("password", "analytical").unwrap();

    assert_eq!(
        engine.submit().await,
        SubmitOutcome::Failed("Something went wrong.".into())
    );
    assert_eq!(*errors.lock().unwrap(), ["Something went wrong."]);
    assert_eq!(engine.state().last_error.as_deref(), Some("Something went wrong."));

    // The stored error survives until the next transmission starts.
    engine.set_value("password", "").unwrap();
    assert!(matches!(engine.submit().await, SubmitOutcome::Invalid(_)));
    assert_eq!(engine.state().last_error.as_deref(), Some("Something went wrong."));
}

#[tokio::test]
async fn test_files_switch_payload_to_multipart() {
    let transport = Arc::new(RecordingTransport::default());
    let engine = engine_with(
        transport.clone(),
        FormConfiguration::new(vec![
            FieldDescriptor::email("email"),
            FieldDescriptor::image("avatar").label("Avatar"),
        ]),
    );
    engine.set_value("email", "ada@example.com").unwrap();

    let error = engine
        .set_file("avatar", FileRef::new("notes.txt", "text/plain", b"hi".to_vec()))
        .unwrap();
    assert_eq!(
        error.map(|e| e.message),
        Some("Only image files are allowed (jpg, png)".to_string())
    );

    let error = engine
        .set_file("avatar", FileRef::new("me.png", "image/png", vec![1, 2, 3]))
        .unwrap();
    assert_eq!(error, None);

    assert!(engine.submit().await.is_success());
    assert_eq!(*transport.multipart.lock().unwrap(), [true]);
    assert_eq!(transport.last_payload()["avatar"]["name"], json!("me.png"));
}

// =============================================================================
// Challenge
// =============================================================================

#[tokio::test]
async fn test_challenge_gates_transmission() {
    let transport = Arc::new(RecordingTransport::default());
    let challenge = RecordingChallenge::default();
    let engine = FormEngine::builder()
        .shared_transport(transport.clone())
        .request(RequestConfig::post("http://localhost/login"))
        .challenge(challenge.clone(), "site-key")
        .build()
        .unwrap();
    engine.set_value("email", "ada@example.com").unwrap();
    engine.set_value("password", "analytical").unwrap();

    assert_eq!(engine.submit().await, SubmitOutcome::ChallengePending);
    assert_eq!(engine.phase(), SubmitPhase::ChallengePending);
    assert_eq!(challenge.events(), ["present:site-key"]);
    assert_eq!(transport.calls(), 0);

    let rendered = engine.render();
    assert!(rendered.fields.is_empty());
    assert!(rendered.button.is_none());
    assert_eq!(rendered.challenge.map(|c| c.site_key), Some("site-key".to_string()));

    assert_eq!(engine.complete_challenge(None).await, SubmitOutcome::ChallengePending);
    assert_eq!(engine.complete_challenge(Some("")).await, SubmitOutcome::ChallengePending);
    assert_eq!(transport.calls(), 0);

    assert!(engine.complete_challenge(Some("token-1")).await.is_success());
    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.last_payload()["captchaResponse"], json!("token-1"));

    let state = engine.state();
    assert!(!state.is_submitting);
    assert!(!state.challenge_visible);
    assert_eq!(state.challenge_token, None);
    assert_eq!(challenge.events(), ["present:site-key", "reset"]);
    assert_eq!(engine.render().field_names(), ["email", "password"]);
}

#[tokio::test]
async fn test_challenge_is_reset_after_failure() {
    let transport = Arc::new(RecordingTransport::failing(TransportError::http(
        429,
        json!({ "message": "Too many attempts" }),
    )));
    let challenge = RecordingChallenge::default();
    let engine = FormEngine::builder()
        .shared_transport(transport.clone())
        .request(RequestConfig::post("http://localhost/login"))
        .challenge(challenge.clone(), "site-key")
        .build()
        .unwrap();
    engine.set_value("email", "ada@example.com").unwrap();
    engine.set_value("password", "analytical").unwrap();

    engine.submit().await;
    assert_eq!(
        engine.complete_challenge(Some("token")).await,
        SubmitOutcome::Failed("Too many attempts".into())
    );
    assert!(!engine.state().challenge_visible);
    assert_eq!(challenge.events().last().map(String::as_str), Some("reset"));
}

// =============================================================================
// Re-entrancy
// =============================================================================

#[tokio::test]
async fn test_submit_while_in_flight_is_rejected() {
    let (transport, release) = RecordingTransport::gated();
    let transport = Arc::new(transport);
    let engine = engine_with(transport.clone(), FormConfiguration::default());
    engine.set_value("email", "ada@example.com").unwrap();
    engine.set_value("password", "analytical").unwrap();

    let second = async {
        let state = engine.state();
        let outcome = engine.submit().await;
        let _ = release.send(());
        (state, outcome)
    };
    let (first, (state, second)) = futures::join!(engine.submit(), second);

    assert!(state.is_submitting);
    assert_eq!(state.phase, SubmitPhase::Transmitting);
    assert_eq!(second, SubmitOutcome::Rejected);
    assert!(first.is_success());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_submit_during_pending_challenge_is_rejected() {
    let transport = Arc::new(RecordingTransport::default());
    let challenge = RecordingChallenge::default();
    let engine = FormEngine::builder()
        .shared_transport(transport.clone())
        .request(RequestConfig::post("http://localhost/login"))
        .challenge(challenge.clone(), "site-key")
        .build()
        .unwrap();
    engine.set_value("email", "ada@example.com").unwrap();
    engine.set_value("password", "analytical").unwrap();

    assert_eq!(engine.submit().await, SubmitOutcome::ChallengePending);
    assert_eq!(engine.submit().await, SubmitOutcome::Rejected);

    let state = engine.state();
    assert_eq!(state.phase, SubmitPhase::ChallengePending);
    assert!(state.challenge_visible);
    assert!(!state.is_submitting);
    assert_eq!(challenge.events(), ["present:site-key"]);
    assert_eq!(transport.calls(), 0);

    assert!(engine.complete_challenge(Some("token")).await.is_success());
    assert_eq!(transport.calls(), 1);
}

#[test]
fn test_dropped_submission_settles() {
    let (transport, _release) = RecordingTransport::gated();
    let transport = Arc::new(transport);
    let engine = engine_with(transport.clone(), FormConfiguration::default());
    engine.set_value("email", "ada@example.com").unwrap();
    engine.set_value("password", "analytical").unwrap();

    assert_eq!(engine.submit().now_or_never(), None);
    assert_eq!(transport.calls(), 1);

    let state = engine.state();
    assert_eq!(state.phase, SubmitPhase::Idle);
    assert!(!state.is_submitting);
    assert_eq!(state.last_error, None);

    let outcome = engine.submit().now_or_never();
    assert_eq!(outcome, Some(SubmitOutcome::Succeeded(json!({ "id": 7 }))));
    assert_eq!(transport.calls(), 2);
}

#[test]
fn test_dropped_challenge_completion_resets_challenge() {
    let (transport, _release) = RecordingTransport::gated();
    let transport = Arc::new(transport);
    let challenge = RecordingChallenge::default();
    let engine = FormEngine::builder()
        .shared_transport(transport.clone())
        .request(RequestConfig::post("http://localhost/login"))
        .challenge(challenge.clone(), "site-key")
        .build()
        .unwrap();
    engine.set_value("email", "ada@example.com").unwrap();
    engine.set_value("password", "analytical").unwrap();

    assert_eq!(
        engine.submit().now_or_never(),
        Some(SubmitOutcome::ChallengePending)
    );
    assert_eq!(engine.complete_challenge(Some("token")).now_or_never(), None);

    let state = engine.state();
    assert_eq!(state.phase, SubmitPhase::Idle);
    assert!(!state.challenge_visible);
    assert_eq!(state.challenge_token, None);
    assert_eq!(challenge.events(), ["present:site-key", "reset"]);
    assert_eq!(engine.render().field_names(), ["email", "password"]);
}

#[tokio::test]
async fn test_token_without_pending_challenge_is_rejected() {
    let transport = Arc::new(RecordingTransport::default());
    let engine = engine_with(transport.clone(), FormConfiguration::default());
    assert_eq!(engine.complete_challenge(Some("token")).await, SubmitOutcome::Rejected);
    assert_eq!(transport.calls(), 0);
}

// =============================================================================
// Rendering
// =============================================================================

struct Chips;

impl SelectRenderer for Chips {
    fn render_select(&self, props: &SelectProps) -> Markup {
        Markup::from(format!("<chips name=\"{}\">{}</chips>", props.name, props.options.join("|")))
    }
}

#[test]
fn test_layout_and_custom_renderers() {
    let engine = FormEngine::builder()
        .shared_transport(Arc::new(RecordingTransport::default()))
        .request(RequestConfig::post("http://localhost/register"))
        .config(FormConfiguration::new(vec![
            FieldDescriptor::email("email"),
            FieldDescriptor::password("password"),
            FieldDescriptor::select("plan", ["free", "pro"]).label("Plan"),
        ]))
        .select_renderer(Chips)
        .build()
        .unwrap();

    assert_eq!(engine.layout().css_width(), "48%");
    let rendered = engine.render();
    assert_eq!(rendered.fields[2].markup.as_str(), "<chips name=\"plan\">free|pro</chips>");
    assert!(rendered.to_html().contains("width: 48%"));
    assert_eq!(
        rendered.button.map(Markup::into_string),
        Some("<button type=\"submit\">Submit</button>".to_string())
    );
}
