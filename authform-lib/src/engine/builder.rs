//! Typestate builder for [`FormEngine`]

use std::sync::Arc;

use serde_json::Value;

use super::derived::Derived;
use super::DisplayText;
use super::ErrorCallback;
use super::FormEngine;
use super::SuccessCallback;
use crate::challenge::Challenge;
use crate::challenge::ChallengeProvider;
use crate::error::ConfigError;
use crate::field::FormConfiguration;
use crate::render::ButtonRenderer;
use crate::render::FileRenderer;
use crate::render::Renderers;
use crate::render::SelectRenderer;
use crate::render::TextRenderer;
use crate::schema::ValidationSchema;
use crate::transport::RequestConfig;
use crate::transport::Transport;

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`FormEngine`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `transport` - A [`Transport`] implementation
/// - `request` - The [`RequestConfig`] describing where the form is sent
///
/// # Example
///
/// ```
/// use authform_lib::transport::{ReqwestTransport, RequestConfig};
/// use authform_lib::{DisplayText, FormEngine};
///
/// let engine = FormEngine::builder()
///     .transport(ReqwestTransport::new())
///     .request(RequestConfig::post("https://example.com/login"))
///     .display_text(DisplayText::default().with_submit_label("Sign in"))
///     .build()
///     .unwrap();
/// assert_eq!(engine.configuration().len(), 2);
/// ```
pub struct FormEngineBuilder<T, R> {
    transport: T,
    request: R,
    config: FormConfiguration,
    schema: Option<ValidationSchema>,
    renderers: Renderers,
    display: DisplayText,
    challenge: Option<Challenge>,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl FormEngineBuilder<Missing, Missing> {
    /// Creates a new builder with the default login configuration.
    pub fn new() -> Self {
        Self {
            transport: Missing,
            request: Missing,
            config: FormConfiguration::default(),
            schema: None,
            renderers: Renderers::default(),
            display: DisplayText::default(),
            challenge: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl Default for FormEngineBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FormEngineBuilder<Missing, R> {
    /// Sets the transport that sends submissions.
    pub fn transport<T: Transport + 'static>(
        self,
        transport: T,
    ) -> FormEngineBuilder<Set<Arc<dyn Transport>>, R> {
        self.shared_transport(Arc::new(transport))
    }

    /// Sets a transport shared with other owners.
    pub fn shared_transport(
        self,
        transport: Arc<dyn Transport>,
    ) -> FormEngineBuilder<Set<Arc<dyn Transport>>, R> {
        FormEngineBuilder {
            transport: Set(transport),
            request: self.request,
            config: self.config,
            schema: self.schema,
            renderers: self.renderers,
            display: self.display,
            challenge: self.challenge,
            on_success: self.on_success,
            on_error: self.on_error,
        }
    }
}

impl<T> FormEngineBuilder<T, Missing> {
    /// Sets where and how submissions are sent.
    pub fn request(self, request: RequestConfig) -> FormEngineBuilder<T, Set<RequestConfig>> {
        FormEngineBuilder {
            transport: self.transport,
            request: Set(request),
            config: self.config,
            schema: self.schema,
            renderers: self.renderers,
            display: self.display,
            challenge: self.challenge,
            on_success: self.on_success,
            on_error: self.on_error,
        }
    }
}

impl<T, R> FormEngineBuilder<T, R> {
    /// Sets the field configuration.
    ///
    /// Defaults to the two-field login form. An empty configuration also
    /// falls back to it.
    pub fn config(mut self, config: impl Into<FormConfiguration>) -> Self {
        self.config = config.into();
        self
    }

    /// Replaces the derived validation schema.
    ///
    /// The override is used exactly as given; nothing is derived from the
    /// configuration.
    pub fn schema(mut self, schema: ValidationSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets all renderers at once.
    pub fn renderers(mut self, renderers: Renderers) -> Self {
        self.renderers = renderers;
        self
    }

    /// Sets the renderer for text, email, password and number fields.
    pub fn text_renderer(mut self, renderer: impl TextRenderer + 'static) -> Self {
        self.renderers = self.renderers.with_text(renderer);
        self
    }

    /// Sets the renderer for select fields.
    pub fn select_renderer(mut self, renderer: impl SelectRenderer + 'static) -> Self {
        self.renderers = self.renderers.with_select(renderer);
        self
    }

    /// Sets the renderer for file and image fields.
    pub fn file_renderer(mut self, renderer: impl FileRenderer + 'static) -> Self {
        self.renderers = self.renderers.with_file(renderer);
        self
    }

    /// Sets the renderer for the submit control.
    pub fn button_renderer(mut self, renderer: impl ButtonRenderer + 'static) -> Self {
        self.renderers = self.renderers.with_button(renderer);
        self
    }

    /// Overrides the button labels and fallback error text.
    pub fn display_text(mut self, display: DisplayText) -> Self {
        self.display = display;
        self
    }

    /// Enables human verification through `provider`.
    pub fn challenge<P: ChallengeProvider + 'static>(
        mut self,
        provider: P,
        site_key: impl Into<String>,
    ) -> Self {
        self.challenge = Some(Challenge {
            site_key: site_key.into(),
            provider: Some(Arc::new(provider)),
        });
        self
    }

    /// Enables human verification that the host displays itself from
    /// [`RenderedForm::challenge`](crate::render::RenderedForm::challenge).
    pub fn challenge_site_key(mut self, site_key: impl Into<String>) -> Self {
        self.challenge = Some(Challenge {
            site_key: site_key.into(),
            provider: None,
        });
        self
    }

    /// Sets the callback for successful submissions.
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Sets the callback for failed submissions.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl FormEngineBuilder<Set<Arc<dyn Transport>>, Set<RequestConfig>> {
    /// Builds the [`FormEngine`].
    ///
    /// Fails if the configuration is malformed.
    pub fn build(self) -> Result<FormEngine, ConfigError> {
        let schema_override = self.schema.map(Arc::new);
        let derived = Derived::compute(self.config, schema_override.as_ref())?;

        Ok(FormEngine::from_parts(super::Parts {
            transport: self.transport.0,
            request: self.request.0,
            renderers: self.renderers,
            display: self.display,
            challenge: self.challenge,
            on_success: self.on_success,
            on_error: self.on_error,
            schema_override,
            derived,
        }))
    }
}
