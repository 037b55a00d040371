//! Configuration-driven authentication forms
//!
//! Turns an ordered list of field descriptors into a validation schema, a
//! rendering plan and a submission state machine that sends one request per
//! submit, optionally gated by a human-verification challenge.
//!
//! # Example
//!
//! ```ignore
//! use authform_lib::field::{FieldDescriptor, FormConfiguration};
//! use authform_lib::transport::{ReqwestTransport, RequestConfig};
//! use authform_lib::{FormEngine, SubmitOutcome};
//!
//! let engine = FormEngine::builder()
//!     .transport(ReqwestTransport::new())
//!     .request(RequestConfig::post("https://example.com/register"))
//!     .config(FormConfiguration::new(vec![
//!         FieldDescriptor::email("email").placeholder("Email"),
//!         FieldDescriptor::password("password").placeholder("Password"),
//!         FieldDescriptor::select("plan", ["free", "pro"]).label("Plan"),
//!     ]))
//!     .build()?;
//!
//! engine.set_value("email", "ada@example.com")?;
//! println!("{}", engine.render().to_html());
//!
//! if let SubmitOutcome::Invalid(errors) = engine.submit().await {
//!     for error in errors {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

pub mod challenge;
pub mod error;
pub mod field;
pub mod layout;
pub mod render;
pub mod schema;
pub mod submit;
pub mod transport;

mod engine;

pub use challenge::ChallengeProvider;
pub use engine::*;
pub use submit::SubmissionState;
pub use submit::SubmitOutcome;
pub use submit::SubmitPhase;
