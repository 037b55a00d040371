//! `render` and `submit` commands

use std::fs;
use std::path::Path;

use authform_lib::field::FileRef;
use authform_lib::field::FormConfiguration;
use authform_lib::transport::RequestConfig;
use authform_lib::transport::ReqwestTransport;
use authform_lib::ChallengeProvider;
use authform_lib::FormEngine;
use authform_lib::SubmitOutcome;
use log::info;
use serde_json::Value;

use crate::args::FormArgs;
use crate::args::RenderArgs;
use crate::args::SubmitArgs;
use crate::error::CliError;

/// Tells the user a challenge has to be solved out of band.
struct ConsoleChallenge;

impl ChallengeProvider for ConsoleChallenge {
    fn present(&self, site_key: &str) {
        info!("Challenge presented for site key {site_key}");
        eprintln!("Human verification required (site key: {site_key})");
    }

    fn reset(&self) {
        info!("Challenge reset");
    }
}

/// Renders the form with the given values as HTML.
pub fn render(args: &RenderArgs) -> Result<String, CliError> {
    let engine = FormEngine::builder()
        .transport(ReqwestTransport::new())
        .request(RequestConfig::default())
        .config(load_config(args.form.config.as_deref())?)
        .build()?;
    fill(&engine, &args.form)?;
    Ok(engine.render().to_html())
}

/// Validates and sends the form, returning the response body.
pub async fn submit(args: &SubmitArgs) -> Result<Value, CliError> {
    let mut builder = FormEngine::builder()
        .transport(ReqwestTransport::new())
        .request(load_request(args)?)
        .config(load_config(args.form.config.as_deref())?);
    if let Some(site_key) = &args.challenge_site_key {
        builder = builder.challenge(ConsoleChallenge, site_key.clone());
    }
    let engine = builder.build()?;
    fill(&engine, &args.form)?;

    let mut outcome = engine.submit().await;
    if outcome == SubmitOutcome::ChallengePending {
        outcome = engine.complete_challenge(args.challenge_token.as_deref()).await;
    }

    match outcome {
        SubmitOutcome::Succeeded(body) => Ok(body),
        SubmitOutcome::Invalid(errors) => Err(CliError::Invalid(errors)),
        SubmitOutcome::ChallengePending => Err(CliError::ChallengeRequired(
            args.challenge_site_key.clone().unwrap_or_default(),
        )),
        SubmitOutcome::Failed(message) => Err(CliError::Failed(message)),
        SubmitOutcome::Rejected => Err(CliError::Rejected),
    }
}

fn fill(engine: &FormEngine, form: &FormArgs) -> Result<(), CliError> {
    for assignment in &form.values {
        engine.set_value(&assignment.name, assignment.value.as_str())?;
    }
    for assignment in &form.files {
        engine.set_file(&assignment.name, read_file(Path::new(&assignment.value))?)?;
    }
    Ok(())
}

/// Loads a field configuration, or the login default when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<FormConfiguration, CliError> {
    match path {
        Some(path) => parse_json(path),
        None => Ok(FormConfiguration::default()),
    }
}

/// Loads the request configuration from `--request` or `--url`.
pub fn load_request(args: &SubmitArgs) -> Result<RequestConfig, CliError> {
    match (&args.request, &args.url) {
        (Some(path), _) => parse_json(path),
        (None, Some(url)) => Ok(RequestConfig::post(url.clone())),
        (None, None) => Err(CliError::MissingRequest),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a file for upload, guessing its MIME type from the extension.
pub fn read_file(path: &Path) -> Result<FileRef, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(FileRef::new(name, guess_mime(path), bytes))
}

fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
