//! Generation and edit workflow.
//!
//! [`Workflow`] holds what the user has typed, the current template image and
//! the busy/error status a front-end renders. Each operation issues at most
//! one request; every failure is caught here, classified, and turned into a
//! display message.

use crate::error::GreetVizError;
use crate::image::{AspectRatio, GeneratedImage, GenerationRequest, ImageProvider, ImageSize};
use crate::languages::{self, Language};
use crate::prompt;
use crate::session::{CredentialAvailability, KeyGate};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

/// Aspect ratio of every template and edit.
pub const TEMPLATE_ASPECT_RATIO: AspectRatio = AspectRatio::Square;

/// Resolution tier of every template and edit.
pub const TEMPLATE_IMAGE_SIZE: ImageSize = ImageSize::OneK;

/// File name offered when saving the template.
pub const DEFAULT_OUTPUT: &str = "new-year-wish.png";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    /// Language the greeting is written in.
    pub language: &'static Language,
    /// City or country used to pick cultural symbols. Required.
    pub location: String,
    /// Extra cultural elements, passed to the model verbatim.
    pub cultural_elements: Option<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            language: languages::default_language(),
            location: String::new(),
            cultural_elements: None,
        }
    }
}

impl GenerationParams {
    /// Selects a language by code.
    pub fn set_language(&mut self, code: &str) -> crate::Result<()> {
        self.language = languages::find(code).ok_or_else(|| {
            GreetVizError::InvalidRequest(format!("unknown language code: {code}"))
        })?;
        Ok(())
    }
}

/// Busy flags and the message shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowStatus {
    /// A generation request is in flight.
    pub generating: bool,
    /// An edit request is in flight.
    pub editing: bool,
    /// Message describing the last failure. Cleared when a new attempt starts.
    pub error: Option<String>,
}

impl WorkflowStatus {
    /// Returns true while any request is in flight.
    pub fn is_busy(&self) -> bool {
        self.generating || self.editing
    }
}

/// Which request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Initial template generation.
    Generate,
    /// Refinement of the current template.
    Edit,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generate => write!(f, "generate"),
            Self::Edit => write!(f, "edit"),
        }
    }
}

/// Local precondition failures. No request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No key is selected.
    #[error("Please select a valid API key first.")]
    MissingCredential,
    /// The location is blank.
    #[error("Please specify a location to help the AI identify cultural symbols.")]
    MissingLocation,
}

/// Classified failure of a workflow operation.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Input was rejected before any request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service rejected the key; it has to be selected again.
    #[error("Your API key session might have expired or is invalid. Please select it again.")]
    Authorization(#[source] GreetVizError),

    /// Any other failure, including a response without an image.
    #[error("Failed to {action} template. Please try again.")]
    Upstream {
        /// Operation that failed.
        action: Action,
        /// Underlying error.
        #[source]
        source: GreetVizError,
    },
}

/// Clears a busy flag when dropped, so every exit path releases it.
struct BusyFlag<'a> {
    status: &'a watch::Sender<WorkflowStatus>,
    action: Action,
}

impl<'a> BusyFlag<'a> {
    fn raise(status: &'a watch::Sender<WorkflowStatus>, action: Action) -> Self {
        status.send_modify(|s| *Self::flag(s, action) = true);
        Self { status, action }
    }

    fn flag(status: &mut WorkflowStatus, action: Action) -> &mut bool {
        match action {
            Action::Generate => &mut status.generating,
            Action::Edit => &mut status.editing,
        }
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        let action = self.action;
        self.status.send_modify(|s| *Self::flag(s, action) = false);
    }
}

/// Generation/edit controller.
pub struct Workflow {
    gate: KeyGate,
    provider: Arc<dyn ImageProvider>,
    params: GenerationParams,
    edit_instruction: String,
    artifact: Option<GeneratedImage>,
    status: watch::Sender<WorkflowStatus>,
}

impl Workflow {
    /// Creates a workflow with default parameters and no image.
    pub fn new(gate: KeyGate, provider: Arc<dyn ImageProvider>) -> Self {
        Self {
            gate,
            provider,
            params: GenerationParams::default(),
            edit_instruction: String::new(),
            artifact: None,
            status: watch::Sender::new(WorkflowStatus::default()),
        }
    }

    /// Runs the start-up credential check.
    pub async fn start(&mut self) -> CredentialAvailability {
        self.gate.check_credential().await
    }

    /// Opens the key selection flow.
    pub async fn select_key(&mut self) -> CredentialAvailability {
        self.gate.request_selection().await
    }

    /// Current credential availability.
    pub fn credential(&self) -> CredentialAvailability {
        self.gate.availability()
    }

    /// Current parameters.
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Parameters for editing by the front-end.
    pub fn params_mut(&mut self) -> &mut GenerationParams {
        &mut self.params
    }

    /// Pending edit instruction.
    pub fn edit_instruction(&self) -> &str {
        &self.edit_instruction
    }

    /// Replaces the pending edit instruction.
    pub fn set_edit_instruction(&mut self, instruction: impl Into<String>) {
        self.edit_instruction = instruction.into();
    }

    /// The current template, if one has been generated.
    pub fn artifact(&self) -> Option<&GeneratedImage> {
        self.artifact.as_ref()
    }

    /// Snapshot of the busy flags and last error.
    pub fn status(&self) -> WorkflowStatus {
        self.status.borrow().clone()
    }

    /// Follows status changes, including the busy flags while a request
    /// is in flight.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowStatus> {
        self.status.subscribe()
    }

    fn set_error(&self, error: Option<String>) {
        self.status.send_modify(|s| s.error = error);
    }

    /// Returns true when an edit would issue a request.
    pub fn can_edit(&self) -> bool {
        self.artifact.is_some() && !self.edit_instruction.trim().is_empty()
    }

    /// Writes the current template to `path`.
    pub fn save_artifact(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let artifact = self
            .artifact
            .as_ref()
            .ok_or_else(|| GreetVizError::InvalidRequest("nothing generated yet".into()))?;
        artifact.save(path)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !self.gate.availability().is_present() {
            return Err(ValidationError::MissingCredential);
        }
        if self.params.location.trim().is_empty() {
            return Err(ValidationError::MissingLocation);
        }
        Ok(())
    }

    /// Generates a fresh template from the current parameters.
    ///
    /// On success the template replaces any previous one.
    pub async fn generate(&mut self) -> Result<(), WorkflowError> {
        if let Err(invalid) = self.validate() {
            tracing::debug!("generation rejected: {invalid}");
            self.set_error(Some(invalid.to_string()));
            return Err(invalid.into());
        }
        self.set_error(None);

        let params = &self.params;
        tracing::info!(
            language = params.language.name,
            location = %params.location.trim(),
            "generating greeting template"
        );
        let request = GenerationRequest::new(prompt::generation_prompt(
            params.language.name,
            params.location.trim(),
            params.cultural_elements.as_deref(),
        ))
        .with_aspect_ratio(TEMPLATE_ASPECT_RATIO)
        .with_image_size(TEMPLATE_IMAGE_SIZE);

        let result = {
            let _busy = BusyFlag::raise(&self.status, Action::Generate);
            self.provider.generate(&request).await
        };

        match result {
            Ok(image) => {
                self.artifact = Some(image);
                Ok(())
            }
            Err(e) => Err(self.fail(Action::Generate, e)),
        }
    }

    /// Applies the pending edit instruction to the current template.
    ///
    /// Does nothing without a template or with a blank instruction. On
    /// failure the template and the instruction are kept.
    pub async fn edit(&mut self) -> Result<(), WorkflowError> {
        let Some(current) = self.artifact.as_ref() else {
            tracing::debug!("edit skipped: no template yet");
            return Ok(());
        };
        let instruction = self.edit_instruction.trim();
        if instruction.is_empty() {
            tracing::debug!("edit skipped: empty instruction");
            return Ok(());
        }

        tracing::info!(instruction, "editing greeting template");
        let request = GenerationRequest::new(prompt::edit_prompt(instruction))
            .with_aspect_ratio(TEMPLATE_ASPECT_RATIO)
            .with_image_size(TEMPLATE_IMAGE_SIZE)
            .with_input_image(current.data.clone());
        self.set_error(None);

        let result = {
            let _busy = BusyFlag::raise(&self.status, Action::Edit);
            self.provider.generate(&request).await
        };

        match result {
            Ok(image) => {
                self.artifact = Some(image);
                self.edit_instruction.clear();
                Ok(())
            }
            Err(e) => Err(self.fail(Action::Edit, e)),
        }
    }

    fn fail(&mut self, action: Action, err: GreetVizError) -> WorkflowError {
        tracing::error!(%action, "request failed: {err}");
        let failure = if err.is_authorization() {
            self.gate.revoke();
            WorkflowError::Authorization(err)
        } else {
            WorkflowError::Upstream {
                action,
                source: err,
            }
        };
        self.set_error(Some(failure.to_string()));
        failure
    }
}
