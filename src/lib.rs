#![warn(missing_docs)]
//! GreetViz - New Year greeting post templates in 100+ languages.
//!
//! Pick a language and a location, let a Gemini image model draw a square
//! Instagram-style template saying "Wishing you a happy new year" in that
//! language, then refine it with free-text edits.
//!
//! # Quick Start
//!
//! ```no_run
//! use greetviz::session::{ApiKeyStore, EnvKeyHost, KeyGate};
//! use greetviz::{GeminiProvider, Workflow};
//! use std::sync::Arc;
//! use tokio::io::AsyncBufReadExt;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let keys = ApiKeyStore::default();
//!     let input = Arc::new(tokio::sync::Mutex::new(
//!         tokio::io::BufReader::new(tokio::io::stdin()).lines(),
//!     ));
//!     let gate = KeyGate::new(EnvKeyHost::new(keys.clone(), "GOOGLE_API_KEY", input));
//!     let provider = GeminiProvider::builder().key_store(keys).build()?;
//!
//!     let mut workflow = Workflow::new(gate, Arc::new(provider));
//!     workflow.start().await;
//!     workflow.params_mut().set_language("yue")?;
//!     workflow.params_mut().location = "Hong Kong".into();
//!     workflow.generate().await?;
//!
//!     workflow.set_edit_instruction("Add more gold accents");
//!     workflow.edit().await?;
//!     workflow.save_artifact("new-year-wish.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`session`]: key gate and the host credential capability
//! - [`workflow`]: generation/edit controller
//! - [`prompt`]: instruction text sent to the model
//! - [`languages`]: selectable languages
//! - [`image`]: image types and the Gemini provider
//! - [`config`]: optional `greetviz.toml` settings

mod error;

pub mod config;
pub mod image;
pub mod languages;
pub mod prompt;
pub mod session;
pub mod workflow;

// Re-export error types at crate root
pub use error::{GreetVizError, Result, ENTITY_NOT_FOUND};

pub use image::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};
pub use image::{
    AspectRatio, GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat,
    ImageProvider, ImageSize,
};
pub use languages::{Language, LANGUAGES};
pub use session::{CredentialAvailability, KeyGate, KeyHost};
pub use workflow::{GenerationParams, ValidationError, Workflow, WorkflowError, WorkflowStatus};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{GreetVizError, Result};
    pub use crate::image::providers::GeminiProvider;
    pub use crate::image::{GeneratedImage, GenerationRequest, ImageProvider};
    pub use crate::session::{ApiKeyStore, CredentialAvailability, KeyGate, KeyHost};
    pub use crate::workflow::{Workflow, WorkflowError};
}
