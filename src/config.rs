//! Optional settings file.
//!
//! Every field has a default, so running without `greetviz.toml` is fine.
//!
//! ```toml
//! model = "pro"
//! api_key_env = "GOOGLE_API_KEY"
//! default_language = "yue"
//! output = "posts/new-year-wish.png"
//! ```

use crate::error::{GreetVizError, Result};
use crate::image::providers::GeminiModel;
use crate::languages::{self, DEFAULT_LANGUAGE};
use crate::workflow::DEFAULT_OUTPUT;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "greetviz.toml";

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Gemini model, `pro` or `flash` (or the full model id).
    pub model: String,
    /// REST endpoint override.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Language code preselected in the form.
    pub default_language: String,
    /// Where the template is saved.
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "pro".into(),
            api_base: None,
            api_key_env: "GOOGLE_API_KEY".into(),
            default_language: DEFAULT_LANGUAGE.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl Settings {
    /// Reads and validates a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("loading settings from {:?}", path);
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GreetVizError::Config(format!("failed to read settings file {:?}: {}", path, e))
        })?;
        let settings: Self = toml::from_str(&contents).map_err(|e| {
            GreetVizError::Config(format!("failed to parse settings file {:?}: {}", path, e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads `path`, or `greetviz.toml` when it exists, or the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_SETTINGS_FILE).is_file() => Self::load(DEFAULT_SETTINGS_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Parsed model variant.
    pub fn gemini_model(&self) -> Result<GeminiModel> {
        self.model.parse()
    }

    fn validate(&self) -> Result<()> {
        self.gemini_model()
            .map_err(|e| GreetVizError::Config(e.to_string()))?;
        if languages::find(&self.default_language).is_none() {
            return Err(GreetVizError::Config(format!(
                "unknown default_language: {}",
                self.default_language
            )));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(GreetVizError::Config("api_key_env must not be empty".into()));
        }
        Ok(())
    }
}
