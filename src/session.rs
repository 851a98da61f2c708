//! Key gate: decides whether the workflow may talk to the image service.
//!
//! The host environment owns credential selection. It is reached through the
//! [`KeyHost`] capability so the gate can be driven by a terminal prompt, a
//! test double, or anything else that can answer "is a key selected?".

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::{Mutex, RwLock};

/// Whether a usable credential is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CredentialAvailability {
    /// Not checked yet.
    #[default]
    Unknown,
    /// A key is selected.
    Present,
    /// No key, or the service rejected the last one.
    Absent,
}

impl CredentialAvailability {
    /// Returns true only for [`CredentialAvailability::Present`].
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

/// Shared slot holding the selected API key.
///
/// Cloning shares the slot; the provider reads it on every request.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl ApiKeyStore {
    /// Creates a store already holding `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(key.into()))),
        }
    }

    /// Returns the current key, if any.
    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    /// Replaces the current key.
    pub async fn set(&self, key: impl Into<String>) {
        *self.inner.write().await = Some(key.into());
    }

    /// Returns true when a key is stored.
    pub async fn is_set(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

/// Credential capabilities provided by the host environment.
#[async_trait]
pub trait KeyHost: Send + Sync {
    /// Reports whether a usable key has been selected.
    async fn has_selected_key(&self) -> Result<bool>;

    /// Opens the host's key selection flow. The outcome is not reported back.
    async fn open_select_key(&self) -> Result<()>;
}

/// Line input shared between a key prompt and whatever else reads the
/// same stream.
pub type SharedLines<R> = Arc<Mutex<Lines<R>>>;

/// Key host backed by an environment variable, with a line prompt as the
/// selection flow.
pub struct EnvKeyHost<R> {
    keys: ApiKeyStore,
    env_var: String,
    input: SharedLines<R>,
}

impl<R> EnvKeyHost<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Creates a host that fills `keys` from `env_var` or from `input`.
    pub fn new(keys: ApiKeyStore, env_var: impl Into<String>, input: SharedLines<R>) -> Self {
        Self {
            keys,
            env_var: env_var.into(),
            input,
        }
    }
}

#[async_trait]
impl<R> KeyHost for EnvKeyHost<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn has_selected_key(&self) -> Result<bool> {
        if self.keys.is_set().await {
            return Ok(true);
        }
        match std::env::var(&self.env_var) {
            Ok(key) if !key.trim().is_empty() => {
                tracing::debug!(env_var = %self.env_var, "using API key from environment");
                self.keys.set(key.trim()).await;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn open_select_key(&self) -> Result<()> {
        eprintln!("Paste a Gemini API key from a billing-enabled Google Cloud project.");
        eprintln!("See https://ai.google.dev/gemini-api/docs/billing");
        eprint!("API key: ");

        let line = self.input.lock().await.next_line().await?;
        match line.map(|l| l.trim().to_string()) {
            Some(key) if !key.is_empty() => self.keys.set(key).await,
            _ => tracing::debug!("key selection closed without a key"),
        }
        Ok(())
    }
}

/// Tracks credential availability on behalf of the workflow.
pub struct KeyGate {
    host: Box<dyn KeyHost>,
    availability: CredentialAvailability,
}

impl KeyGate {
    /// Creates a gate in the `Unknown` state.
    pub fn new(host: impl KeyHost + 'static) -> Self {
        Self {
            host: Box::new(host),
            availability: CredentialAvailability::Unknown,
        }
    }

    /// Current availability.
    pub fn availability(&self) -> CredentialAvailability {
        self.availability
    }

    /// Asks the host whether a key is selected. A failing check counts as
    /// no key.
    pub async fn check_credential(&mut self) -> CredentialAvailability {
        self.availability = match self.host.has_selected_key().await {
            Ok(true) => CredentialAvailability::Present,
            Ok(false) => CredentialAvailability::Absent,
            Err(e) => {
                tracing::warn!("credential check failed, treating key as absent: {e}");
                CredentialAvailability::Absent
            }
        };
        self.availability
    }

    /// Opens the host selection flow and assumes it succeeded.
    ///
    /// The host may confirm late, so the gate never waits for a confirmation;
    /// a bad key is caught by the first rejected request instead.
    pub async fn request_selection(&mut self) -> CredentialAvailability {
        if let Err(e) = self.host.open_select_key().await {
            tracing::warn!("key selection flow failed: {e}");
        }
        self.availability = CredentialAvailability::Present;
        self.availability
    }

    /// Marks the key as unusable after the service rejected it.
    pub fn revoke(&mut self) {
        if self.availability != CredentialAvailability::Absent {
            tracing::info!("API key rejected by the service, selection required");
        }
        self.availability = CredentialAvailability::Absent;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::GreetVizError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncBufReadExt, BufReader};

    /// Scripted host used across the crate's tests.
    #[derive(Default)]
    pub(crate) struct FakeHost {
        pub(crate) selected: bool,
        pub(crate) fail_check: bool,
        pub(crate) fail_select: bool,
        pub(crate) select_calls: Arc<AtomicUsize>,
    }

    impl FakeHost {
        pub(crate) fn with_key() -> Self {
            Self {
                selected: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl KeyHost for FakeHost {
        async fn has_selected_key(&self) -> Result<bool> {
            if self.fail_check {
                return Err(GreetVizError::Config("host unavailable".into()));
            }
            Ok(self.selected)
        }

        async fn open_select_key(&self) -> Result<()> {
            self.select_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_select {
                return Err(GreetVizError::Config("dialog crashed".into()));
            }
            Ok(())
        }
    }

    fn lines(input: &'static str) -> SharedLines<BufReader<&'static [u8]>> {
        Arc::new(Mutex::new(BufReader::new(input.as_bytes()).lines()))
    }

    #[tokio::test]
    async fn test_gate_starts_unknown() {
        let gate = KeyGate::new(FakeHost::with_key());
        assert_eq!(gate.availability(), CredentialAvailability::Unknown);
        assert!(!gate.availability().is_present());
    }

    #[tokio::test]
    async fn test_check_sets_present_or_absent() {
        let mut gate = KeyGate::new(FakeHost::with_key());
        assert_eq!(gate.check_credential().await, CredentialAvailability::Present);

        let mut gate = KeyGate::new(FakeHost::default());
        assert_eq!(gate.check_credential().await, CredentialAvailability::Absent);
    }

    #[tokio::test]
    async fn test_failed_check_is_absent() {
        let mut gate = KeyGate::new(FakeHost {
            fail_check: true,
            ..FakeHost::default()
        });
        assert_eq!(gate.check_credential().await, CredentialAvailability::Absent);
    }

    #[tokio::test]
    async fn test_selection_is_optimistic() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut gate = KeyGate::new(FakeHost {
            fail_select: true,
            select_calls: Arc::clone(&calls),
            ..FakeHost::default()
        });
        gate.check_credential().await;
        assert_eq!(gate.availability(), CredentialAvailability::Absent);

        assert_eq!(gate.request_selection().await, CredentialAvailability::Present);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_revoke_downgrades() {
        let mut gate = KeyGate::new(FakeHost::with_key());
        gate.check_credential().await;
        gate.revoke();
        assert_eq!(gate.availability(), CredentialAvailability::Absent);
    }

    #[tokio::test]
    async fn test_key_store_shared_between_clones() {
        let store = ApiKeyStore::default();
        let clone = store.clone();
        assert!(!store.is_set().await);
        clone.set("abc").await;
        assert_eq!(store.get().await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_env_host_prefers_stored_key() {
        let store = ApiKeyStore::with_key("stored");
        let host = EnvKeyHost::new(store, "GREETVIZ_TEST_UNSET_KEY_VAR", lines(""));
        assert!(host.has_selected_key().await.unwrap());
    }

    #[tokio::test]
    async fn test_env_host_without_key_reports_absent() {
        let host = EnvKeyHost::new(
            ApiKeyStore::default(),
            "GREETVIZ_TEST_UNSET_KEY_VAR",
            lines(""),
        );
        assert!(!host.has_selected_key().await.unwrap());
    }

    #[tokio::test]
    async fn test_env_host_selection_reads_prompted_key() {
        let store = ApiKeyStore::default();
        let host = EnvKeyHost::new(
            store.clone(),
            "GREETVIZ_TEST_UNSET_KEY_VAR",
            lines("  AIza-test-key  \ngenerate\n"),
        );
        host.open_select_key().await.unwrap();
        assert_eq!(store.get().await.as_deref(), Some("AIza-test-key"));
    }

    #[tokio::test]
    async fn test_env_host_selection_with_blank_line_keeps_store_empty() {
        let store = ApiKeyStore::default();
        let host = EnvKeyHost::new(store.clone(), "GREETVIZ_TEST_UNSET_KEY_VAR", lines("\n"));
        host.open_select_key().await.unwrap();
        assert!(!store.is_set().await);
    }
}
