//! Session context shared by every controller.
//!
//! Holds the API base URL, the persisted token, the signed-in user, and the
//! last fetched catalog. Controllers receive it explicitly.

use meditation_types::{MeditationItem, UserSummary};

use crate::error::ClientError;
use crate::token_store::TokenStore;
use crate::view::{Notifier, Page};

pub struct SessionContext {
    api_base: String,
    store: Box<dyn TokenStore>,
    token: Option<String>,
    user: Option<UserSummary>,
    catalog: Vec<MeditationItem>,
}

impl SessionContext {
    /// Build a context and read any token persisted by an earlier run.
    pub fn init(api_base: impl Into<String>, store: Box<dyn TokenStore>) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read saved session; starting signed out");
                None
            }
        };
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            store,
            token,
            user: None,
            catalog: Vec::new(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&UserSummary> {
        self.user.as_ref()
    }

    /// Remember a fresh token and persist it.
    pub fn set_auth(&mut self, token: String, user: Option<UserSummary>) {
        if let Err(err) = self.store.save(&token) {
            tracing::warn!(error = %err, "failed to persist session token");
        }
        self.token = Some(token);
        self.user = user;
    }

    /// Forget the token locally and in the store.
    pub fn clear_auth(&mut self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear session token");
        }
        self.token = None;
        self.user = None;
    }

    pub fn catalog(&self) -> &[MeditationItem] {
        &self.catalog
    }

    pub fn set_catalog(&mut self, items: Vec<MeditationItem>) {
        self.catalog = items;
    }

    /// Surface a failed call to the user.
    ///
    /// A rejected token clears the session and sends the user to login.
    pub fn report_failure(&mut self, notifier: &mut dyn Notifier, err: &ClientError) {
        tracing::debug!(error = %err, "request failed");
        notifier.show_error(&err.user_message());
        if matches!(err, ClientError::Auth) {
            self.clear_auth();
            notifier.navigate(Page::Login);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;
    use crate::token_store::MemoryTokenStore;
    use std::sync::Arc;

    struct SharedStore(Arc<MemoryTokenStore>);

    impl TokenStore for SharedStore {
        fn load(&self) -> anyhow::Result<Option<String>> {
            self.0.load()
        }
        fn save(&self, token: &str) -> anyhow::Result<()> {
            self.0.save(token)
        }
        fn clear(&self) -> anyhow::Result<()> {
            self.0.clear()
        }
    }

    #[test]
    fn init_reads_persisted_token() {
        let session = SessionContext::init(
            "http://localhost:3006/",
            Box::new(MemoryTokenStore::with_token("saved")),
        );
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("saved"));
        assert_eq!(session.api_base(), "http://localhost:3006");
    }

    #[test]
    fn auth_failure_clears_token_and_navigates_to_login() {
        let backing = Arc::new(MemoryTokenStore::with_token("stale"));
        let mut session =
            SessionContext::init("http://localhost:3006", Box::new(SharedStore(backing.clone())));
        let mut notifier = RecordingNotifier::default();

        session.report_failure(&mut notifier, &ClientError::Auth);

        assert!(!session.is_authenticated());
        assert_eq!(backing.load().unwrap(), None);
        assert_eq!(notifier.errors, vec!["Session expired. Please login again."]);
        assert_eq!(notifier.pages, vec![Page::Login]);
    }

    #[test]
    fn other_failures_keep_the_session() {
        let mut session = SessionContext::init(
            "http://localhost:3006",
            Box::new(MemoryTokenStore::with_token("ok")),
        );
        let mut notifier = RecordingNotifier::default();
        session.report_failure(&mut notifier, &ClientError::Network("refused".into()));
        assert!(session.is_authenticated());
        assert!(notifier.pages.is_empty());
        assert_eq!(notifier.errors, vec!["Network error. Please try again."]);
    }
}
