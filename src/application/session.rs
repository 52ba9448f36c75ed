// Session initializer - One bounded re-authentication retry
use crate::application::imagery_service::ImageryService;
use crate::infrastructure::config::ImageryConfig;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("initialization failed after re-authentication: {retry} (first attempt: {first})")]
    Auth {
        first: anyhow::Error,
        retry: anyhow::Error,
    },

    #[error("re-authentication failed: {reauth} (first attempt: {first})")]
    Reauth {
        first: anyhow::Error,
        reauth: anyhow::Error,
    },
}

/// Proof of an initialized session. Use cases require one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub project_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NotInitialized,
    Initialized(Session),
}

pub struct SessionInitializer {
    service: Arc<dyn ImageryService>,
    state: SessionState,
}

impl SessionInitializer {
    pub fn new(service: Arc<dyn ImageryService>) -> Self {
        Self {
            service,
            state: SessionState::NotInitialized,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Initialize, re-authenticating and retrying exactly once on failure.
    /// A missing project id fails before the service is contacted.
    pub async fn initialize(&mut self, config: &ImageryConfig) -> Result<Session, SessionError> {
        if let SessionState::Initialized(session) = &self.state {
            return Ok(session.clone());
        }

        let project_id = config
            .project_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                SessionError::Config("environment variable 'GEE_PROJECT_ID' is not set".to_string())
            })?
            .to_string();

        if let Err(first) = self.service.initialize(&project_id).await {
            tracing::warn!("Initialization failed ({}), re-authenticating", first);

            if let Err(reauth) = self.service.authenticate().await {
                return Err(SessionError::Reauth { first, reauth });
            }
            if let Err(retry) = self.service.initialize(&project_id).await {
                return Err(SessionError::Auth { first, retry });
            }
        }

        tracing::info!("Session initialized for project {}", project_id);
        let session = Session { project_id };
        self.state = SessionState::Initialized(session.clone());
        Ok(session)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::expression::Expr;
    use crate::domain::map_view::{TileSource, VisParams};
    use crate::domain::time_series::RawRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Call-counting service stub shared with the use case tests
    #[derive(Default)]
    pub(crate) struct StubService {
        pub init_calls: AtomicUsize,
        pub auth_calls: AtomicUsize,
        pub tile_calls: AtomicUsize,
        pub fetch_calls: AtomicUsize,
        /// Number of leading `initialize` calls that fail
        pub failing_inits: usize,
        pub fail_auth: bool,
        pub records: Vec<RawRecord>,
        pub seen: Mutex<Vec<Expr>>,
    }

    impl StubService {
        pub fn failing(failing_inits: usize) -> Self {
            Self {
                failing_inits,
                ..Default::default()
            }
        }

        pub fn with_records(records: Vec<RawRecord>) -> Self {
            Self {
                records,
                ..Default::default()
            }
        }

        pub fn remote_calls(&self) -> usize {
            self.init_calls.load(Ordering::SeqCst)
                + self.auth_calls.load(Ordering::SeqCst)
                + self.tile_calls.load(Ordering::SeqCst)
                + self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageryService for StubService {
        async fn initialize(&self, _project_id: &str) -> anyhow::Result<()> {
            let n = self.init_calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failing_inits {
                anyhow::bail!("credentials expired");
            }
            Ok(())
        }

        async fn authenticate(&self) -> anyhow::Result<()> {
            self.auth_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_auth {
                anyhow::bail!("login cancelled");
            }
            Ok(())
        }

        async fn tile_source(&self, image: &Expr, vis: &VisParams) -> anyhow::Result<TileSource> {
            self.tile_calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(image.clone());
            Ok(TileSource {
                url_template: format!("https://tiles.test/{}/{{z}}/{{x}}/{{y}}", vis.min),
                attribution: "stub".to_string(),
            })
        }

        async fn fetch_records(&self, features: &Expr) -> anyhow::Result<Vec<RawRecord>> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(features.clone());
            Ok(self.records.clone())
        }
    }

    fn config(project_id: Option<&str>) -> ImageryConfig {
        ImageryConfig {
            project_id: project_id.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_project_fails_before_remote_call() {
        let stub = Arc::new(StubService::default());
        let mut init = SessionInitializer::new(stub.clone());

        let err = init.initialize(&config(None)).await.unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
        assert_eq!(stub.remote_calls(), 0);

        let err = init.initialize(&config(Some("  "))).await.unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
        assert_eq!(stub.remote_calls(), 0);
        assert_eq!(init.state(), &SessionState::NotInitialized);
    }

    #[tokio::test]
    async fn test_first_attempt_succeeds() {
        let stub = Arc::new(StubService::default());
        let mut init = SessionInitializer::new(stub.clone());

        let session = init.initialize(&config(Some("my-project"))).await.unwrap();
        assert_eq!(session.project_id, "my-project");
        assert_eq!(stub.init_calls.load(Ordering::SeqCst), 1);
        assert_eq!(stub.auth_calls.load(Ordering::SeqCst), 0);
        assert_eq!(init.state(), &SessionState::Initialized(session));
    }

    #[tokio::test]
    async fn test_reauthenticates_once_then_succeeds() {
        let stub = Arc::new(StubService::failing(1));
        let mut init = SessionInitializer::new(stub.clone());

        assert!(init.initialize(&config(Some("p"))).await.is_ok());
        assert_eq!(stub.init_calls.load(Ordering::SeqCst), 2);
        assert_eq!(stub.auth_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_failure_is_fatal() {
        let stub = Arc::new(StubService::failing(usize::MAX));
        let mut init = SessionInitializer::new(stub.clone());

        let err = init.initialize(&config(Some("p"))).await.unwrap_err();
        assert!(matches!(err, SessionError::Auth { .. }));
        assert_eq!(stub.init_calls.load(Ordering::SeqCst), 2);
        assert_eq!(stub.auth_calls.load(Ordering::SeqCst), 1);
        assert_eq!(init.state(), &SessionState::NotInitialized);
    }

    #[tokio::test]
    async fn test_failed_reauth_skips_retry() {
        let stub = Arc::new(StubService {
            failing_inits: usize::MAX,
            fail_auth: true,
            ..Default::default()
        });
        let mut init = SessionInitializer::new(stub.clone());

        let err = init.initialize(&config(Some("p"))).await.unwrap_err();
        assert!(matches!(err, SessionError::Reauth { .. }));
        assert_eq!(stub.init_calls.load(Ordering::SeqCst), 1);
    }
}
