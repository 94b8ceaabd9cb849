//! Shared handler state.

use std::sync::Arc;

use tracing::warn;
use wpsage_core::SqlPolicy;
use wpsage_executor::{BackendKind, CodeBackend, DisabledBackend, ExecLimits, PhpProcessBackend};
use wpsage_store::{QueryBackend, SiteDataProvider};

use crate::{auth::AuthGuard, config::GatewayConfig};

/// Everything the route handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<AuthGuard>,
    pub site: Arc<dyn SiteDataProvider>,
    pub queries: Arc<dyn QueryBackend>,
    pub code: Arc<dyn CodeBackend>,
    pub sql_policy: SqlPolicy,
    pub limits: ExecLimits,
}

impl AppState {
    /// Build state with the restricted SQL policy and default limits.
    #[must_use]
    pub fn new(
        guard: Arc<AuthGuard>,
        site: Arc<dyn SiteDataProvider>,
        queries: Arc<dyn QueryBackend>,
        code: Arc<dyn CodeBackend>,
    ) -> Self {
        Self {
            guard,
            site,
            queries,
            code,
            sql_policy: SqlPolicy::restricted(),
            limits: ExecLimits::default(),
        }
    }

    /// Build state for a store that serves both snapshots and queries.
    #[must_use]
    pub fn for_site<S>(guard: Arc<AuthGuard>, site: Arc<S>, code: Arc<dyn CodeBackend>) -> Self
    where
        S: SiteDataProvider + QueryBackend + 'static,
    {
        let queries: Arc<dyn QueryBackend> = site.clone();
        Self::new(guard, site, queries, code)
    }

    /// Replace the SQL policy.
    #[must_use]
    pub fn with_sql_policy(mut self, policy: SqlPolicy) -> Self {
        self.sql_policy = policy;
        self
    }

    /// Replace the execution limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ExecLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Instantiate the code backend selected in `config`.
#[must_use]
pub fn code_backend(config: &GatewayConfig) -> Arc<dyn CodeBackend> {
    match config.code_backend {
        BackendKind::Disabled => Arc::new(DisabledBackend),
        BackendKind::Php => {
            warn!(
                binary = %config.php_binary.display(),
                "run-php enabled: payloads execute with the gateway's full privileges"
            );
            Arc::new(PhpProcessBackend::new(config.php_binary.clone(), config.limits))
        }
    }
}
