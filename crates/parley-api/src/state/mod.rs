//! Application state
//!
//! Holds the shared state for the Axum application including the service
//! context, the token verifier, and configuration.

use std::sync::Arc;

use parley_common::{AppConfig, JwtVerifier};
use parley_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    jwt_verifier: Arc<JwtVerifier>,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        let jwt_verifier = Arc::new(JwtVerifier::new(&config.jwt.secret));
        Self {
            service_context: Arc::new(service_context),
            jwt_verifier,
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the token verifier
    pub fn jwt_verifier(&self) -> &JwtVerifier {
        &self.jwt_verifier
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .finish()
    }
}
