//! Officedesk Admin Client Library
//!
//! Data access, role permissions and attachment storage for the office
//! administration app. The hosted backend owns authentication and enforces
//! row-level security; this crate decides what the UI offers.

pub mod api;
pub mod config;
pub mod documents;
pub mod error;
pub mod logging;
pub mod optimistic;
pub mod permissions;
pub mod rewards;
pub mod storage;

use std::sync::Arc;

use od_common::{CurrentUser, PermissionView, MODULE_REGISTRY};
use reqwest::Client as HttpClient;
use tokio::sync::RwLock;
use tracing::info;

use crate::api::DataApiClient;
use crate::config::Config;
use crate::documents::DocumentService;
use crate::optimistic::Notifier;
use crate::permissions::{
    ModuleAffordances, PermissionMatrix, PermissionService, RestPermissionStore,
};
use crate::rewards::RewardService;
use crate::storage::StorageClient;

pub use error::{ClientError, ClientResult};

/// Signed-in identity, maintained by the external auth flow.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Bearer token for data API requests.
    pub access_token: Option<String>,
    /// Current user.
    pub user: Option<CurrentUser>,
}

/// Application state shared by every screen.
#[derive(Clone)]
pub struct AdminClient {
    pub config: Arc<Config>,
    /// HTTP client for API requests.
    pub http: HttpClient,
    /// Authentication state.
    pub session: Arc<RwLock<SessionState>>,
    pub api: DataApiClient,
    pub permissions: PermissionService,
    pub documents: DocumentService,
    pub rewards: RewardService,
    /// Attachment storage, when configured.
    pub storage: Option<StorageClient>,
}

impl AdminClient {
    pub fn new(config: Config) -> ClientResult<Self> {
        let http = HttpClient::builder()
            .timeout(config.http_timeout())
            .build()?;
        let session = Arc::new(RwLock::new(SessionState::default()));
        let api = DataApiClient::new(
            http.clone(),
            &config.data_api_url,
            config.data_api_key.clone(),
            session.clone(),
        )?;

        let store = RestPermissionStore::new(api.clone(), config.permissions_table.clone());
        let storage = if config.has_storage() {
            Some(StorageClient::new(&config)?)
        } else {
            None
        };

        info!(
            url = %config.data_api_url,
            storage = storage.is_some(),
            "Admin client initialized"
        );

        Ok(Self {
            permissions: PermissionService::new(Arc::new(store)),
            documents: DocumentService::new(api.clone()),
            rewards: RewardService::new(api.clone()),
            config: Arc::new(config),
            http,
            session,
            api,
            storage,
        })
    }

    /// Install the identity produced by a successful sign-in.
    pub async fn set_session(&self, access_token: String, user: CurrentUser) {
        info!(user = %user.id, role = %user.role, "Session started");
        let mut session = self.session.write().await;
        session.access_token = Some(access_token);
        session.user = Some(user);
    }

    /// Forget the current identity and every cached permission.
    pub async fn clear_session(&self) {
        *self.session.write().await = SessionState::default();
        self.permissions.cache().invalidate_all();
        info!("Session cleared");
    }

    pub async fn current_user(&self) -> Option<CurrentUser> {
        self.session.read().await.user.clone()
    }

    /// Check if authenticated.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.access_token.is_some()
    }

    /// Effective permissions of the signed-in user on `module_key`.
    pub async fn permissions_for(&self, module_key: &str) -> PermissionView {
        let user = self.current_user().await;
        self.permissions.resolve(user.as_ref(), module_key).await
    }

    /// What a module screen should offer the signed-in user.
    pub async fn module_affordances(&self, module_key: &str) -> ModuleAffordances {
        ModuleAffordances::from_view(&self.permissions_for(module_key).await)
    }

    /// An unloaded permission matrix over every registered module.
    pub fn permission_matrix(&self, notifier: Arc<dyn Notifier>) -> PermissionMatrix {
        PermissionMatrix::new(self.permissions.clone(), notifier, MODULE_REGISTRY)
    }
}
