mod config;
mod core;
mod inventory;
mod poller;
mod resources;

pub use crate::{
    config::{ConsoleConfig, DEFAULT_CONFIG_FILE, RateLimitConfig},
    core::domain::{
        error::{ConsoleError, ConsoleResult, ValidationError},
        model::{
            blueprint::{BlueprintDraft, BlueprintRecord},
            machine::{Machine, MachineFact, MachineListItem, Run},
            machine_record::{
                Hardware, MachineFactEntry, MachineNetwork, MachineRecord, MachineRun,
                MachineStatus, RunStatus,
            },
        },
        value_object::{ApiBaseUrl, DEFAULT_API_BASE, SessionCookie},
    },
    core::infrastructure::resource_cache::ResourceKey,
    inventory::{
        Inventory,
        aggregate::{
            InventoryFilter, SiteFilter, StatusCounts, StatusFilter, compute_counts,
            filter_records, site_options,
        },
        facts::MAX_FACT_ENTRIES,
        normalizer::{normalize, normalize_all},
    },
    poller::{InventoryPoller, InventorySource, InventoryUpdate, PollerHandle},
};
use crate::core::infrastructure::{api_client::ApiClient, resource_cache::ResourceCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// A client for the goose'd provisioning API.
///
/// This client provides:
/// - Cached machine listings and their normalized inventory
/// - Blueprint listing and CRUD with local draft validation
/// - A background poller that keeps the inventory current
///
/// # Examples
///
/// ```no_run
/// use goosed_console::{GoosedClient, InventoryFilter, MachineStatus, ConsoleResult};
///
/// #[tokio::main]
/// async fn main() -> ConsoleResult<()> {
///     let client = GoosedClient::builder()
///         .origin("https://goosed.example.com")
///         .session_cookie("goosed_session=abc123")
///         .build()?;
///
///     let inventory = client.inventory().await?;
///     let failing = inventory.filter(&InventoryFilter::new().status(MachineStatus::Error));
///     println!("{} of {} machines failing", failing.len(), inventory.len());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct GoosedClient {
    pub(crate) api_client: ApiClient,
    pub(crate) config: ConsoleConfig,
    pub(crate) machines: ResourceCache<Vec<MachineListItem>>,
    pub(crate) blueprints: ResourceCache<Vec<BlueprintRecord>>,
    pub(crate) mutation_lock: Mutex<()>,
}

/// Builder for GoosedClient configuration
#[derive(Debug, Default)]
pub struct GoosedClientBuilder {
    config: ConsoleConfig,
}

impl GoosedClientBuilder {
    /// Starts from loaded settings instead of the defaults.
    pub fn config(mut self, config: ConsoleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.config.origin = Some(origin.into());
        self
    }

    /// API base path joined to the origin, or an absolute API URL.
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.config.api_base = api_base.into();
        self
    }

    pub fn session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.config.session_cookie = Some(cookie.into());
        self
    }

    /// Whole seconds are used.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_secs = interval.as_secs();
        self
    }

    /// Whole seconds are used.
    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.config.stale_time_secs = stale_time.as_secs();
        self
    }

    /// Whole seconds are used.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_secs = timeout.as_secs();
        self
    }

    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> Self {
        self.config.rate_limit = Some(RateLimitConfig {
            requests_per_second,
            burst_size,
        });
        self
    }

    /// Validates the settings and builds the client. No request is sent.
    pub fn build(self) -> ConsoleResult<GoosedClient> {
        GoosedClient::from_config(self.config)
    }
}

impl GoosedClient {
    /// Creates a new builder for GoosedClient configuration
    pub fn builder() -> GoosedClientBuilder {
        GoosedClientBuilder::default()
    }

    /// Builds a client from loaded settings.
    ///
    /// # Errors
    /// Returns `ConsoleError::Validation` if the settings are invalid.
    pub fn from_config(config: ConsoleConfig) -> ConsoleResult<Self> {
        let api_client = ApiClient::new(&config)?;
        let stale_time = config.stale_time();

        Ok(Self {
            api_client,
            machines: ResourceCache::new(ResourceKey::Machines, stale_time),
            blueprints: ResourceCache::new(ResourceKey::Blueprints, stale_time),
            config,
            mutation_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Resolved API base URL.
    pub fn base_url(&self) -> &ApiBaseUrl {
        self.api_client.base_url()
    }

    /// Replaces the session credentials and drops every cached listing.
    pub async fn set_session(&self, session: Option<SessionCookie>) {
        self.api_client.set_session(session).await;
        self.invalidate(ResourceKey::Machines);
        self.invalidate(ResourceKey::Blueprints);
    }

    /// Returns true if a session cookie is set
    pub async fn has_session(&self) -> bool {
        self.api_client.has_session().await
    }

    /// Marks a cached listing stale so the next read fetches it again.
    pub fn invalidate(&self, key: ResourceKey) {
        match key {
            ResourceKey::Machines => self.machines.invalidate(),
            ResourceKey::Blueprints => self.blueprints.invalidate(),
        }
    }

    /// Starts refreshing the inventory every configured poll interval.
    pub fn spawn_poller(self: &Arc<Self>) -> PollerHandle {
        InventoryPoller::new(Arc::clone(self), self.config.poll_interval()).spawn()
    }
}
