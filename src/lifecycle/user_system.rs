use crate::clients::UserClient;
use crate::domain::Users;
use crate::framework::{Registry, Router};
use crate::lifecycle::SystemConfig;
use crate::model::DomainEvent;
use crate::persistence::{InMemoryProvider, PersistenceProvider};
use std::sync::Arc;
use tracing::{error, info};

/// The runtime orchestrator for the user management core.
///
/// `UserSystem` is responsible for:
/// - **Lifecycle Management**: Starting the router and, through it, the supervised processor
/// - **Dependency Wiring**: Handing the persistence port and configuration to the processor factory
/// - **Shutdown**: Closing the mailboxes and waiting for every task to finish
///
/// # Architecture
///
/// - **Router**: Started eagerly. It is the only thing callers talk to.
/// - **User processor**: Spawned by the router on the first request, kept alive by a
///   [`Supervisor`](crate::framework::Supervisor) and tracked in a [`Registry`].
///
/// # Example
///
/// ```ignore
/// let system = UserSystem::new(SystemConfig::default());
///
/// let created = system.user_client.create_user("Ada", RequestContext::default()).await?;
/// let page = system.user_client.list_users(None, None, RequestContext::default()).await?;
///
/// system.shutdown().await?;
/// ```
pub struct UserSystem {
    /// Client for interacting with the user aggregate
    pub user_client: UserClient,

    config: SystemConfig,
    registry: Registry,
    router_handle: tokio::task::JoinHandle<()>,
}

impl UserSystem {
    /// Creates a system backed by a fresh [`InMemoryProvider`].
    pub fn new(config: SystemConfig) -> Self {
        Self::with_provider(config, Arc::new(InMemoryProvider::new()))
    }

    /// Creates a system on top of an existing persistence port.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn with_provider(
        config: SystemConfig,
        provider: Arc<dyn PersistenceProvider<DomainEvent, Users>>,
    ) -> Self {
        let registry = Registry::new();

        let factory = {
            let registry = registry.clone();
            let persistence_id = config.persistence_id.clone();
            let snapshot_policy = config.snapshot;
            let mailbox_size = config.mailbox_size;
            move || {
                let handle = crate::user_actor::supervisor(
                    persistence_id.clone(),
                    provider.clone(),
                    snapshot_policy,
                    mailbox_size,
                )
                .with_restart_counter(registry.restart_counter())
                .spawn();
                registry.register(handle)
            }
        };

        let (router, router_client) = Router::new(config.mailbox_size, factory);
        let router_handle = tokio::spawn(router.run());

        let user_client = UserClient::new(router_client, config.request_timeout())
            .with_page_defaults(config.default_limit, config.default_skip);

        info!(persistence_id = %config.persistence_id, "User system started");

        Self {
            user_client,
            config,
            registry,
            router_handle,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Number of processor restarts since the system started.
    pub fn restarts(&self) -> u64 {
        self.registry.restarts()
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the client closes the router's mailbox. The router then drops its handle to
    /// the processor, whose mailbox closes in turn. Clones of `user_client` held elsewhere
    /// keep the system running until they are dropped too.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if every task shut down cleanly
    /// - `Err(String)` if any task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.user_client);

        if let Err(e) = self.router_handle.await {
            error!("Router task failed: {:?}", e);
            return Err(format!("Router task failed: {:?}", e));
        }

        self.registry.join_all().await?;

        info!("System shutdown complete.");
        Ok(())
    }
}
