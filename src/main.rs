//! # User Management Demo
//!
//! Walks through the user lifecycle against an in-memory store:
//! 1.  Starting the [`UserSystem`] from environment configuration.
//! 2.  Creating users, including one with fault injection switched on.
//! 3.  Listing, fetching and deleting them.

use tracing::{error, info, warn, Instrument};
use user_management::framework::{ChaosType, RequestContext};
use user_management::lifecycle::{setup_tracing, SystemConfig, UserSystem};
use user_management::model::UserEvent;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = SystemConfig::from_env().map_err(|e| e.to_string())?;
    info!(?config, "Starting user management demo");

    let system = UserSystem::new(config);
    let client = system.user_client.clone();
    info!(timeout = ?system.config().request_timeout(), "User system ready");

    let span = tracing::info_span!("user_creation");
    let mut created = Vec::new();
    async {
        for name in ["Alice", "Bob", "Carol"] {
            let ctx = RequestContext::default().with_correlation_id(format!("create-{name}"));
            match client.create_user(name, ctx).await {
                Ok(UserEvent::UserCreated(user)) => {
                    info!(id = %user.id, name = %user.name, "User created");
                    created.push(user.id);
                }
                Ok(other) => warn!(reply = other.name(), "Unexpected reply"),
                Err(e) => error!(error = %e, "Create failed"),
            }
        }
    }
    .instrument(span)
    .await;

    // A create with the chaos marker fails without changing anything.
    let chaos = RequestContext::default().with_chaos(ChaosType::CreateUserDown);
    match client.create_user("Mallory", chaos).await {
        Ok(reply) => info!(reply = reply.name(), outcome = ?reply.outcome(), "Fault-injected create"),
        Err(e) => error!(error = %e, "Fault-injected create failed"),
    }

    let page = client
        .list_users(None, None, RequestContext::default())
        .await
        .map_err(|e| e.to_string())?;
    if let UserEvent::UsersRetrieved(page) = &page {
        info!(total = page.total_count, returned = page.users.len(), "Users listed");
        for user in &page.users {
            info!(id = %user.id, name = %user.name, created_on = %user.created_on, "User");
        }
    }

    if let Some(id) = created.first().copied() {
        let deleted = client
            .delete_user(id, RequestContext::default())
            .await
            .map_err(|e| e.to_string())?;
        info!(%id, outcome = ?deleted.outcome(), "Delete");

        let fetched = client
            .get_user(id, RequestContext::default())
            .await
            .map_err(|e| e.to_string())?;
        info!(%id, outcome = ?fetched.outcome(), "Fetch after delete");
    }

    drop(client);
    info!(restarts = system.restarts(), "Processor restarts");
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
