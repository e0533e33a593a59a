//! Shisan command-line client.
//!
//! Joins the configured room and follows it until the game finishes.

use anyhow::Context;
use serde_json::json;
use shisan_client::display::hand_assets;
use shisan_client::{
    spawn_poller, Bridge, ClientConfig, HttpTransport, PollOutcome, PollTarget, Snapshot,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    info!(api_base = %config.api_base, "Starting Shisan client...");

    let Some(target) = PollTarget::new(config.room_id.as_deref(), config.user_id.as_deref())
    else {
        warn!("SHISAN_ROOM_ID and SHISAN_USER_ID are required, nothing to follow");
        return Ok(());
    };

    let transport = Arc::new(HttpTransport::new()?);
    let bridge = Bridge::spawn(config.api_base.clone(), transport.clone());

    let joined = bridge
        .send(
            "joinRoom",
            json!({
                "resource": "thirteen",
                "roomId": target.room_id,
                "userId": target.user_id,
            }),
        )
        .await;
    match joined {
        Ok(response) => info!(request_id = %response.request_id, "Joined room"),
        // the user may already be seated; keep following the room
        Err(e) => warn!("{}", e),
    }

    let poller = spawn_poller(
        transport,
        &config.api_base,
        target.clone(),
        config.poll_interval,
        |record| info!(record = ?record.fields, "Game complete"),
    );

    let mut snapshots = poller.subscribe();
    let assets = config.assets.clone();
    let watcher = tokio::spawn(async move {
        let mut last = Snapshot::default();
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if snapshot.status != last.status {
                info!(status = %snapshot.status, players = snapshot.players.len(), "Status");
            }
            if let (None, Some(hand)) = (&last.hand, &snapshot.hand) {
                info!(cards = ?hand_assets(hand, &assets), "Dealt");
            }
            last = snapshot;
        }
    });

    let outcome = tokio::select! {
        outcome = poller.join() => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            PollOutcome::Cancelled
        }
    };
    watcher.abort();
    bridge.shutdown();

    match outcome {
        PollOutcome::Finished(snapshot) => {
            info!(room_id = %target.room_id, status = %snapshot.status, "Done");
            Ok(())
        }
        PollOutcome::Cancelled => Ok(()),
        PollOutcome::ConnectionLost(e) => {
            error!("Lost connection to {}", config.api_base);
            Err(e).context("polling stopped")
        }
        PollOutcome::InvalidTarget(e) => Err(e).context("cannot poll this room"),
    }
}
