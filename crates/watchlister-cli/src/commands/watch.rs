use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use tracing::{debug, info};

use crate::commands::app::App;
use crate::output::{Output, OutputFormat};

/// Follow the user's document and print a line per remote snapshot until
/// interrupted. Useful for watching edits land from another device.
pub async fn run_watch(app: &App, output: &Output) -> Result<()> {
    let mut store = app.hydrated_store(output).await?;
    let session = store
        .session()
        .cloned()
        .ok_or_else(|| eyre!("Not signed in. Run `watchlister auth login` first"))?;

    let mut rx = app
        .docs()
        .watch_document(&session.uid)
        .await
        .map_err(|e| eyre!("Failed to subscribe to changes: {}", e))?;
    info!(uid = %session.uid, "subscribed to document changes");

    output.info(format!(
        "Watching {} ({} item(s), {} watched). Press Ctrl-C to stop.",
        session.email,
        store.count(),
        store.watched().len()
    ));

    loop {
        tokio::select! {
            snapshot = rx.recv() => {
                let Some(doc) = snapshot else {
                    output.warn("Change stream ended");
                    break;
                };
                store.apply_snapshot(doc);
                debug!(count = store.count(), "applied remote snapshot");
                match output.format() {
                    OutputFormat::Human => {
                        output.println(format!(
                            "Updated: {} item(s), {} watched",
                            store.count(),
                            store.watched().len()
                        ));
                    }
                    OutputFormat::Json | OutputFormat::JsonPretty => {
                        output.json(&json!({
                            "type": "snapshot",
                            "count": store.count(),
                            "watched_count": store.watched().len(),
                        }));
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                output.info("Stopped watching");
                break;
            }
        }
    }
    Ok(())
}
