//! Helper functions for UI operations.
//!
//! Background request spawning and the panic guard around spawned tasks.

use crate::api::ResourceClient;
use crate::app::AppEvent;
use crate::view::Pending;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Panics in spawned tasks would otherwise vanish into the runtime. Here they
/// come back as `Err(panic_message)` so the UI can report them.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn a prepared request. The result comes back as
/// `AppEvent::Delivered`, or `AppEvent::TaskPanicked` if the task panicked.
pub(super) fn spawn_request(
    client: &ResourceClient,
    pending: Pending,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let client = client.clone();
    let tx = event_tx.clone();
    let task = pending.name();
    let ticket = pending.ticket();
    let kind = pending.kind();

    tracing::debug!(task, %kind, "Spawning request");

    tokio::spawn(async move {
        match catch_task_panic(pending.execute(&client)).await {
            Ok(delivery) => {
                if let Err(e) = tx.send(AppEvent::Delivered(delivery)).await {
                    tracing::warn!(error = %e, task, "Channel send failed (receiver dropped)");
                }
            }
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Background task panicked");
                let _ = tx
                    .send(AppEvent::TaskPanicked {
                        task,
                        ticket,
                        error: panic_msg,
                    })
                    .await;
            }
        }
    });
}
