//! Background dispatch execution.

use crate::types::DispatchResult;
use dispatcher::Dispatcher;
use shared::attachment::PendingAttachment;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Run one dispatch on a background thread (non-blocking for the UI).
pub fn run_dispatch(
    dispatcher: Arc<Dispatcher>,
    prompt: String,
    attachment: Option<PendingAttachment>,
    tx: Sender<DispatchResult>,
) {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = tx.send(DispatchResult {
                generation: None,
                error: Some(format!("Failed to start async runtime: {}", e)),
            });
            return;
        }
    };

    let result = rt.block_on(dispatcher.dispatch(&prompt, attachment.as_ref()));

    let payload = match result {
        Ok(generation) => DispatchResult {
            generation: Some(generation),
            error: None,
        },
        Err(e) => DispatchResult {
            generation: None,
            error: Some(e.to_string()),
        },
    };
    let _ = tx.send(payload);
}
