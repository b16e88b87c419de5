//! Core types and state for the ChatBot app.
//!
//! The conversation store and the submit/poll cycle live here; rendering
//! stays in `main.rs`.

use dispatcher::Dispatcher;
use eframe::egui;
use shared::attachment::{load_attachment, PendingAttachment};
use shared::chat::{Message, MessageAttachment};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use uuid::Uuid;

/// Result from a background dispatch.
#[derive(Debug)]
pub struct DispatchResult {
    pub generation: Option<shared::chat::GenerationResult>,
    pub error: Option<String>,
}

/// Whether a request is in flight. A new submission is ignored while
/// one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

pub const ERROR_REPLY: &str =
    "Sorry, I encountered an error. Please check your API key and try again.";
pub const WELCOME: &str =
    "Hello! You can ask me questions, ask me to generate images, or upload an image and ask about it.";

/// Main application state
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Ordered transcript. Append-only.
    pub messages: Vec<Message>,
    /// Current input text
    pub input_text: String,
    /// File staged for the next submission
    pub pending_attachment: Option<PendingAttachment>,
    /// Preview texture for a staged image attachment. Released on
    /// removal and handed to the transcript on submit.
    pub attachment_preview: Option<egui::TextureHandle>,
    /// Staged preview decode failed; don't retry every frame.
    pub preview_failed: bool,
    /// Decoded textures for message attachments, keyed by message id.
    pub message_textures: HashMap<Uuid, egui::TextureHandle>,
    /// Messages whose attachment could not be decoded.
    pub texture_failed: HashSet<Uuid>,
    pub phase: Phase,
    /// Async dispatch result channel
    pub dispatch_rx: Option<Receiver<DispatchResult>>,
    /// User-visible intake warning (oversized or unreadable file).
    pub attachment_warning: Option<String>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            messages: vec![Message::assistant(Some(WELCOME.to_string()), None)],
            input_text: String::new(),
            pending_attachment: None,
            attachment_preview: None,
            preview_failed: false,
            message_textures: HashMap::new(),
            texture_failed: HashSet::new(),
            phase: Phase::Idle,
            dispatch_rx: None,
            attachment_warning: None,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    /// Stage a file for the next submission, replacing any staged one.
    /// Rejected files leave the current staging untouched and surface a
    /// warning instead.
    pub fn attach_file(&mut self, path: &Path) {
        match load_attachment(path) {
            Ok(attachment) => {
                self.pending_attachment = Some(attachment);
                self.attachment_preview = None;
                self.preview_failed = false;
                self.attachment_warning = None;
            }
            Err(e) => {
                self.attachment_warning = Some(e.to_string());
            }
        }
    }

    /// Discard the staged attachment and its preview texture. The typed
    /// prompt is left as-is.
    pub fn remove_attachment(&mut self) {
        self.pending_attachment = None;
        self.attachment_preview = None;
        self.preview_failed = false;
        self.attachment_warning = None;
    }

    /// Submit the current prompt + staged attachment.
    ///
    /// The user message is appended synchronously; the model call runs
    /// on a background thread. Submissions while a request is in flight
    /// are ignored entirely.
    pub fn submit(&mut self) {
        if self.phase == Phase::AwaitingResponse {
            return;
        }
        let prompt = self.input_text.clone();
        if prompt.trim().is_empty() && self.pending_attachment.is_none() {
            return;
        }

        let attachment = self.pending_attachment.take();
        let preview = self.attachment_preview.take();
        self.preview_failed = false;
        self.attachment_warning = None;

        let user_msg = Message::user(
            (!prompt.trim().is_empty()).then(|| prompt.clone()),
            attachment.as_ref().map(|a| MessageAttachment {
                locator: a.path.to_string_lossy().to_string(),
                media_type: a.media_type.clone(),
            }),
        );
        // Hand the staged preview over to the transcript entry so the
        // attachment bytes can be dropped with the pending state.
        if let Some(texture) = preview {
            self.message_textures.insert(user_msg.id, texture);
        }
        self.messages.push(user_msg);
        self.phase = Phase::AwaitingResponse;
        self.input_text.clear();

        let (tx, rx) = channel::<DispatchResult>();
        self.dispatch_rx = Some(rx);
        let dispatcher = Arc::clone(&self.dispatcher);
        std::thread::spawn(move || {
            crate::state::run_dispatch(dispatcher, prompt, attachment, tx);
        });
    }

    /// Check for a completed dispatch (called each frame).
    pub fn poll_dispatch(&mut self) {
        let Some(rx) = &self.dispatch_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.dispatch_rx = None;
                self.phase = Phase::Idle;

                if let Some(error) = result.error {
                    tracing::error!("dispatch failed: {}", error);
                    self.messages
                        .push(Message::assistant(Some(ERROR_REPLY.to_string()), None));
                    return;
                }

                let generation = result.generation.unwrap_or_default();
                let attachment = generation.image_locator.map(|locator| MessageAttachment {
                    locator,
                    media_type: "image/png".to_string(),
                });
                self.messages
                    .push(Message::assistant(generation.text, attachment));
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                // Worker died without a result; treat it like a failure.
                self.dispatch_rx = None;
                self.phase = Phase::Idle;
                self.messages
                    .push(Message::assistant(Some(ERROR_REPLY.to_string()), None));
            }
        }
    }
}
