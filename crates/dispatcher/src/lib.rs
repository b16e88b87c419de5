//! Chooses between the image-generation and text/vision call paths and
//! normalizes what comes back from the model.

pub mod classify;

pub use classify::{classify, clean_image_prompt, RequestKind};

use anyhow::Result;
use providers::{ContentModel, GenerateRequest, Part};
use shared::attachment::{encode_data_uri, PendingAttachment};
use shared::chat::GenerationResult;
use shared::settings::AppSettings;
use std::sync::Arc;
use tracing::{debug, warn};

pub const EMPTY_SUBJECT_REPLY: &str = "Please provide a prompt for image generation.";
pub const NO_OUTPUT_REPLY: &str =
    "Sorry, I couldn't generate an image for that prompt. Please try a different description.";
pub const REFUSED_REPLY: &str =
    "Sorry, I was unable to generate an image. The model may have refused the request.";

pub struct Dispatcher {
    model: Arc<dyn ContentModel>,
    settings: AppSettings,
}

impl Dispatcher {
    pub fn new(model: Arc<dyn ContentModel>, settings: AppSettings) -> Self {
        Self { model, settings }
    }

    /// One request/response cycle. Makes at most one model call.
    ///
    /// Image-generation failures are always converted into a text reply;
    /// text/vision failures propagate to the caller.
    pub async fn dispatch(
        &self,
        prompt: &str,
        attachment: Option<&PendingAttachment>,
    ) -> Result<GenerationResult> {
        match classify(prompt, attachment.is_some()) {
            RequestKind::ImageGen => Ok(self.generate_image(prompt).await),
            RequestKind::TextVision => self.generate_text_or_vision(prompt, attachment).await,
        }
    }

    async fn generate_image(&self, prompt: &str) -> GenerationResult {
        let subject = clean_image_prompt(prompt);
        if subject.is_empty() {
            return text_only(EMPTY_SUBJECT_REPLY.to_string());
        }

        debug!(model = %self.settings.image_model, "image generation request");
        let request = GenerateRequest {
            model: self.settings.image_model.clone(),
            parts: vec![Part::Text(subject.clone())],
            image_output: true,
        };

        match self.model.generate(request).await {
            Ok(response) => {
                // Inline image bytes win over any accompanying text.
                if let Some(image) = response.image {
                    return GenerationResult {
                        text: Some(format!("Generated image for: \"{}\"", subject)),
                        image_locator: Some(encode_data_uri("image/png", &image.data)),
                    };
                }
                if let Some(text) = response.text {
                    return text_only(text);
                }
                text_only(NO_OUTPUT_REPLY.to_string())
            }
            Err(e) => {
                warn!("image generation failed: {:#}", e);
                text_only(REFUSED_REPLY.to_string())
            }
        }
    }

    async fn generate_text_or_vision(
        &self,
        prompt: &str,
        attachment: Option<&PendingAttachment>,
    ) -> Result<GenerationResult> {
        // Attachment bytes go first in the part sequence, prompt text last.
        let mut parts = Vec::new();
        if let Some(att) = attachment {
            parts.push(Part::InlineData {
                media_type: att.media_type.clone(),
                data: att.data.clone(),
            });
        }
        parts.push(Part::Text(prompt.to_string()));

        debug!(model = %self.settings.text_model, "text/vision request");
        let response = self
            .model
            .generate(GenerateRequest {
                model: self.settings.text_model.clone(),
                parts,
                image_output: false,
            })
            .await?;

        Ok(GenerationResult {
            text: response.text,
            image_locator: None,
        })
    }
}

fn text_only(text: String) -> GenerationResult {
    GenerationResult {
        text: Some(text),
        image_locator: None,
    }
}
