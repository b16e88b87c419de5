pub mod gemini;

pub use gemini::{ContentModel, GeminiClient, GenerateRequest, InlineImage, ModelResponse, Part};
