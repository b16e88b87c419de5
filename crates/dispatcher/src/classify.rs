//! Request classification: image-generation command vs text/vision query.

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    ImageGen,
    TextVision,
}

/// Decide which call path a prompt takes.
///
/// A prompt is an image-generation command only when no attachment is
/// staged, it starts with a command verb, and it names an image-like
/// object somewhere. Everything else is a text/vision query.
pub fn classify(prompt: &str, has_attachment: bool) -> RequestKind {
    if has_attachment {
        return RequestKind::TextVision;
    }
    let trimmed = prompt.trim();
    let verb = Regex::new(r"(?i)^(?:/generate|generate|create|make|draw)\b").unwrap();
    let noun = Regex::new(r"(?i)\b(?:image|picture|photo|drawing)\b").unwrap();
    if verb.is_match(trimmed) && noun.is_match(trimmed) {
        RequestKind::ImageGen
    } else {
        RequestKind::TextVision
    }
}

/// Strip the leading command phrase ("generate an image of ...") to get
/// the bare subject description.
pub fn clean_image_prompt(prompt: &str) -> String {
    let lead = Regex::new(
        r"(?i)^(?:/generate|generate|create|make|draw)\s*(?:an?|the)?\s*(?:image|picture|photo|drawing)?\s*(?:of|for)?\s*",
    )
    .unwrap();
    lead.replace(prompt.trim(), "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_and_noun_select_image_path() {
        assert_eq!(
            classify("generate an image of a cat", false),
            RequestKind::ImageGen
        );
        assert_eq!(
            classify("/generate a picture of a dog", false),
            RequestKind::ImageGen
        );
        assert_eq!(
            classify("Draw a PHOTO of mountains", false),
            RequestKind::ImageGen
        );
        assert_eq!(
            classify("  make a drawing of a boat  ", false),
            RequestKind::ImageGen
        );
    }

    #[test]
    fn test_verb_alone_is_not_enough() {
        assert_eq!(classify("generate a report", false), RequestKind::TextVision);
        assert_eq!(classify("make me a sandwich", false), RequestKind::TextVision);
    }

    #[test]
    fn test_noun_alone_is_not_enough() {
        assert_eq!(
            classify("what's in this image?", false),
            RequestKind::TextVision
        );
    }

    #[test]
    fn test_verb_must_start_the_prompt() {
        assert_eq!(
            classify("please generate an image of a cat", false),
            RequestKind::TextVision
        );
        assert_eq!(
            classify("regenerate the image", false),
            RequestKind::TextVision
        );
    }

    #[test]
    fn test_attachment_always_routes_to_vision() {
        assert_eq!(
            classify("generate an image of a cat", true),
            RequestKind::TextVision
        );
        assert_eq!(classify("what is this?", true), RequestKind::TextVision);
    }

    #[test]
    fn test_clean_strips_full_command_phrase() {
        assert_eq!(clean_image_prompt("generate an image of a cat"), "a cat");
        assert_eq!(clean_image_prompt("/generate picture of the moon"), "the moon");
        assert_eq!(
            clean_image_prompt("Create a drawing for my garden"),
            "my garden"
        );
        assert_eq!(clean_image_prompt("draw a photo of"), "");
    }

    #[test]
    fn test_clean_leaves_subject_only_prompts() {
        // Only the leading phrase is touched.
        assert_eq!(
            clean_image_prompt("generate an image of a cat wearing an image of a hat"),
            "a cat wearing an image of a hat"
        );
    }
}
