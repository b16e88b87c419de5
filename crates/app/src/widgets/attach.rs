//! Attachment intake: native file dialog and window drag-and-drop.

use egui::Context;
use std::path::PathBuf;

/// File kinds the input bar accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "txt", "md", "pdf"];

/// Open a native file dialog scoped to the accepted kinds. Blocks until
/// the user picks or cancels.
pub fn pick_attachment() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Attach a file")
        .add_filter("All supported", ACCEPTED_EXTENSIONS)
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
        .add_filter("Text", &["txt", "md"])
        .add_filter("PDF", &["pdf"])
        .pick_file()
}

/// Capture a file dropped onto the window this frame, if any.
pub fn take_dropped_file(ctx: &Context) -> Option<PathBuf> {
    ctx.input(|i| i.raw.dropped_files.iter().find_map(|file| file.path.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_accepted_extensions_have_media_types() {
        for ext in ACCEPTED_EXTENSIONS {
            let path = format!("file.{}", ext);
            assert!(
                shared::attachment::media_type_for(Path::new(&path)).is_some(),
                "no media type for .{}",
                ext
            );
        }
    }
}
