use anyhow::anyhow;
use dispatcher::Dispatcher;
use eframe::egui;
use parking_lot::Mutex;
use providers::GeminiClient;
use shared::chat::{Message, Sender};
use std::sync::Arc;

mod state;
mod textures;
mod widgets;

// Types module - core type definitions
mod types;
pub use types::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // The service credential is required up front; there is no
    // per-request fallback.
    let client = GeminiClient::new()?;
    let settings = shared::settings::load_settings_or_default();
    tracing::info!(
        text_model = %settings.text_model,
        image_model = %settings.image_model,
        "starting ChatBot"
    );
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(client), settings));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([480.0, 480.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "ChatBot",
        options,
        Box::new(move |_cc| {
            Box::new(ChatBotApp {
                state: Arc::new(Mutex::new(AppState::new(dispatcher))),
            })
        }),
    )
    .map_err(|e| anyhow!("{}", e))
}

struct ChatBotApp {
    state: Arc<Mutex<AppState>>,
}

impl eframe::App for ChatBotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut s = self.state.lock();

        // Poll for a finished dispatch (non-blocking)
        s.poll_dispatch();
        if s.is_awaiting() {
            ctx.request_repaint();
        }

        // A file dropped anywhere on the window becomes the staged
        // attachment, same as picking it through the dialog.
        if !s.is_awaiting() {
            if let Some(path) = widgets::attach::take_dropped_file(ctx) {
                s.attach_file(&path);
            }
        }

        ensure_attachment_preview(&mut s, ctx);
        ensure_message_textures(&mut s, ctx);

        render_header(ctx);
        render_input_bar(&mut s, ctx);
        render_transcript(&s, ctx);
    }
}

/// Lazily decode the staged attachment into its input-bar preview.
fn ensure_attachment_preview(s: &mut AppState, ctx: &egui::Context) {
    if s.attachment_preview.is_some() || s.preview_failed {
        return;
    }
    let Some(att) = &s.pending_attachment else {
        return;
    };
    if !att.is_image() {
        return;
    }
    match att
        .bytes()
        .and_then(|bytes| textures::texture_from_bytes(ctx, "attachment_preview", &bytes))
    {
        Some(texture) => s.attachment_preview = Some(texture),
        None => s.preview_failed = true,
    }
}

/// Decode message attachments into textures on first sight. Failures are
/// remembered so a bad payload isn't re-decoded every frame.
fn ensure_message_textures(s: &mut AppState, ctx: &egui::Context) {
    let wanted: Vec<(uuid::Uuid, String)> = s
        .messages
        .iter()
        .filter_map(|m| {
            let att = m.attachment.as_ref()?;
            if !att.is_image()
                || s.message_textures.contains_key(&m.id)
                || s.texture_failed.contains(&m.id)
            {
                return None;
            }
            Some((m.id, att.locator.clone()))
        })
        .collect();

    for (id, locator) in wanted {
        let name = id.to_string();
        let texture = if locator.starts_with("data:") {
            textures::texture_from_data_uri(ctx, &name, &locator)
        } else {
            std::fs::read(&locator)
                .ok()
                .and_then(|bytes| textures::texture_from_bytes(ctx, &name, &bytes))
        };
        match texture {
            Some(texture) => {
                s.message_textures.insert(id, texture);
            }
            None => {
                s.texture_failed.insert(id);
            }
        }
    }
}

fn render_header(ctx: &egui::Context) {
    egui::TopBottomPanel::top("header").show(ctx, |ui| {
        ui.add_space(6.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new("ChatBot")
                    .size(18.0)
                    .strong()
                    .color(egui::Color32::from_rgb(56, 189, 248)),
            );
        });
        ui.add_space(6.0);
    });
}

fn render_input_bar(s: &mut AppState, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("input_bar").show(ctx, |ui| {
        ui.add_space(6.0);

        if let Some(warning) = s.attachment_warning.clone() {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(220, 120, 120), warning);
                if ui.small_button("Dismiss").clicked() {
                    s.attachment_warning = None;
                }
            });
            ui.add_space(4.0);
        }

        // Staged attachment chip with preview and a remove button.
        let mut remove_clicked = false;
        if let Some(att) = &s.pending_attachment {
            egui::Frame::none()
                .fill(ui.visuals().faint_bg_color)
                .rounding(egui::Rounding::same(8.0))
                .inner_margin(egui::Margin::same(6.0))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if let Some(texture) = &s.attachment_preview {
                            let size = texture.size_vec2();
                            let scale = (96.0 / size.y).min(1.0);
                            ui.image((texture.id(), size * scale));
                        } else {
                            ui.label(
                                egui::RichText::new(format!("📄 {}", att.file_name)).size(13.0),
                            );
                        }
                        if ui.button("✕").on_hover_text("Remove attachment").clicked() {
                            remove_clicked = true;
                        }
                    });
                });
            ui.add_space(4.0);
        }
        if remove_clicked {
            s.remove_attachment();
        }

        let busy = s.is_awaiting();
        ui.horizontal(|ui| {
            let attach = ui
                .add_enabled(!busy, egui::Button::new("📎"))
                .on_hover_text("Attach file");
            if attach.clicked() {
                if let Some(path) = widgets::attach::pick_attachment() {
                    s.attach_file(&path);
                }
            }

            let response = ui.add_sized(
                [ui.available_width() - 80.0, 40.0],
                egui::TextEdit::singleline(&mut s.input_text)
                    .hint_text("Type your message or /generate an image...")
                    .font(egui::FontId::new(15.0, egui::FontFamily::Proportional))
                    .interactive(!busy),
            );

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                s.submit();
                response.request_focus();
            }

            let can_send =
                !busy && (!s.input_text.trim().is_empty() || s.pending_attachment.is_some());
            let send_clicked = ui
                .add_enabled_ui(can_send, |ui| {
                    ui.add_sized(
                        [70.0, 40.0],
                        egui::Button::new("Send").fill(egui::Color32::from_rgb(70, 130, 180)),
                    )
                    .clicked()
                })
                .inner;
            if send_clicked {
                s.submit();
            }
        });
        ui.add_space(6.0);
    });
}

fn render_transcript(s: &AppState, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let dark = ui.visuals().dark_mode;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for msg in &s.messages {
                    ui.add_space(6.0);
                    render_message(ui, msg, s.message_textures.get(&msg.id), dark);
                    ui.add_space(6.0);
                }

                if s.is_awaiting() {
                    ui.add_space(6.0);
                    render_thinking_indicator(ui, dark);
                }
            });
    });
}

fn render_thinking_indicator(ui: &mut egui::Ui, dark: bool) {
    egui::Frame::none()
        .fill(if dark {
            egui::Color32::from_rgb(50, 50, 58)
        } else {
            egui::Color32::from_rgb(230, 230, 235)
        })
        .rounding(egui::Rounding::same(12.0))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                // Animated spinner dots
                let time = ui.input(|i| i.time);
                let dots = match ((time * 2.0) as i32) % 4 {
                    0 => "   ",
                    1 => ".  ",
                    2 => ".. ",
                    _ => "...",
                };
                ui.label(
                    egui::RichText::new(format!("Thinking{}", dots))
                        .color(if dark {
                            egui::Color32::from_rgb(160, 160, 180)
                        } else {
                            egui::Color32::from_rgb(60, 60, 70)
                        })
                        .italics(),
                );
            });
        });
}

fn render_message(
    ui: &mut egui::Ui,
    msg: &Message,
    texture: Option<&egui::TextureHandle>,
    dark: bool,
) {
    let is_user = msg.sender == Sender::User;

    if is_user {
        // User message - right aligned, blue
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
            ui.add_space(8.0);
            egui::Frame::none()
                .fill(egui::Color32::from_rgb(70, 130, 180))
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::same(12.0))
                .show(ui, |ui| {
                    ui.set_max_width(500.0);
                    ui.vertical(|ui| {
                        render_attachment(ui, msg, texture);
                        if let Some(text) = &msg.text {
                            ui.label(
                                egui::RichText::new(text)
                                    .color(egui::Color32::WHITE)
                                    .size(15.0),
                            );
                        }
                        ui.label(
                            egui::RichText::new(&msg.timestamp)
                                .size(10.0)
                                .color(egui::Color32::from_rgb(200, 220, 235)),
                        );
                    });
                });
        });
    } else {
        // Assistant message - left aligned
        egui::Frame::none()
            .fill(if dark {
                egui::Color32::from_rgb(50, 50, 58)
            } else {
                egui::Color32::from_rgb(245, 245, 248)
            })
            .rounding(egui::Rounding::same(12.0))
            .inner_margin(egui::Margin::same(12.0))
            .show(ui, |ui| {
                ui.set_max_width(600.0);

                let text_color = if dark {
                    egui::Color32::from_rgb(220, 220, 230)
                } else {
                    egui::Color32::from_rgb(40, 40, 50)
                };

                render_attachment(ui, msg, texture);
                if let Some(text) = &msg.text {
                    ui.label(egui::RichText::new(text).color(text_color).size(15.0));
                }
                ui.label(egui::RichText::new(&msg.timestamp).size(10.0).weak());
            });
    }
}

fn render_attachment(ui: &mut egui::Ui, msg: &Message, texture: Option<&egui::TextureHandle>) {
    let Some(att) = &msg.attachment else {
        return;
    };
    if att.is_image() {
        if let Some(texture) = texture {
            let size = texture.size_vec2();
            let scale = (320.0 / size.x).min(256.0 / size.y).min(1.0);
            ui.image((texture.id(), size * scale));
        } else {
            ui.label(egui::RichText::new("[image unavailable]").italics().size(12.0));
        }
    } else {
        let name = std::path::Path::new(&att.locator)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Attachment".to_string());
        ui.label(egui::RichText::new(format!("📄 {}", name)).size(13.0));
    }
    ui.add_space(4.0);
}
