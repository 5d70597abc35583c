//! Main application struct and eframe integration

use crate::config::AppConfig;
use crate::ui::components::{Composer, MessageList, SuggestionGrid};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};

/// Main Deskchat application
pub struct DeskchatApp {
    state: AppState,
    theme: Theme,
}

impl DeskchatApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let theme = Theme::light();
        theme.apply(&cc.egui_ctx);

        Self {
            state: AppState::new(config),
            theme,
        }
    }

    /// Branded header with online indicator
    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.label(
                            RichText::new(&self.state.config.brand)
                                .size(18.0)
                                .strong()
                                .color(self.theme.text_primary),
                        );
                        ui.horizontal(|ui| {
                            ui.label(RichText::new("●").size(9.0).color(self.theme.success));
                            ui.label(
                                RichText::new("Online")
                                    .size(11.0)
                                    .color(self.theme.success),
                            );
                        });
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(&self.state.config.tagline)
                                .size(13.0)
                                .color(self.theme.text_muted),
                        );
                    });
                });
            });
    }

    /// Bottom composer bar
    fn show_composer_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("composer_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing_sm),
            )
            .show(ctx, |ui| {
                Composer::new(&mut self.state, &self.theme).show(ui);
            });
    }

    /// Scrolling conversation area: messages, then the suggestion grid
    /// until the user has sent something.
    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        MessageList::new(&self.state, &self.theme).show(ui);

                        if !self.state.messages.has_user_messages() {
                            SuggestionGrid::new(&mut self.state, &self.theme).show(ui);
                        }

                        ui.add_space(self.theme.spacing);
                    });
            });
    }
}

impl eframe::App for DeskchatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply pending recognition and outbound events before rendering
        self.state.poll_events();

        self.show_header(ctx);
        self.show_composer_area(ctx);
        self.show_content(ctx);

        // Keep polling while a recognition session is delivering events
        if self.state.dictation.is_listening() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.dictation.shutdown();
    }
}
