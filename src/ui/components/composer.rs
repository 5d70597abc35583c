//! Composer bar component
//!
//! The message input field plus the dictation toggle and send controls. The
//! field grows with its contents up to the configured row limit; growth is
//! re-run whenever the controller reports a text change.

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Key, KeyboardShortcut, Modifiers, RichText, Vec2};

pub struct Composer<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> Composer<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    self.show_mic_button(ui);
                    ui.add_space(self.theme.spacing_sm);
                    self.show_text_input(ui);
                    ui.add_space(self.theme.spacing_sm);
                    self.show_send_button(ui);
                });
            });
    }

    fn show_mic_button(&mut self, ui: &mut egui::Ui) {
        let listening = self.state.dictation.is_listening();
        let mic_available = self.state.dictation.mic_available();

        let (icon, tooltip, color) = if listening {
            ("⏹", "Listening... Click to stop", self.theme.recording)
        } else if mic_available {
            ("🎤", "Click to speak", self.theme.text_secondary)
        } else {
            ("🎤", "Microphone not available", self.theme.text_muted)
        };

        let button = egui::Button::new(RichText::new(icon).size(20.0).color(color))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding);

        let button = if listening {
            button.fill(self.theme.recording.gamma_multiply(0.2))
        } else {
            button
        };

        let response = ui.add_enabled(mic_available || listening, button);
        let button_rect = response.rect;

        if response.clicked() {
            self.state.dictation.toggle_dictation();
        }
        response.on_hover_text(tooltip);

        // Pulsing ring while listening
        if listening {
            let t = ui.ctx().input(|i| i.time);
            let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

            let painter = ui.painter();
            let center = button_rect.center();
            let radius = button_rect.width() / 2.0 + 2.0 + pulse * 3.0;

            painter.circle_stroke(
                center,
                radius,
                egui::Stroke::new(
                    2.0 * pulse,
                    self.theme.recording.gamma_multiply(1.0 - pulse * 0.5),
                ),
            );

            ui.ctx().request_repaint();
        }
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        let max_rows = self.state.config.max_composer_rows;

        // The controller owns the buffer; edits are copied back through
        // set_composer_text so every mutation raises the resize effect.
        let mut text = self.state.dictation.composer_text().to_string();
        let rows = text.lines().count().clamp(1, max_rows);

        let available_width = ui.available_width() - 60.0; // Reserve space for send button

        let text_edit = egui::TextEdit::multiline(&mut text)
            .hint_text("Type your message...")
            .desired_rows(rows)
            .desired_width(available_width)
            .font(egui::TextStyle::Body)
            .margin(egui::Margin::symmetric(12.0, 8.0))
            // Shift+Enter inserts a newline; plain Enter sends.
            .return_key(Some(KeyboardShortcut::new(Modifiers::SHIFT, Key::Enter)));

        let response = ui.add(text_edit);

        if response.changed() {
            self.state.dictation.set_composer_text(text);
        }

        if self.state.focus_composer {
            response.request_focus();
            self.state.focus_composer = false;
        }

        if response.has_focus() {
            let send_pressed =
                ui.input(|i| i.key_pressed(Key::Enter) && !i.modifiers.shift);
            if send_pressed {
                self.state.send_message();
            }
        }

        // Resize effect: the row count above is derived from the new text,
        // so a pending request just needs one more layout pass.
        if self.state.dictation.take_resize_request() {
            ui.ctx().request_repaint();
        }
    }

    fn show_send_button(&mut self, ui: &mut egui::Ui) {
        let can_send = !self.state.dictation.composer_text().trim().is_empty();

        let button_color = if can_send {
            self.theme.primary
        } else {
            self.theme.text_muted
        };

        let button = egui::Button::new(
            RichText::new("➤").size(18.0).color(egui::Color32::WHITE),
        )
        .min_size(Vec2::splat(44.0))
        .rounding(self.theme.button_rounding)
        .fill(button_color);

        let response = ui.add_enabled(can_send, button);

        if response.clicked() {
            self.state.send_message();
        }

        response.on_hover_text("Send message (Enter)");
    }
}
