//! Suggestion card grid
//!
//! A two-column grid of clickable prompt cards, shown until the user sends
//! their first message. Clicking a card overwrites the composer with the
//! card's prompt and focuses the field.

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, RichText, Sense};

pub struct SuggestionGrid<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> SuggestionGrid<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let cards = self.state.config.suggestions.clone();
        let mut selected = None;

        ui.add_space(self.theme.spacing);

        let column_width =
            (ui.available_width() - self.theme.spacing_sm) / 2.0 - self.theme.spacing_sm;

        for (row, pair) in cards.chunks(2).enumerate() {
            ui.horizontal(|ui| {
                for (offset, card) in pair.iter().enumerate() {
                    let index = row * 2 + offset;
                    let response = egui::Frame::none()
                        .fill(self.theme.bg_secondary)
                        .rounding(self.theme.card_rounding)
                        .inner_margin(self.theme.spacing_sm)
                        .show(ui, |ui| {
                            ui.set_width(column_width);
                            ui.vertical(|ui| {
                                ui.label(RichText::new(&card.icon).size(20.0));
                                ui.label(
                                    RichText::new(&card.label)
                                        .size(13.0)
                                        .strong()
                                        .color(self.theme.text_primary),
                                );
                                ui.label(
                                    RichText::new("Click to ask about this")
                                        .size(11.0)
                                        .color(self.theme.text_muted),
                                );
                            });
                        })
                        .response
                        .interact(Sense::click());

                    if response.clicked() {
                        selected = Some(index);
                    }
                }
            });
            ui.add_space(self.theme.spacing_sm);
        }

        if let Some(index) = selected {
            self.state.select_suggestion(index);
        }
    }
}
