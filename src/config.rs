//! Application configuration
//!
//! Branding, recognition language, composer sizing, and the fixed suggestion
//! card set. Defaults embed the shipped card data; a JSON file can override
//! everything for white-labelling.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{DeskchatError, Result};

/// A clickable suggestion card. Selecting it overwrites the composer with
/// the card's prompt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestionCard {
    /// Emoji glyph shown on the card.
    pub icon: String,
    /// Card label, also the subject of the generated prompt.
    pub label: String,
}

impl SuggestionCard {
    pub fn new(icon: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            label: label.into(),
        }
    }

    /// The question placed into the composer when the card is selected.
    pub fn prompt(&self) -> String {
        format!("tell me about {}", self.label.to_lowercase())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Product name shown in the header.
    pub brand: String,

    /// Short descriptor under the brand.
    pub tagline: String,

    /// Assistant message seeded into the chat at startup.
    pub greeting: String,

    /// BCP-47 language tag requested from the recognition capability.
    pub language: String,

    /// Maximum visible composer height, in text lines.
    pub max_composer_rows: usize,

    /// Suggestion cards shown until the user sends a first message.
    pub suggestions: Vec<SuggestionCard>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            brand: "Deskchat".to_string(),
            tagline: "Workspace Assistant".to_string(),
            greeting: "👋 Hello! Welcome to Deskchat. How can I assist you today?".to_string(),
            language: "en-US".to_string(),
            max_composer_rows: 6,
            suggestions: vec![
                SuggestionCard::new("🏢", "Find coworking spaces in Dubai"),
                SuggestionCard::new("🧭", "Explore private offices near me"),
                SuggestionCard::new("🖥", "Check virtual office options"),
                SuggestionCard::new("🚪", "Book a meeting room"),
                SuggestionCard::new("📄", "Learn about flexible workspace plans"),
            ],
        }
    }
}

impl AppConfig {
    /// Set the recognition language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Replace the suggestion card set
    pub fn with_suggestions(mut self, suggestions: Vec<SuggestionCard>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Load a configuration override from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&raw)
            .map_err(|e| DeskchatError::Config(format!("invalid config JSON: {e}")))?;
        config.validate().map_err(DeskchatError::Config)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.brand.trim().is_empty() {
            return Err("brand must not be empty".to_string());
        }
        if self.language.trim().is_empty() {
            return Err("language must not be empty".to_string());
        }
        if self.max_composer_rows == 0 {
            return Err("max_composer_rows must be at least 1".to_string());
        }
        Ok(())
    }
}
