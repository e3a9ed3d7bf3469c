//! Sidebar configuration
//!
//! Everything the renderer takes from the page: the chapter-list markup baked
//! in at build time, the relative path back to the site root, and the class
//! vocabulary the site's stylesheet reacts to.

use serde::{Deserialize, Serialize};

use crate::error::{SidebarError, SidebarResult};
use crate::storage::SCROLL_KEY;

/// Class names shared between the markup, the stylesheet and the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    /// Marks the entry for the current page
    pub active: String,
    /// Marks an open collapsible section
    pub expanded: String,
    /// Marks a list item that represents a page or heading
    pub chapter_item: String,
    /// Marks a section expand/collapse control
    pub toggle: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            active: "active".to_string(),
            expanded: "expanded".to_string(),
            chapter_item: "chapter-item".to_string(),
            toggle: "toggle".to_string(),
        }
    }
}

impl ClassNames {
    fn validate(&self) -> SidebarResult<()> {
        for (field, value) in [
            ("active", &self.active),
            ("expanded", &self.expanded),
            ("chapter_item", &self.chapter_item),
            ("toggle", &self.toggle),
        ] {
            // classList rejects empty tokens and tokens with whitespace
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(SidebarError::InvalidConfig(format!(
                    "class name '{field}' must be a single non-empty token, got {value:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Inputs of one sidebar render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarConfig {
    /// Full chapter list, identical on every page of a build
    pub markup: String,
    /// Relative path from the current page back to the site root
    #[serde(default)]
    pub root_path: String,
    #[serde(default)]
    pub classes: ClassNames,
    /// Session storage key for the remembered scroll offset
    #[serde(default = "default_scroll_key")]
    pub scroll_key: String,
}

fn default_scroll_key() -> String {
    SCROLL_KEY.to_string()
}

impl SidebarConfig {
    /// Create a configuration for a page at the site root
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            root_path: String::new(),
            classes: ClassNames::default(),
            scroll_key: default_scroll_key(),
        }
    }

    /// Set the relative path back to the site root
    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = root_path.into();
        self
    }

    pub fn with_classes(mut self, classes: ClassNames) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_scroll_key(mut self, key: impl Into<String>) -> Self {
        self.scroll_key = key.into();
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> SidebarResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SidebarResult<()> {
        self.classes.validate()?;
        if self.scroll_key.is_empty() {
            return Err(SidebarError::InvalidConfig(
                "scroll_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
