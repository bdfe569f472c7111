use serde::{Deserialize, Serialize};

pub const MIN_FONT_SIZE: u32 = 12;
pub const MAX_FONT_SIZE: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingMode {
    #[default]
    Word,
    Line,
}

/// Only meaningful in [`ReadingMode::Word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    #[serde(default)]
    pub mode: ReadingMode,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    #[serde(default = "default_margin")]
    pub margin: u32,
    #[serde(default)]
    pub show_translation: bool,
}

fn default_font_size() -> u32 {
    16
}

fn default_line_height() -> f32 {
    1.5
}

fn default_margin() -> u32 {
    16
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            mode: ReadingMode::default(),
            orientation: Orientation::default(),
            font_size: default_font_size(),
            line_height: default_line_height(),
            margin: default_margin(),
            show_translation: false,
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub mode: Option<ReadingMode>,
    pub orientation: Option<Orientation>,
    pub font_size: Option<u32>,
    pub line_height: Option<f32>,
    pub margin: Option<u32>,
    pub show_translation: Option<bool>,
}

impl SettingsPatch {
    pub fn font_size(size: u32) -> Self {
        Self {
            font_size: Some(size),
            ..Default::default()
        }
    }
}

impl ReaderSettings {
    /// Shallow merge. Font size is clamped to the supported range here rather
    /// than at each call site.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(orientation) = patch.orientation {
            self.orientation = orientation;
        }
        if let Some(size) = patch.font_size {
            self.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        }
        if let Some(line_height) = patch.line_height {
            self.line_height = line_height;
        }
        if let Some(margin) = patch.margin {
            self.margin = margin;
        }
        if let Some(show) = patch.show_translation {
            self.show_translation = show;
        }
    }

    pub fn sanitized(mut self) -> Self {
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self
    }
}
