use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Color palette, as hex strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub background: &'static str,
    pub card_background: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub white: &'static str,
}

pub const LIGHT: Palette = Palette {
    primary: "#4A90E2",
    secondary: "#2C3E50",
    accent: "#F4D03F",
    success: "#2ECC71",
    warning: "#F39C12",
    error: "#E74C3C",
    background: "#F5F7FA",
    card_background: "#FFFFFF",
    text: "#1A1A1A",
    text_secondary: "#7A7A7A",
    border: "#E0E0E0",
    white: "#FFFFFF",
};

pub const DARK: Palette = Palette {
    primary: "#5A9FF2",
    secondary: "#3D556B",
    accent: "#F7DC6F",
    success: "#2ECC71",
    warning: "#F39C12",
    error: "#E74C3C",
    background: "#121212",
    card_background: "#1E1E1E",
    text: "#F5F5F5",
    text_secondary: "#A0A0A0",
    border: "#2C2C2C",
    white: "#FFFFFF",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub mode: ThemeMode,
    pub colors: Palette,
}

impl Theme {
    pub fn new(mode: ThemeMode) -> Self {
        let colors = match mode {
            ThemeMode::Light => LIGHT,
            ThemeMode::Dark => DARK,
        };
        Self { mode, colors }
    }

    pub fn is_dark(&self) -> bool {
        self.mode == ThemeMode::Dark
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeMode::Light)
    }
}
