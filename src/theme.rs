//! Color themes, and persistence of the theme the user has chosen

use std::collections::BTreeMap;

use csscolorparser::Color;
use once_cell::sync::Lazy;

use crate::traits::KeyValueStore;

/// The key of the chosen theme in the key-value store
pub const THEME_KEY: &str = "theme";
pub const DEFAULT_THEME: &str = "default";
pub const DARK_THEME: &str = "dark";

/// The colors of every UI role
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeColors {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
    pub text: Color,
    pub card_background: Color,
    pub button_background: Color,
    pub button_text: Color,
    pub header_background: Color,
    pub header_text: Color,
    pub border_color: Color,
    pub calendar_background: Color,
    pub status_bar_color: Color,
}

impl ThemeColors {
    /// Build a palette from its CSS hex colors, in the order of the struct fields
    fn from_hex(hex: [&str; 12]) -> Self {
        // These are compile-time literals, that are all checked by `every_theme_is_valid`
        let c = |i: usize| csscolorparser::parse(hex[i]).unwrap();
        Self {
            primary: c(0),
            secondary: c(1),
            background: c(2),
            text: c(3),
            card_background: c(4),
            button_background: c(5),
            button_text: c(6),
            header_background: c(7),
            header_text: c(8),
            border_color: c(9),
            calendar_background: c(10),
            status_bar_color: c(11),
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        themes()[DEFAULT_THEME].clone()
    }
}

static PALETTES: &[(&str, [&str; 12])] = &[
    ("default",  ["#2196F3", "#4CAF50", "#F5F5F5", "#333333", "#FFFFFF", "#2196F3", "#FFFFFF", "#2196F3", "#FFFFFF", "#DDDDDD", "#FFFFFF", "#2196F3"]),
    ("dark",     ["#BB86FC", "#03DAC6", "#121212", "#FFFFFF", "#1E1E1E", "#BB86FC", "#000000", "#1E1E1E", "#FFFFFF", "#333333", "#1E1E1E", "#000000"]),
    ("nature",   ["#4CAF50", "#8BC34A", "#E8F5E9", "#1B5E20", "#FFFFFF", "#4CAF50", "#FFFFFF", "#2E7D32", "#FFFFFF", "#A5D6A7", "#FFFFFF", "#2E7D32"]),
    ("ocean",    ["#0288D1", "#03A9F4", "#E1F5FE", "#01579B", "#FFFFFF", "#0288D1", "#FFFFFF", "#0277BD", "#FFFFFF", "#81D4FA", "#FFFFFF", "#0277BD"]),
    ("sunset",   ["#FF5722", "#FF9800", "#FBE9E7", "#BF360C", "#FFFFFF", "#FF5722", "#FFFFFF", "#E64A19", "#FFFFFF", "#FFCCBC", "#FFFFFF", "#E64A19"]),
    ("lavender", ["#9C27B0", "#BA68C8", "#F3E5F5", "#4A148C", "#FFFFFF", "#9C27B0", "#FFFFFF", "#7B1FA2", "#FFFFFF", "#E1BEE7", "#FFFFFF", "#7B1FA2"]),
    ("mint",     ["#009688", "#4DB6AC", "#E0F2F1", "#004D40", "#FFFFFF", "#009688", "#FFFFFF", "#00796B", "#FFFFFF", "#B2DFDB", "#FFFFFF", "#00796B"]),
    ("rose",     ["#E91E63", "#F06292", "#FCE4EC", "#880E4F", "#FFFFFF", "#E91E63", "#FFFFFF", "#C2185B", "#FFFFFF", "#F8BBD0", "#FFFFFF", "#C2185B"]),
    ("gold",     ["#FFC107", "#FFD54F", "#FFF8E1", "#FF6F00", "#FFFFFF", "#FFC107", "#000000", "#FFA000", "#000000", "#FFE082", "#FFFFFF", "#FFA000"]),
    ("slate",    ["#607D8B", "#90A4AE", "#ECEFF1", "#263238", "#FFFFFF", "#607D8B", "#FFFFFF", "#455A64", "#FFFFFF", "#CFD8DC", "#FFFFFF", "#455A64"]),
    ("cherry",   ["#D32F2F", "#E57373", "#FFEBEE", "#B71C1C", "#FFFFFF", "#D32F2F", "#FFFFFF", "#C62828", "#FFFFFF", "#FFCDD2", "#FFFFFF", "#C62828"]),
    ("forest",   ["#388E3C", "#81C784", "#E8F5E9", "#1B5E20", "#FFFFFF", "#388E3C", "#FFFFFF", "#2E7D32", "#FFFFFF", "#C8E6C9", "#FFFFFF", "#2E7D32"]),
    ("midnight", ["#3F51B5", "#7986CB", "#E8EAF6", "#1A237E", "#FFFFFF", "#3F51B5", "#FFFFFF", "#303F9F", "#FFFFFF", "#C5CAE9", "#FFFFFF", "#303F9F"]),
    ("coral",    ["#FF7043", "#FFB74D", "#FBE9E7", "#BF360C", "#FFFFFF", "#FF7043", "#FFFFFF", "#E64A19", "#FFFFFF", "#FFCCBC", "#FFFFFF", "#E64A19"]),
    ("arctic",   ["#00BCD4", "#4DD0E1", "#E0F7FA", "#006064", "#FFFFFF", "#00BCD4", "#FFFFFF", "#0097A7", "#FFFFFF", "#B2EBF2", "#FFFFFF", "#0097A7"]),
];

static THEMES: Lazy<BTreeMap<&'static str, ThemeColors>> = Lazy::new(|| {
    PALETTES.iter()
        .map(|(name, hex)| (*name, ThemeColors::from_hex(*hex)))
        .collect()
});

/// Every available theme, by name
pub fn themes() -> &'static BTreeMap<&'static str, ThemeColors> {
    &THEMES
}

/// The names of the available themes, in the order they should be listed to the user
pub fn theme_names() -> impl Iterator<Item = &'static str> {
    PALETTES.iter().map(|(name, _)| *name)
}


/// A change of the theme state
#[derive(Clone, Debug, PartialEq)]
pub enum ThemeAction {
    SetTheme(String),
}

/// The current theme
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeState {
    current_theme: String,
    colors: ThemeColors,
}

impl ThemeState {
    /// The state for a theme name. Unknown names fall back to the default theme
    pub fn named(name: &str) -> Self {
        match themes().get(name) {
            Some(colors) => Self { current_theme: name.to_string(), colors: colors.clone() },
            None => {
                log::warn!("Unknown theme {:?}, using the default theme", name);
                Self::default()
            }
        }
    }

    pub fn current_theme(&self) -> &str { &self.current_theme }
    pub fn colors(&self) -> &ThemeColors { &self.colors }

    /// Whether this theme should use dark navigation chrome
    pub fn is_dark(&self) -> bool {
        self.current_theme == DARK_THEME
    }

    /// Returns the state after `action`. `self` is left untouched
    pub fn apply(&self, action: ThemeAction) -> Self {
        match action {
            ThemeAction::SetTheme(name) => Self::named(&name),
        }
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            current_theme: DEFAULT_THEME.to_string(),
            colors: ThemeColors::default(),
        }
    }
}

/// Load the theme the user has chosen. Any error gives the default theme
pub async fn load_theme<S: KeyValueStore>(store: &S) -> ThemeState {
    let name = match store.get_blob(THEME_KEY).await {
        Ok(Some(name)) => name,
        Ok(None) => return ThemeState::default(),
        Err(err) => {
            log::warn!("Unable to read the theme: {}. Using the default theme", err);
            return ThemeState::default();
        }
    };
    ThemeState::named(name.trim())
}

/// Persist the theme the user has chosen. Errors are only logged
pub async fn save_theme<S: KeyValueStore>(store: &S, state: &ThemeState) {
    if let Err(err) = store.set_blob(THEME_KEY, state.current_theme()).await {
        log::warn!("Unable to save the theme: {}", err);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn every_theme_is_valid() {
        assert_eq!(themes().len(), 15);
        assert_eq!(theme_names().count(), 15);
        for name in theme_names() {
            assert!(themes().contains_key(name));
        }
        assert_eq!(themes()["ocean"].primary.to_hex_string(), "#0288d1");
    }

    #[test]
    fn set_theme_is_a_pure_transition() {
        let initial = ThemeState::default();
        let dark = initial.apply(ThemeAction::SetTheme("dark".to_string()));
        assert_eq!(initial.current_theme(), "default");
        assert_eq!(dark.current_theme(), "dark");
        assert!(dark.is_dark());
        assert_eq!(dark.colors().background.to_hex_string(), "#121212");

        let unknown = dark.apply(ThemeAction::SetTheme("neon".to_string()));
        assert_eq!(unknown, ThemeState::default());
    }

    #[tokio::test]
    async fn theme_is_persisted() {
        let store = MemoryStore::new();
        assert_eq!(load_theme(&store).await, ThemeState::default());

        save_theme(&store, &ThemeState::named("mint")).await;
        assert_eq!(store.raw_blob(THEME_KEY).as_deref(), Some("mint"));
        assert_eq!(load_theme(&store).await.current_theme(), "mint");
    }
}
