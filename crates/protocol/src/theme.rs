use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the active renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Foreground,

    /// Section numbers and the progress bar fill.
    Accent,
    AccentDark,

    /// Unfilled part of a bar.
    Track,
}

impl ThemeToken {
    /// CSS color for browser renderers.
    pub fn css(self) -> &'static str {
        match self {
            ThemeToken::Background => "#000000",
            ThemeToken::Foreground => "#ffffff",
            ThemeToken::Accent => "#ffd841",
            ThemeToken::AccentDark => "#ffd700",
            ThemeToken::Track => "rgba(156, 163, 175, 0.2)",
        }
    }
}
