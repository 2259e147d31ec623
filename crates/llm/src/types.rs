//! Provider identification.

/// Language-model provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Gemini,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    /// Human-facing name used when rendering provider failures.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
        }
    }
}
