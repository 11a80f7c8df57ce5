use serde::{Deserialize, Serialize};

/// A concrete light or dark appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
}

/// The user's appearance override.
///
/// `System` defers to the platform appearance. Stored as the literal
/// strings `"null"`, `"light"` or `"dark"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemePreference {
    pub const ALL: &[ThemePreference] = &[Self::System, Self::Light, Self::Dark];

    /// Persisted string representation.
    pub fn as_storage_str(&self) -> &'static str {
        match self {
            Self::System => "null",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn from_storage_str(s: &str) -> Option<Self> {
        match s {
            "null" => Some(Self::System),
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The forced scheme, or `None` when following the system.
    pub fn override_scheme(&self) -> Option<ColorScheme> {
        match self {
            Self::System => None,
            Self::Light => Some(ColorScheme::Light),
            Self::Dark => Some(ColorScheme::Dark),
        }
    }

    /// Resolve against the platform appearance. Light when nothing is known.
    pub fn resolve(&self, system: Option<ColorScheme>) -> ColorScheme {
        self.override_scheme()
            .or(system)
            .unwrap_or(ColorScheme::Light)
    }
}

impl From<Option<ColorScheme>> for ThemePreference {
    fn from(scheme: Option<ColorScheme>) -> Self {
        match scheme {
            None => Self::System,
            Some(ColorScheme::Light) => Self::Light,
            Some(ColorScheme::Dark) => Self::Dark,
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "System"),
            Self::Light => write!(f, "Light"),
            Self::Dark => write!(f, "Dark"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_strings() {
        for pref in ThemePreference::ALL {
            let s = pref.as_storage_str();
            assert_eq!(ThemePreference::from_storage_str(s), Some(*pref));
        }
        assert_eq!(ThemePreference::from_storage_str("sepia"), None);
    }

    #[test]
    fn test_resolve() {
        let system = ThemePreference::System;
        assert_eq!(system.resolve(Some(ColorScheme::Dark)), ColorScheme::Dark);
        assert_eq!(system.resolve(None), ColorScheme::Light);
        assert_eq!(
            ThemePreference::Light.resolve(Some(ColorScheme::Dark)),
            ColorScheme::Light
        );
    }
}
