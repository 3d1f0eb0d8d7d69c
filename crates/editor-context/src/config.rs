//! Session options affecting context switches.
//!
//! Options are plain data; hosts usually load them from a TOML table:
//!
//! ```toml
//! auto-follow-directory = true
//! virtual-edit-past-end = false
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Errors produced while loading [`ContextOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML text did not parse or contained unknown keys.
    #[error("invalid editor options: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Options consulted by the window switcher and cursor validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ContextOptions {
    /// Keep the working directory on the current buffer's directory (`autochdir`).
    pub auto_follow_directory: bool,
    /// Let the Normal-mode cursor rest one past the last character (`virtualedit=onemore`).
    pub virtual_edit_past_end: bool,
}

impl ContextOptions {
    /// Parse options from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_toml() {
        let options = ContextOptions::from_toml_str("auto-follow-directory = true\n").unwrap();
        assert!(options.auto_follow_directory);
        assert!(!options.virtual_edit_past_end);

        assert_eq!(
            ContextOptions::from_toml_str("").unwrap(),
            ContextOptions::default()
        );
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = ContextOptions::from_toml_str("autochdir = true").unwrap_err();
        assert!(err.to_string().starts_with("invalid editor options"));
    }
}
