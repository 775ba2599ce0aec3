use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub reload: ReloadConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

// ---------------------------------------------------------------------------
// Reload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReloadConfig {
    #[serde(default)]
    pub policy: ReloadPolicy,
}

/// What happens to existing mapping work when either side is reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Discard every pairing and remark; rebuild the full outer join.
    #[default]
    Rebuild,
    /// Keep pairings whose source and target ids both survive the reload.
    Retain,
}

impl std::fmt::Display for ReloadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rebuild => write!(f, "rebuild"),
            Self::Retain => write!(f, "retain"),
        }
    }
}

// ---------------------------------------------------------------------------
// Export + layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Prepend an `id` column holding the entry id.
    #[serde(default)]
    pub include_entry_id: bool,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_entry_id: false,
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> char {
    ','
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    #[serde(default = "default_column_width")]
    pub default_column_width: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_column_width: default_column_width(),
        }
    }
}

fn default_column_width() -> u32 {
    150
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let d = self.export.delimiter;
        if !d.is_ascii() || d.is_ascii_alphanumeric() || d == '"' || d == '\n' || d == '\r' {
            return Err(ReconError::ConfigValidation(format!(
                "export delimiter must be a single ASCII punctuation or whitespace character, got {d:?}"
            )));
        }

        if self.layout.default_column_width == 0 {
            return Err(ReconError::ConfigValidation(
                "layout.default_column_width must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// The export delimiter as a byte. Only valid after [`validate`](Self::validate).
    pub fn export_delimiter(&self) -> u8 {
        self.export.delimiter as u8
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
