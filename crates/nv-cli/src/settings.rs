use serde::{Deserialize, Serialize};
use std::path::Path;

/// Presentation settings.  The store itself never truncates or caps output;
/// these only shape what `nv-cli list` prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliSettings {
    /// Maximum notes printed by `list` before a "more notes exist" footer.
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
    /// Content longer than this many characters is cut with "...".
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_display_limit() -> usize {
    25
}

fn default_preview_chars() -> usize {
    1024
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            display_limit: default_display_limit(),
            preview_chars: default_preview_chars(),
        }
    }
}

pub fn load_settings(path: &Path) -> anyhow::Result<CliSettings> {
    if !path.exists() {
        return Ok(CliSettings::default());
    }
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
