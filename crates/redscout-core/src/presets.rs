use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Bounds accepted for preset limits, matching the dashboard input ranges.
const POST_LIMIT_RANGE: std::ops::RangeInclusive<u32> = 1..=200;
const COMMENT_LIMIT_MAX: u32 = 1000;

/// A named scan-intensity preset: how many posts per subreddit and how many
/// comments per post a signal scan will fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPreset {
    pub name: String,
    pub post_limit: u32,
    pub comment_limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct PresetsFile {
    pub presets: Vec<ScanPreset>,
}

/// The presets shipped with the application, used when no presets file is
/// configured.
#[must_use]
pub fn builtin_presets() -> Vec<ScanPreset> {
    vec![
        ScanPreset {
            name: "fast".to_string(),
            post_limit: 10,
            comment_limit: 20,
        },
        ScanPreset {
            name: "standard".to_string(),
            post_limit: 50,
            comment_limit: 100,
        },
        ScanPreset {
            name: "deep".to_string(),
            post_limit: 100,
            comment_limit: 500,
        },
    ]
}

/// Load and validate scan presets from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_presets(path: &Path) -> Result<Vec<ScanPreset>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PresetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: PresetsFile = serde_yaml::from_str(&content)?;
    validate_presets(&file.presets)?;

    Ok(file.presets)
}

/// Look up a preset by name, case-insensitively.
#[must_use]
pub fn resolve_preset<'a>(presets: &'a [ScanPreset], name: &str) -> Option<&'a ScanPreset> {
    presets.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

fn validate_presets(presets: &[ScanPreset]) -> Result<(), ConfigError> {
    if presets.is_empty() {
        return Err(ConfigError::Validation(
            "presets file must define at least one preset".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    for preset in presets {
        if preset.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "preset name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(preset.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate preset name '{}'",
                preset.name
            )));
        }

        if !POST_LIMIT_RANGE.contains(&preset.post_limit) {
            return Err(ConfigError::Validation(format!(
                "preset '{}' has post_limit {}; must be between 1 and 200",
                preset.name, preset.post_limit
            )));
        }

        if preset.comment_limit > COMMENT_LIMIT_MAX {
            return Err(ConfigError::Validation(format!(
                "preset '{}' has comment_limit {}; must be at most 1000",
                preset.name, preset.comment_limit
            )));
        }
    }

    Ok(())
}
