use serde::{Deserialize, Serialize};
use tracing::warn;

/// Smallest accepted conversion rate. Inputs below it are clamped, not
/// rejected.
pub const RATE_FLOOR: f64 = 0.1;

const DEFAULT_RATE: f64 = 14.0;
const DEFAULT_LABEL: &str = "Steps";

/// Unit-conversion configuration.
///
/// Serialized field names match the documents written by earlier releases,
/// including the pre-rename `stepsPerTap` rate field that [Settings::load]
/// still understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub enable_conversion: bool,
    pub conversion_rate: f64,
    pub conversion_label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_conversion: true,
            conversion_rate: DEFAULT_RATE,
            conversion_label: DEFAULT_LABEL.to_string(),
        }
    }
}

/// Partial edit applied over current settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub enable_conversion: Option<bool>,
    pub conversion_rate: Option<f64>,
    pub conversion_label: Option<String>,
}

/// Persisted shape. Everything is optional so partial documents keep whatever
/// they omit at its current value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    enable_conversion: Option<bool>,
    conversion_rate: Option<f64>,
    conversion_label: Option<String>,
    steps_per_tap: Option<f64>,
}

impl Settings {
    /// Parses a persisted settings document. Corrupt state falls back to
    /// defaults with a warning; startup never fails because of it.
    pub fn load(raw: Option<&str>) -> Settings {
        let Some(raw) = raw else {
            return Settings::default();
        };
        match serde_json::from_str::<RawSettings>(raw) {
            Ok(parsed) => Settings::default().overlaid_with(parsed),
            Err(e) => {
                warn!("Persisted settings are corrupt, falling back to defaults: {e}");
                Settings::default()
            }
        }
    }

    /// Resolves a settings object nested inside an imported backup, overlaid
    /// on the live settings. Unusable values fall back to the live settings.
    pub fn merged_with_value(&self, value: serde_json::Value) -> Settings {
        match serde_json::from_value::<RawSettings>(value) {
            Ok(parsed) => self.clone().overlaid_with(parsed),
            Err(e) => {
                warn!("Imported settings are not usable, keeping current ones: {e}");
                self.clone()
            }
        }
    }

    /// Applies a partial edit. Rates below [RATE_FLOOR] are clamped; a blank
    /// label keeps the previous one rather than ever becoming empty.
    pub fn update(&self, patch: SettingsPatch) -> Settings {
        let mut next = self.clone();
        if let Some(enabled) = patch.enable_conversion {
            next.enable_conversion = enabled;
        }
        if let Some(rate) = patch.conversion_rate {
            next.conversion_rate = clamp_rate(rate);
        }
        if let Some(label) = patch.conversion_label {
            let trimmed = label.trim();
            if !trimmed.is_empty() {
                next.conversion_label = trimmed.to_string();
            }
        }
        next
    }

    fn overlaid_with(self, parsed: RawSettings) -> Settings {
        // Pre-rename documents carried only the rate and implied that
        // conversion was active. When both rate fields coexist the renamed
        // one wins and the legacy one is ignored.
        if parsed.conversion_rate.is_none() {
            if let Some(rate) = parsed.steps_per_tap {
                return Settings {
                    enable_conversion: true,
                    conversion_rate: clamp_rate(rate),
                    conversion_label: self.conversion_label,
                };
            }
        }

        self.update(SettingsPatch {
            enable_conversion: parsed.enable_conversion,
            conversion_rate: parsed.conversion_rate,
            conversion_label: parsed.conversion_label,
        })
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate >= RATE_FLOOR {
        rate
    } else {
        RATE_FLOOR
    }
}
