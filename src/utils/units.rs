use crate::core::settings::Settings;

/// Formats a converted-unit value, dropping the fraction when it's whole.
/// Rates can be fractional, so the result isn't always an integer.
pub fn format_units(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// One-line rendition of a count, with the converted value attached when
/// conversion is active.
pub fn format_count(count: u64, settings: &Settings) -> String {
    if settings.enable_conversion {
        let converted = crate::core::aggregate::convert(count, settings);
        format!(
            "{count} taps ({} {})",
            format_units(converted),
            settings.conversion_label
        )
    } else {
        format!("{count} taps")
    }
}
