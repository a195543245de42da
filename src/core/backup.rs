use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::{settings::Settings, tally::TallyStore};

/// Why an imported document was rejected. Rejection leaves all state
/// untouched; anything that parses as a JSON object is accepted through the
/// shape fallback in [parse_document] instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file is not a well-formed JSON document, or its history mapping is
    /// not date-keyed non-negative integers.
    #[error("invalid backup document: {0}")]
    Parse(#[from] serde_json::Error),
    /// Well-formed JSON that cannot be a backup at all (not an object).
    #[error("a backup document must be a JSON object")]
    NotAnObject,
}

/// A successfully parsed import. `settings` is present only when the document
/// carried a usable settings object.
#[derive(Debug, PartialEq)]
pub struct ParsedBackup {
    pub history: BTreeMap<NaiveDate, u64>,
    pub settings: Option<Settings>,
}

/// Serializes the combined backup shape, pretty-printed for hand inspection.
/// Key order inside `history` carries no meaning in the format; the map type
/// keeps it deterministic regardless.
pub fn export_document(history: &TallyStore, settings: &Settings) -> String {
    #[derive(Serialize)]
    struct Document<'a> {
        history: &'a TallyStore,
        settings: &'a Settings,
    }

    serde_json::to_string_pretty(&Document { history, settings })
        .expect("a backup document always serializes")
}

/// Parses an imported document.
///
/// Two shapes are accepted: the combined `{history, settings}` document, and
/// the bare mapping older exports produced, which has no wrapper and changes
/// no settings. A nested settings object goes through the same legacy-rate
/// handling as settings loaded at startup, overlaid on `current_settings`.
///
/// Applying the result replaces the entire tally history, so callers must
/// obtain an explicit overwrite confirmation from the user before doing so.
pub fn parse_document(
    raw: &str,
    current_settings: &Settings,
) -> Result<ParsedBackup, ImportError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(mut fields) = value else {
        return Err(ImportError::NotAnObject);
    };

    if let Some(history) = fields.remove("history") {
        let history = serde_json::from_value(history)?;
        let settings = fields
            .remove("settings")
            .map(|nested| current_settings.merged_with_value(nested));
        Ok(ParsedBackup { history, settings })
    } else {
        debug!("No history field, reading the document as a bare mapping");
        let history = serde_json::from_value(Value::Object(fields))?;
        Ok(ParsedBackup {
            history,
            settings: None,
        })
    }
}
