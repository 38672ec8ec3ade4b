//! The canonical extraction record and its fallback shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// When the model's reply cannot be parsed, the fallback record keeps this
/// many characters of the combined raw text in `about`.
pub const FALLBACK_ABOUT_CHARS: usize = 2_000;

/// Fixed-key school record. Every field is always present; `facilities` is
/// the only sequence-valued field. Field order is the wire order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchoolRecord {
    #[serde(default)]
    pub school_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub board: String,
    #[serde(default)]
    pub classes_offered: String,
    #[serde(default)]
    pub fees: String,
    #[serde(default)]
    pub admission_process: String,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub transport: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub summary: String,
}

impl SchoolRecord {
    /// Degraded shape used when the model output cannot be parsed:
    /// everything empty except `about`, which keeps the head of the
    /// combined raw text so the caller still gets something informative.
    pub fn fallback(raw: &str) -> Self {
        Self {
            about: truncate_chars(raw, FALLBACK_ABOUT_CHARS),
            ..Self::default()
        }
    }
}

/// What the model handed back after validation: either a refusal with a
/// reason (query not a school name, or no matching text) or a populated
/// record. Both are legal replies under the prompt contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extraction {
    Refusal { error: String },
    Record(SchoolRecord),
}

/// Which profile URL (if any) fed each site's block of raw text.
pub type SourceLinks = BTreeMap<String, Option<String>>;

/// Extraction plus source annotation, ready for presentation. Serializes
/// flat: the record (or refusal) keys at the top level, `_sources` beside
/// them.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractOutcome {
    #[serde(flatten)]
    pub extraction: Extraction,
    #[serde(rename = "_sources")]
    pub sources: SourceLinks,
}

/// Char-boundary-safe prefix (character count, not bytes).
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_keeps_only_the_head_of_the_raw_text() {
        let raw = "x".repeat(FALLBACK_ABOUT_CHARS + 500);
        let record = SchoolRecord::fallback(&raw);
        assert_eq!(record.about.chars().count(), FALLBACK_ABOUT_CHARS);
        assert!(record.school_name.is_empty());
        assert!(record.facilities.is_empty());
    }

    #[test]
    fn fallback_serializes_with_every_declared_key() {
        let value = serde_json::to_value(SchoolRecord::fallback("raw")).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "school_name",
            "address",
            "location",
            "contact",
            "website",
            "email",
            "board",
            "classes_offered",
            "fees",
            "admission_process",
            "facilities",
            "transport",
            "rating",
            "about",
            "summary",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert!(obj["facilities"].as_array().unwrap().is_empty());
        assert_eq!(obj["about"], "raw");
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let s = "šk".repeat(10);
        assert_eq!(truncate_chars(&s, 3), "škš");
    }

    #[test]
    fn refusal_shape_deserializes_as_refusal() {
        let e: Extraction = serde_json::from_str(r#"{"error": "Invalid school name"}"#).unwrap();
        assert_eq!(
            e,
            Extraction::Refusal {
                error: "Invalid school name".to_string()
            }
        );
    }

    #[test]
    fn record_shape_deserializes_as_record_with_defaults() {
        let e: Extraction =
            serde_json::from_str(r#"{"school_name": "Green Valley", "facilities": ["Library"]}"#)
                .unwrap();
        match e {
            Extraction::Record(r) => {
                assert_eq!(r.school_name, "Green Valley");
                assert_eq!(r.facilities, vec!["Library".to_string()]);
                assert!(r.summary.is_empty());
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn outcome_serializes_flat_with_sources() {
        let mut sources = SourceLinks::new();
        sources.insert("edustoke".to_string(), None);
        sources.insert(
            "yellowslate".to_string(),
            Some("https://yellowslate.com/school/x/y".to_string()),
        );
        let outcome = ExtractOutcome {
            extraction: Extraction::Record(SchoolRecord {
                school_name: "Green Valley".to_string(),
                ..Default::default()
            }),
            sources,
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["school_name"], "Green Valley");
        assert_eq!(
            value["_sources"]["yellowslate"],
            "https://yellowslate.com/school/x/y"
        );
        assert!(value["_sources"]["edustoke"].is_null());
    }

    #[test]
    fn refusal_outcome_serializes_error_and_sources_only() {
        let outcome = ExtractOutcome {
            extraction: Extraction::Refusal {
                error: "No data found".to_string(),
            },
            sources: SourceLinks::new(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(value["error"], "No data found");
    }
}
