//! Prompt construction for the extraction call.
//!
//! The contract is strict on purpose: the model must validate the query,
//! confirm the raw text actually names the queried school, and only then
//! emit the fixed-key record as bare JSON with nothing invented.

use super::record::truncate_chars;

/// Maximum characters of combined scraped text handed to the model.
pub const MAX_RAW_CHARS: usize = 45_000;

/// JSON skeleton the model must fill, kept verbatim in the prompt so the
/// model sees the exact key set and the one sequence-valued field.
const RECORD_SKELETON: &str = r#"{
  "school_name": "",
  "address": "",
  "location": "",
  "contact": "",
  "website": "",
  "email": "",
  "board": "",
  "classes_offered": "",
  "fees": "",
  "admission_process": "",
  "facilities": [],
  "transport": "",
  "rating": "",
  "about": "",
  "summary": ""
}"#;

pub fn build_prompt(query: &str, raw: &str) -> String {
    let raw = truncate_chars(raw, MAX_RAW_CHARS);
    format!(
        r#"You are a strict school data extractor and validator.

USER QUERY: "{query}"

STEP 1: VALIDATE THE USER QUERY
- Decide if the user query looks like a real school/college name.
- If the query is invalid:
    Return ONLY:
    {{
      "error": "Invalid school name"
    }}

STEP 2: MATCH AGAINST RAW TEXT
- Check RAW TEXT for any school name that contains the entire user query.
- If no match exists:
    Return ONLY:
    {{
      "error": "No data found"
    }}

STEP 3: EXTRACT DATA
Return ONLY this JSON object:

{RECORD_SKELETON}

RULES:
- Strict valid JSON.
- No hallucinations.
- Use only RAW TEXT.

RAW TEXT:
{raw}"#
    )
}
