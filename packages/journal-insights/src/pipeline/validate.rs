//! Schema validation for model output.
//!
//! The model is asked for a JSON analysis record but answers in free text.
//! This module finds the JSON object inside that text, checks every field
//! against [`AnalysisRecord`], and either returns a complete record or a
//! [`ValidationError`] holding the raw text. There is no repair step.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use schemars::schema_for;
use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationErrorKind};
use crate::types::analysis::{AnalysisRecord, COLOR_EXAMPLE, SENTIMENT_MAX, SENTIMENT_MIN};

type Object = Map<String, Value>;

lazy_static! {
    // Six hex digits, e.g. #0101fe
    static ref COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();

    // Body of a Markdown code block, optionally tagged json
    static ref FENCE_REGEX: Regex = Regex::new(r"```(?:json|JSON)?([\s\S]*?)```").unwrap();

    static ref FORMAT_INSTRUCTIONS: String = render_format_instructions();
}

/// Validate raw model output into an analysis record.
///
/// Accepts the object bare, fenced in a Markdown code block, or surrounded by
/// prose. Objects inside code fences are tried first, then every other object
/// in text order; the first one that passes validation is the record. When
/// none passes, the error describes the first object found.
pub fn validate(raw: &str) -> Result<AnalysisRecord, ValidationError> {
    let mut first_rejection = None;
    let mut first_parse_error = None;

    for start in candidate_starts(raw) {
        let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(object))) => match record_from_object(&object) {
                Ok(record) => return Ok(record),
                Err(kind) => {
                    if first_rejection.is_none() {
                        first_rejection = Some(kind);
                    }
                }
            },
            Some(Err(e)) => {
                if first_parse_error.is_none() {
                    first_parse_error = Some(e.to_string());
                }
            }
            _ => {}
        }
    }

    let kind = first_rejection
        .or_else(|| first_parse_error.map(ValidationErrorKind::Parse))
        .unwrap_or(ValidationErrorKind::PayloadNotFound);
    Err(ValidationError::new(kind, raw))
}

/// Byte offsets of every `{` in `raw`, fenced ones first, each listed once.
fn candidate_starts(raw: &str) -> Vec<usize> {
    let mut starts: Vec<usize> = FENCE_REGEX
        .captures_iter(raw)
        .filter_map(|captures| captures.get(1))
        .flat_map(|body| {
            body.as_str()
                .match_indices('{')
                .map(move |(offset, _)| body.start() + offset)
        })
        .collect();

    let mut seen: HashSet<usize> = starts.iter().copied().collect();
    starts.extend(
        raw.match_indices('{')
            .map(|(offset, _)| offset)
            .filter(|offset| seen.insert(*offset)),
    );
    starts
}

fn record_from_object(object: &Object) -> Result<AnalysisRecord, ValidationErrorKind> {
    let record = AnalysisRecord {
        mood: string_field(object, "mood")?,
        subject: string_field(object, "subject")?,
        negative: bool_field(object, "negative")?,
        summary: string_field(object, "summary")?,
        color: string_field(object, "color")?,
        sentiment_score: number_field(object, "sentimentScore")?,
    };

    if !COLOR_REGEX.is_match(&record.color) {
        return Err(ValidationErrorKind::InvalidFormat {
            field: "color",
            value: record.color,
        });
    }

    if !(SENTIMENT_MIN..=SENTIMENT_MAX).contains(&record.sentiment_score) {
        return Err(ValidationErrorKind::OutOfRange {
            field: "sentimentScore",
            value: record.sentiment_score,
        });
    }

    Ok(record)
}

fn required<'a>(object: &'a Object, field: &'static str) -> Result<&'a Value, ValidationErrorKind> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationErrorKind::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn string_field(object: &Object, field: &'static str) -> Result<String, ValidationErrorKind> {
    match required(object, field)? {
        Value::String(s) => Ok(s.trim().to_string()),
        _ => Err(ValidationErrorKind::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

/// Booleans, plus the strings "true"/"false" some models emit.
fn bool_field(object: &Object, field: &'static str) -> Result<bool, ValidationErrorKind> {
    let invalid = ValidationErrorKind::InvalidType {
        field,
        expected: "a boolean",
    };

    match required(object, field)? {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(invalid),
        },
        _ => Err(invalid),
    }
}

/// Finite numbers, plus numeric strings.
fn number_field(object: &Object, field: &'static str) -> Result<f64, ValidationErrorKind> {
    let invalid = ValidationErrorKind::InvalidType {
        field,
        expected: "a number",
    };

    let number = match required(object, field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(invalid),
    }
}

/// Natural-language description of the analysis record schema.
///
/// Field names, JSON types and descriptions come from the `JsonSchema`
/// derive on [`AnalysisRecord`], so the instructions cannot drift from the
/// validator's field set.
pub fn format_instructions() -> &'static str {
    &FORMAT_INSTRUCTIONS
}

fn render_format_instructions() -> String {
    let root = schema_for!(AnalysisRecord);

    let fields: Vec<String> = root
        .schema
        .object
        .iter()
        .flat_map(|object| object.properties.iter())
        .map(|(name, schema)| {
            let schema = serde_json::to_value(schema).unwrap_or_default();
            let json_type = schema
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("string");
            match schema.get("description").and_then(Value::as_str) {
                Some(description) => format!("\t\"{}\": {}  // {}", name, json_type, description),
                None => format!("\t\"{}\": {}", name, json_type),
            }
        })
        .collect();

    format!(
        r#"You must format your output as a single JSON object that conforms to the schema below, wrapped in a Markdown code block that starts with ```json and ends with ```.

```json
{{
{fields}
}}
```

Rules:
- Include every field. Do not add any other fields.
- "negative" must be the JSON literal true or false.
- "sentimentScore" must be a number from {min} to {max} inclusive.
- "color" must be a hexadecimal color code with exactly six digits, for example "{color}"."#,
        fields = fields.join("\n"),
        min = SENTIMENT_MIN,
        max = SENTIMENT_MAX,
        color = COLOR_EXAMPLE,
    )
}
