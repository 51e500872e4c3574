//! Generation normalizer.
//!
//! Turns raw completion text into validated question drafts. The text is
//! tried as a bare JSON array first; failing that, the first bracketed
//! array of objects embedded in surrounding prose is located with a
//! string-aware depth scan and parsed on its own. Every element must pass
//! validation or the whole batch is rejected.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{GenerationError, SchemaViolation};
use crate::model::{QuestionDraft, OPTIONS_PER_QUESTION};

/// Normalize raw model output into validated question drafts.
///
/// `expected_count` is advisory: a different number of questions is logged
/// but accepted. Zero questions is always an error.
pub fn normalize(raw: &str, expected_count: usize) -> Result<Vec<QuestionDraft>, GenerationError> {
    let elements = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => {
            tracing::debug!("model output parsed directly as a JSON array");
            items
        }
        _ => {
            tracing::debug!("direct parse failed, scanning for an embedded JSON array");
            let span = extract_json_array(raw).ok_or(GenerationError::Extraction)?;
            match serde_json::from_str::<Value>(span) {
                Ok(Value::Array(items)) => items,
                _ => return Err(GenerationError::Extraction),
            }
        }
    };

    let drafts = elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            validate_element(element).map_err(|violation| GenerationError::Schema { index, violation })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if drafts.is_empty() {
        return Err(GenerationError::EmptyResult);
    }

    if drafts.len() != expected_count {
        tracing::warn!(
            "model returned {} questions, {} were requested",
            drafts.len(),
            expected_count
        );
    }

    Ok(drafts)
}

/// Locate the first `[ { ... } ]` span in `text` that parses as a JSON array.
///
/// Brackets and braces inside string literals are ignored, so option text
/// such as `"{x} or [y]"` does not end the span early. Candidates that are
/// unbalanced or fail to parse are skipped.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();

    for (start, &b) in bytes.iter().enumerate() {
        if b != b'[' || !opens_object(&bytes[start + 1..]) {
            continue;
        }
        let Some(end) = matching_close(bytes, start) else {
            continue;
        };
        let candidate = &text[start..=end];
        if matches!(serde_json::from_str::<Value>(candidate), Ok(Value::Array(_))) {
            return Some(candidate);
        }
    }

    None
}

/// Whether the next non-whitespace byte is `{`.
fn opens_object(rest: &[u8]) -> bool {
    rest.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'{')
}

/// Index of the `]` closing the `[` at `start`, or `None` when the span is
/// unbalanced, mismatched, or runs off the end of the input.
fn matching_close(bytes: &[u8], start: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'[' | b'{' => stack.push(b),
            b']' | b'}' => {
                let open = stack.pop()?;
                if (open == b'[') != (b == b']') {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

fn validate_element(value: &Value) -> Result<QuestionDraft, SchemaViolation> {
    let obj = value.as_object().ok_or(SchemaViolation::NotAnObject)?;

    let text = required_str(obj, "question")?;
    if text.is_empty() {
        return Err(SchemaViolation::EmptyQuestion);
    }

    let options = match obj.get("options") {
        None | Some(Value::Null) => return Err(SchemaViolation::MissingField("options")),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or(SchemaViolation::WrongType {
                    field: "options",
                    expected: "an array of strings",
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(SchemaViolation::WrongType {
                field: "options",
                expected: "an array of strings",
            })
        }
    };

    if options.len() != OPTIONS_PER_QUESTION {
        return Err(SchemaViolation::OptionCount(options.len()));
    }
    if let Some(i) = options.iter().position(|o| o.is_empty()) {
        return Err(SchemaViolation::EmptyOption(i));
    }
    let mut seen = HashSet::new();
    for option in &options {
        if !seen.insert(option.as_str()) {
            return Err(SchemaViolation::DuplicateOption(option.clone()));
        }
    }

    let correct_answer = required_str(obj, "correctAnswer")?;
    if !options.iter().any(|o| o == correct_answer) {
        return Err(SchemaViolation::CorrectAnswerNotInOptions(
            correct_answer.to_string(),
        ));
    }

    let explanation = match obj.get("explanation") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(SchemaViolation::WrongType {
                field: "explanation",
                expected: "a string",
            })
        }
    };

    Ok(QuestionDraft {
        text: text.to_string(),
        options,
        correct_answer: correct_answer.to_string(),
        explanation,
    })
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, SchemaViolation> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(SchemaViolation::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(SchemaViolation::WrongType {
            field,
            expected: "a string",
        }),
    }
}
