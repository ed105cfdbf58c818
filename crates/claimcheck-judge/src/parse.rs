//! Recovering a [`Verdict`] from free-form model output.

use serde_json::Value;

use claimcheck_core::error::{Error, Result};
use claimcheck_core::types::{Verdict, VerdictLabel};

/// Parse the trimmed completion as JSON, falling back to the slice between the
/// first `{` and the last `}`. Braces are not balanced.
pub fn recover_json(raw: &str) -> Result<Value> {
    let s = raw.trim();
    if let Ok(v) = serde_json::from_str::<Value>(s) {
        return Ok(v);
    }
    match (s.find('{'), s.rfind('}')) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&s[start..=end])
            .map_err(|e| Error::Parse(format!("embedded JSON object is invalid: {e}"))),
        _ => Err(Error::Parse("no JSON object found in model output".into())),
    }
}

/// Read a verdict out of the model's JSON object.
///
/// Missing fields take defaults, an unrecognized label becomes `Unknown`,
/// non-string citations are dropped and confidence is clamped to `[0, 1]`.
pub fn verdict_from_value(value: &Value) -> Result<Verdict> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::Parse(format!("expected a JSON object, got {value}")))?;

    let verdict = match obj.get("verdict").and_then(Value::as_str) {
        Some(label) => label.parse::<VerdictLabel>().unwrap_or_else(|_| {
            tracing::warn!(label, "model returned an unrecognized verdict label");
            VerdictLabel::Unknown
        }),
        None => VerdictLabel::Unknown,
    };
    let short_reason = obj.get("short_reason").and_then(Value::as_str).unwrap_or_default().to_string();
    let citations = obj
        .get("citations")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    #[allow(clippy::cast_possible_truncation)]
    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0) as f32);

    Ok(Verdict { verdict, short_reason, citations, confidence })
}
