//! Best-effort cleanup of model text before JSON parsing.
//!
//! Models are asked for raw JSON but regularly wrap it in a fenced block,
//! and occasionally emit lone backslashes (LaTeX, Windows paths) that are
//! not valid JSON escapes. Fence stripping always runs. Backslash doubling
//! is only tried as a second attempt after a clean parse fails, because it
//! corrupts legitimate escapes such as `\n` or `\"`.

use crate::error::AnalyzeError;
use serde_json::Value;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Remove every code-fence marker and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    text.replace(JSON_FENCE, "").replace(FENCE, "").trim().to_string()
}

/// Double every backslash so stray ones survive JSON parsing.
pub fn escape_backslashes(text: &str) -> String {
    text.replace('\\', "\\\\")
}

/// Turn raw model output into a JSON value.
///
/// On a failed parse of text containing backslashes, retries once with
/// them escaped. The reported error is always from the first attempt.
pub fn parse_model_output(raw: &str) -> Result<Value, AnalyzeError> {
    let clean = strip_code_fences(raw);

    let first_err = match serde_json::from_str::<Value>(&clean) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if clean.contains('\\') {
        if let Ok(value) = serde_json::from_str::<Value>(&escape_backslashes(&clean)) {
            tracing::debug!("Parsed model output after escaping backslashes");
            return Ok(value);
        }
    }

    Err(AnalyzeError::ResponseParse(first_err.to_string()))
}
