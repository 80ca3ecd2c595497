// api/generate_object.rs — generate_object() function (Layer 4).
//
// Structured output: runs generate_text() with a JSON output hint, then
// decodes the final text (strict, then repaired) into the target type.

use serde::de::DeserializeOwned;

use llm_conductor_types::*;

use crate::util::partial_json::parse_partial_value;

use super::generate::generate_text;
use super::generate_types::GenerateObjectResult;
use super::types::GenerateOptions;

/// Structured output generation.
///
/// Sets the output format to JSON (with `schema` when given), calls
/// `generate_text()`, then decodes the last step's text. When a schema is
/// given the decoded value must also validate against it.
///
/// # Errors
/// `InvalidInput` if no JSON value can be recovered from the text, if it fails
/// schema validation, or if it does not deserialize into `T`.
pub async fn generate_object<T: DeserializeOwned>(
    provider: &dyn Provider,
    options: GenerateOptions,
    schema: Option<serde_json::Value>,
) -> Result<GenerateObjectResult<T>, Error> {
    let format = match &schema {
        Some(schema) => OutputFormat::json_schema(schema.clone()),
        None => OutputFormat::json(),
    };
    let result = generate_text(provider, options.output_format(format)).await?;

    let value = parse_partial_value(&result.text)
        .ok_or_else(|| no_object_error("response is not JSON", &result.text))?;

    if let Some(schema) = &schema {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| Error::invalid_input(format!("invalid output schema: {e}")))?;
        let first_error = validator.iter_errors(&value).next().map(|e| e.to_string());
        if let Some(error) = first_error {
            return Err(no_object_error(
                &format!("schema validation failed: {error}"),
                &result.text,
            ));
        }
    }

    let object: T = serde_json::from_value(value)
        .map_err(|e| no_object_error(&format!("decode failed: {e}"), &result.text))?;

    Ok(GenerateObjectResult {
        object,
        usage: result.usage,
        finish_reason: result.finish_reason,
        text: result,
    })
}

fn no_object_error(reason: &str, raw_text: &str) -> Error {
    const PREVIEW: usize = 200;
    let preview: String = raw_text.chars().take(PREVIEW).collect();
    Error::invalid_input(format!("failed to generate object: {reason} (text: {preview:?})"))
}
