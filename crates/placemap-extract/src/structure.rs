//! Structuring and free-form AI editing of place documents.
//!
//! Prompts ask the model for pure JSON, but models routinely wrap it in
//! prose or code fences anyway, so reply parsing falls back to extracting
//! the outermost brace span. Whatever comes back is only a *candidate*
//! document: the caller places it into the editing tier, where it passes
//! through the same normalization as any other write.

use std::sync::LazyLock;

use regex::Regex;

use placemap_core::validate::import_document;
use placemap_core::Document;

use crate::client::ExtractClient;
use crate::error::ExtractError;

static OUTERMOST_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));

const STRUCTURE_SYSTEM_PROMPT: &str = "You are a data-structuring expert. \
You turn unstructured text about places and businesses into structured JSON, \
identifying every location and classifying its fields correctly.";

const EDIT_SYSTEM_PROMPT: &str = "You are a JSON document editor. You receive \
a place-dataset JSON document and an instruction, apply the instruction \
exactly, and reply with the complete modified JSON only — no explanations. \
Keep the document structure intact and field types correct. Coordinates are \
{\"lat\": <number>, \"lng\": <number>}.";

fn structure_user_prompt(raw_text: &str, custom_instruction: &str) -> String {
    let extra = if custom_instruction.trim().is_empty() {
        String::new()
    } else {
        format!("\nAdditional instructions: {}\n", custom_instruction.trim())
    };
    format!(
        "Turn the following extracted text into JSON. Rules:\n\
         1. Identify every place, business, or institution.\n\
         2. Classify fields as name, address, phone, webName, webLink, intro.\n\
         3. Only include keys for information actually present.\n\
         4. Keep phone numbers in their original format.\n\
         5. Leave tags as an empty list unless instructed otherwise.\n\
         6. Use center {{\"lat\": 0, \"lng\": 0}} for every item.\n\
         {extra}\
         Text:\n{raw_text}\n\n\
         Reply with JSON of the shape {{\"data\": [{{...}}]}} and nothing else. \
         If no places can be identified, reply with an empty data array."
    )
}

fn edit_user_prompt(current_json: &str, instruction: &str) -> String {
    format!(
        "Current JSON document:\n{current_json}\n\n\
         Instruction: {instruction}\n\n\
         Apply the instruction and reply with the complete modified JSON."
    )
}

/// Parses a model reply into a candidate [`Document`].
///
/// Tries the whole reply as JSON first, then the outermost brace span for
/// replies wrapped in prose or code fences.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidReply`] when neither parse succeeds or
/// the JSON is not document-shaped.
pub fn parse_reply(reply: &str) -> Result<Document, ExtractError> {
    let direct = import_document(reply);
    match direct {
        Ok(doc) => Ok(doc),
        Err(first_err) => {
            if let Some(span) = OUTERMOST_BRACES.find(reply) {
                if let Ok(doc) = import_document(span.as_str()) {
                    return Ok(doc);
                }
            }
            Err(ExtractError::InvalidReply {
                reason: first_err.to_string(),
            })
        }
    }
}

/// Turns free text into a candidate document via the structuring model.
///
/// # Errors
///
/// Propagates client errors; [`ExtractError::InvalidReply`] when the model
/// did not return usable JSON.
pub async fn structure(
    client: &ExtractClient,
    raw_text: &str,
    custom_instruction: &str,
) -> Result<Document, ExtractError> {
    let reply = client
        .complete(
            STRUCTURE_SYSTEM_PROMPT,
            &structure_user_prompt(raw_text, custom_instruction),
        )
        .await?;
    let doc = parse_reply(&reply)?;
    tracing::info!(items = doc.data.len(), "structured document from text");
    Ok(doc)
}

/// Applies a natural-language instruction to a document via the model and
/// returns the modified candidate.
///
/// # Errors
///
/// Propagates client errors; [`ExtractError::InvalidReply`] when the model
/// did not return usable JSON or serialization of the input fails.
pub async fn edit(
    client: &ExtractClient,
    current: &Document,
    instruction: &str,
) -> Result<Document, ExtractError> {
    let current_json =
        serde_json::to_string_pretty(current).map_err(|e| ExtractError::InvalidReply {
            reason: format!("failed to serialize current document: {e}"),
        })?;
    let reply = client
        .complete(EDIT_SYSTEM_PROMPT, &edit_user_prompt(&current_json, instruction))
        .await?;
    let doc = parse_reply(&reply)?;
    tracing::info!(items = doc.data.len(), "edited document via instruction");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn parse_reply_accepts_pure_json() {
        let doc = parse_reply(r#"{"data":[{"name":"Cafe A"}]}"#).unwrap();
        assert_eq!(doc.data[0].name, "Cafe A");
    }

    #[test]
    fn parse_reply_extracts_json_from_prose() {
        let reply = "Here is the document you asked for:\n```json\n\
                     {\"data\":[{\"name\":\"Cafe A\"}]}\n```\nLet me know!";
        let doc = parse_reply(reply).unwrap();
        assert_eq!(doc.data.len(), 1);
    }

    #[test]
    fn parse_reply_rejects_plain_prose() {
        let err = parse_reply("I could not find any places.").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidReply { .. }));
    }

    #[test]
    fn parse_reply_rejects_malformed_embedded_json() {
        let err = parse_reply("sure: {\"data\": [}").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidReply { .. }));
    }

    #[tokio::test]
    async fn structure_round_trips_through_model() {
        let server = MockServer::start().await;
        let reply = r#"{"data":[{"name":"Cafe A","address":"1 Main St"}]}"#;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": reply}}]
            })))
            .mount(&server)
            .await;

        let client = ExtractClient::with_base_url("k", &server.uri()).unwrap();
        let doc = structure(&client, "Cafe A, 1 Main St", "").await.unwrap();
        assert_eq!(doc.data[0].address, "1 Main St");
    }

    #[tokio::test]
    async fn edit_parses_modified_document() {
        let server = MockServer::start().await;
        let reply = r#"{"name":"","description":"","origin":"",
                        "filter":{"inclusive":{},"exclusive":{}},
                        "data":[{"name":"Renamed"}]}"#;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": reply}}]
            })))
            .mount(&server)
            .await;

        let client = ExtractClient::with_base_url("k", &server.uri()).unwrap();
        let current = Document::default();
        let doc = edit(&client, &current, "rename the first item").await.unwrap();
        assert_eq!(doc.data[0].name, "Renamed");
    }
}
