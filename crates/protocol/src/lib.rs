use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod framing;

/// One classification request as edited by the operator. Empty prompts are
/// legal; the classifier decides what to make of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifyRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Result payload pushed back by the classifier.
///
/// Only `label` is interpreted client-side. Whatever else the service
/// attaches rides along in `extra` and is surfaced verbatim in the raw
/// payload view. A payload without `label` decodes to an empty label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultEnvelope {
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub result: ResultEnvelope,
}

/// Events the console sends to the classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientEvent {
    ClassifyPrompt(ClassifyRequest),
}

/// Events the classifier pushes to the console.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    ClassificationResult(ClassificationResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_request_roundtrip() {
        let request = ClassifyRequest {
            system_prompt: "You are a helpful assistant.".to_string(),
            user_prompt: "How do I make a cake?".to_string(),
        };
        let json = serde_json::to_string(&ClientEvent::ClassifyPrompt(request.clone()))
            .expect("serialize");
        let decoded: ClientEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, ClientEvent::ClassifyPrompt(request));
    }

    #[test]
    fn client_event_uses_classify_prompt_tag() {
        let event = ClientEvent::ClassifyPrompt(ClassifyRequest {
            system_prompt: String::new(),
            user_prompt: String::new(),
        });
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains(r#""type":"classify_prompt""#));
        assert!(json.contains(r#""system_prompt""#));
        assert!(json.contains(r#""user_prompt""#));
    }

    #[test]
    fn server_event_uses_classification_result_tag() {
        let event = ServerEvent::ClassificationResult(ClassificationResult {
            result: ResultEnvelope {
                label: "Low-Risk".to_string(),
                extra: BTreeMap::new(),
            },
        });
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains(r#""type":"classification_result""#));
        assert!(json.contains(r#""result""#));
    }

    #[test]
    fn envelope_tolerates_missing_label() {
        let json = r#"{"type":"classification_result","payload":{"result":{"confidence":0.93}}}"#;
        let decoded: ServerEvent = serde_json::from_str(json).expect("deserialize");
        let ServerEvent::ClassificationResult(result) = decoded;
        assert_eq!(result.result.label, "");
        assert!(result.result.extra.contains_key("confidence"));
    }

    #[test]
    fn envelope_carries_unknown_fields_through() {
        let json = r#"{"label":"High-Critical (5-10)","model":"v2","scores":[1,2]}"#;
        let envelope: ResultEnvelope = serde_json::from_str(json).expect("deserialize");
        assert_eq!(envelope.label, "High-Critical (5-10)");
        assert_eq!(envelope.extra.len(), 2);
        let back = serde_json::to_string(&envelope).expect("serialize");
        let reparsed: ResultEnvelope = serde_json::from_str(&back).expect("reparse");
        assert_eq!(envelope, reparsed);
    }
}
