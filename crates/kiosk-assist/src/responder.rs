//! Structured replies from the language model.

use crate::error::AssistError;
use crate::llm::LanguageModel;
use kiosk_types::Reply;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Spoken when the model cannot be reached or misbehaves.
pub const FALLBACK_REPLY_TEXT: &str = "Lo siento, hay intermitencia en la red.";

/// Result of one responder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The model produced a valid reply.
    Ok(Reply),
    /// The fixed fallback replaced an unusable model result.
    Fallback { reply: Reply, reason: String },
}

impl ReplyOutcome {
    fn fallback(reason: impl Into<String>) -> Self {
        ReplyOutcome::Fallback {
            reply: Reply::spoken(FALLBACK_REPLY_TEXT),
            reason: reason.into(),
        }
    }

    pub fn reply(&self) -> &Reply {
        match self {
            ReplyOutcome::Ok(reply) | ReplyOutcome::Fallback { reply, .. } => reply,
        }
    }

    pub fn into_reply(self) -> Reply {
        match self {
            ReplyOutcome::Ok(reply) | ReplyOutcome::Fallback { reply, .. } => reply,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ReplyOutcome::Fallback { .. })
    }
}

/// JSON schema the model output is constrained to.
pub fn reply_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "responseText": {
                "type": "string",
                "description": "Respuesta hablada"
            },
            "showRoute": {
                "type": "boolean",
                "description": "true si el usuario pide llegar a un lugar"
            },
            "destination": {
                "type": "string",
                "description": "Nombre completo del destino, por ejemplo 'Estadio Azteca, CDMX'"
            }
        },
        "required": ["responseText"]
    })
}

/// Builds the prompt for one query.
pub fn build_prompt(query: &str, context: &str, location_info: &str) -> String {
    format!(
        "Eres un asistente oficial del Metro CDMX.\n\
         UBICACIÓN USUARIO: {location_info}\n\
         CONTEXTO: {context}\n\
         PREGUNTA: {query}\n\
         INSTRUCCIONES:\n\
         - Responde en el mismo idioma en que está escrita la pregunta.\n\
         - Sé breve, amable y directo (máx 25 palabras).\n\
         - Si sabes dónde está el usuario, indícale la estación más cercana.\n\
         - Si el usuario quiere llegar a un lugar, usa showRoute=true y escribe en destination \
         el nombre completo del lugar seguido de \", CDMX\".\n\
         - En cualquier otro caso usa showRoute=false y no incluyas destination.\n\
         - Responde únicamente con un objeto JSON con los campos responseText, showRoute y destination."
    )
}

/// Validates raw model output against the reply contract.
pub fn parse_reply(value: Value) -> Result<Reply, AssistError> {
    let mut reply: Reply = serde_json::from_value(value)
        .map_err(|e| AssistError::ModelContractViolation(format!("unexpected reply shape: {}", e)))?;
    reply
        .validate()
        .map_err(|e| AssistError::ModelContractViolation(e.to_string()))?;

    if !reply.show_route {
        reply.destination = None;
    }
    Ok(reply)
}

/// Answers free-form questions through the language model.
#[derive(Clone)]
pub struct IntentResponder {
    model: Arc<dyn LanguageModel>,
}

impl IntentResponder {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Produces a reply for `query`. Never fails: see [`ReplyOutcome`].
    pub async fn respond(&self, query: &str, context: &str, location_info: &str) -> ReplyOutcome {
        let prompt = build_prompt(query, context, location_info);

        let result = match self.model.generate_json(&prompt, &reply_schema()).await {
            Ok(value) => parse_reply(value),
            Err(e) => Err(e),
        };

        match result {
            Ok(reply) => ReplyOutcome::Ok(reply),
            Err(e) => {
                warn!(error = %e, "responder falling back to fixed reply");
                ReplyOutcome::fallback(e.to_string())
            }
        }
    }
}
