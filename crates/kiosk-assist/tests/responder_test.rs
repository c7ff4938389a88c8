mod common;

use common::ScriptedModel;
use kiosk_assist::{AssistError, IntentResponder, ReplyOutcome, FALLBACK_REPLY_TEXT};
use kiosk_types::Reply;
use serde_json::json;
use std::sync::Arc;

const CONTEXT: &str = "El boleto cuesta $5. Horario: 5:00 a 24:00.";
const LOCATION: &str = "Coordenadas: 19.4326, -99.1332. Afluencia: Medium (50%).";

#[tokio::test]
async fn route_request_yields_destination() {
    let model = Arc::new(ScriptedModel::returning(json!({
        "responseText": "Claro, te muestro cómo llegar al Estadio Azteca.",
        "showRoute": true,
        "destination": "Estadio Azteca, CDMX"
    })));
    let responder = IntentResponder::new(model.clone());

    let outcome = responder
        .respond("cómo llego al estadio azteca", CONTEXT, LOCATION)
        .await;

    assert!(!outcome.is_fallback());
    let reply = outcome.into_reply();
    assert!(reply.show_route);
    assert_eq!(reply.route_destination(), Some("Estadio Azteca, CDMX"));

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("cómo llego al estadio azteca"));
    assert!(prompts[0].contains(LOCATION));
    assert!(prompts[0].contains(CONTEXT));
}

#[tokio::test]
async fn route_without_destination_takes_fallback_path() {
    let model = Arc::new(ScriptedModel::returning(json!({
        "responseText": "Claro, te muestro la ruta.",
        "showRoute": true,
        "destination": ""
    })));
    let outcome = IntentResponder::new(model)
        .respond("llévame al museo", CONTEXT, LOCATION)
        .await;

    match &outcome {
        ReplyOutcome::Fallback { reply, reason } => {
            assert_eq!(reply, &Reply::spoken(FALLBACK_REPLY_TEXT));
            assert!(reason.contains("destination"), "reason: {}", reason);
        }
        other => panic!("expected fallback, got {:?}", other),
    }
    assert!(!outcome.reply().show_route);
}

#[tokio::test]
async fn unparseable_output_takes_fallback_path() {
    let model = Arc::new(ScriptedModel::returning(json!({"texto": "hola"})));
    let outcome = IntentResponder::new(model)
        .respond("hola", CONTEXT, LOCATION)
        .await;
    assert!(outcome.is_fallback());
    assert_eq!(outcome.reply().response_text, FALLBACK_REPLY_TEXT);
}

#[tokio::test]
async fn network_failure_takes_fallback_path() {
    let model = Arc::new(ScriptedModel::failing(AssistError::Transport(
        "connection reset".into(),
    )));
    let outcome = IntentResponder::new(model)
        .respond("¿a qué hora cierran?", CONTEXT, LOCATION)
        .await;
    assert_eq!(
        outcome,
        ReplyOutcome::Fallback {
            reply: Reply::spoken(FALLBACK_REPLY_TEXT),
            reason: "transport error: connection reset".into(),
        }
    );
}

#[tokio::test]
async fn plain_answer_has_no_route() {
    let model = Arc::new(ScriptedModel::returning(json!({
        "responseText": "The ticket costs five pesos.",
        "showRoute": false
    })));
    let outcome = IntentResponder::new(model)
        .respond("how much is a ticket?", CONTEXT, LOCATION)
        .await;
    assert_eq!(
        outcome,
        ReplyOutcome::Ok(Reply::spoken("The ticket costs five pesos."))
    );
}
