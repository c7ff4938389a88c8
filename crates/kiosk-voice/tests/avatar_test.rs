use kiosk_voice::{
    AvatarClient, AvatarConfig, AvatarSessionManager, AvatarStream, IceCandidate,
    SessionDescription, VoiceError,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AGENT_ID: &str = "agt_test";

fn session_body() -> serde_json::Value {
    json!({
        "id": "strm_1",
        "session_id": "sess_1",
        "offer": {"type": "offer", "sdp": "v=0"},
        "ice_servers": [
            {"urls": ["stun:stun.example.com:3478"]},
            {"urls": "turn:turn.example.com:3478", "username": "u", "credential": "p"}
        ]
    })
}

fn client_for(server: &MockServer) -> AvatarClient {
    let config = AvatarConfig::new("user:pass", AGENT_ID).with_base_url(server.uri());
    AvatarClient::new(config).expect("client should build")
}

async fn manager_with_session(server: &MockServer) -> AvatarSessionManager {
    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams", AGENT_ID)))
        .respond_with(ResponseTemplate::new(201).set_body_json(session_body()))
        .mount(server)
        .await;

    let mut manager = AvatarSessionManager::new(Arc::new(client_for(server)));
    manager.create_session().await.expect("session should be created");
    manager
}

#[tokio::test]
async fn create_session_stores_descriptor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams", AGENT_ID)))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(201).set_body_json(session_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut manager = AvatarSessionManager::new(Arc::new(client_for(&server)));
    let session = manager.create_session().await.unwrap();
    assert_eq!(session.id, "strm_1");
    assert_eq!(session.ice_servers.len(), 2);
    assert_eq!(session.ice_servers[1].urls, vec!["turn:turn.example.com:3478"]);
    assert!(manager.session().is_some());
}

#[tokio::test]
async fn response_without_id_is_not_stored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams", AGENT_ID)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "session_id": "sess_1",
            "offer": {"type": "offer", "sdp": "v=0"}
        })))
        .mount(&server)
        .await;

    let mut manager = AvatarSessionManager::new(Arc::new(client_for(&server)));
    let err = manager.create_session().await.unwrap_err();
    assert!(matches!(err, VoiceError::RemoteService(_)));
    assert!(manager.session().is_none());
}

#[tokio::test]
async fn error_status_carries_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams", AGENT_ID)))
        .respond_with(ResponseTemplate::new(402).set_body_string("InsufficientCreditsError"))
        .mount(&server)
        .await;

    let err = client_for(&server).create_stream().await.unwrap_err();
    match err {
        VoiceError::RemoteService(details) => {
            assert!(details.contains("402"), "got: {}", details);
            assert!(details.contains("InsufficientCreditsError"), "got: {}", details);
        }
        other => panic!("expected RemoteService, got {:?}", other),
    }
}

#[tokio::test]
async fn failed_retry_clears_previous_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams", AGENT_ID)))
        .respond_with(ResponseTemplate::new(201).set_body_json(session_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams", AGENT_ID)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"error": true, "details": "busy"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/agents/{}/streams/strm_1", AGENT_ID)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut manager = AvatarSessionManager::new(Arc::new(client_for(&server)));
    manager.create_session().await.unwrap();
    let err = manager.create_session().await.unwrap_err();
    assert_eq!(err, VoiceError::RemoteService("busy".to_string()));
    assert!(manager.session().is_none());
}

#[tokio::test]
async fn send_text_posts_script_with_voice_profile() {
    let server = MockServer::start().await;
    let manager = manager_with_session(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams/strm_1", AGENT_ID)))
        .and(body_partial_json(json!({
            "script": {
                "type": "text",
                "input": "Hola, bienvenido al Metro",
                "provider": {"type": "microsoft", "voice_id": "es-MX-JorgeNeural"}
            },
            "session_id": "sess_1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "started"})))
        .expect(1)
        .mount(&server)
        .await;

    manager.send_text("Hola, bienvenido al Metro").await;
}

#[tokio::test]
async fn send_text_failure_keeps_session() {
    let server = MockServer::start().await;
    let manager = manager_with_session(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams/strm_1", AGENT_ID)))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    manager.send_text("¿Me escuchas?").await;
    assert_eq!(manager.session().map(|s| s.id.as_str()), Some("strm_1"));
}

#[tokio::test]
async fn timeout_is_reported_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams", AGENT_ID)))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(session_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = AvatarConfig::new("user:pass", AGENT_ID).with_base_url(server.uri());
    config.timeout_seconds = 1;
    let client = AvatarClient::new(config).unwrap();

    let err = client.create_stream().await.unwrap_err();
    assert!(matches!(err, VoiceError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn signaling_is_relayed_with_session_id() {
    let server = MockServer::start().await;
    let manager = manager_with_session(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams/strm_1/sdp", AGENT_ID)))
        .and(body_partial_json(json!({
            "answer": {"type": "answer", "sdp": "v=0 answer"},
            "session_id": "sess_1"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/agents/{}/streams/strm_1/ice", AGENT_ID)))
        .and(body_partial_json(json!({
            "candidate": "candidate:1",
            "sdpMid": "0",
            "sdpMLineIndex": 0,
            "session_id": "sess_1"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    manager
        .submit_answer(&SessionDescription {
            kind: "answer".into(),
            sdp: "v=0 answer".into(),
        })
        .await
        .unwrap();
    manager
        .submit_ice_candidate(&IceCandidate {
            candidate: "candidate:1".into(),
            sdp_mid: Some("0".into()),
            sdp_m_line_index: Some(0),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn signaling_without_session_is_rejected() {
    let server = MockServer::start().await;
    let manager = AvatarSessionManager::new(Arc::new(client_for(&server)));

    let err = manager
        .submit_answer(&SessionDescription {
            kind: "answer".into(),
            sdp: "v=0".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, VoiceError::NoSession);
}

#[tokio::test]
async fn close_session_deletes_stream() {
    let server = MockServer::start().await;
    let mut manager = manager_with_session(&server).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/agents/{}/streams/strm_1", AGENT_ID)))
        .and(body_partial_json(json!({"session_id": "sess_1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    manager.close_session().await;
    assert!(manager.session().is_none());
}

#[test]
fn avatar_config_from_toml() {
    let config: AvatarConfig = toml::from_str(
        r#"
        agent_id = "agt_toml"
        timeout_seconds = 10

        [voice]
        type = "microsoft"
        voice_id = "es-MX-DaliaNeural"
        "#,
    )
    .expect("parse TOML");
    assert_eq!(config.agent_id, "agt_toml");
    assert_eq!(config.timeout_seconds, 10);
    assert_eq!(config.voice.voice_id, "es-MX-DaliaNeural");
    assert_eq!(config.base_url, "https://api.d-id.com");
}
