#![allow(dead_code)]

use async_trait::async_trait;
use kiosk_assist::{AssistError, LanguageModel};
use serde_json::Value;
use std::sync::Mutex;

/// Language model returning queued results and recording prompts.
pub struct ScriptedModel {
    responses: Mutex<Vec<Result<Value, AssistError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<Value, AssistError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(value: Value) -> Self {
        Self::new(vec![Ok(value)])
    }

    pub fn failing(err: AssistError) -> Self {
        Self::new(vec![Err(err)])
    }

    fn next(&self, prompt: &str) -> Result<Value, AssistError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(AssistError::Transport("no scripted response left".into()))
        } else {
            responses.remove(0)
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate_text(&self, prompt: &str) -> Result<String, AssistError> {
        self.next(prompt).map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    async fn generate_json(&self, prompt: &str, _schema: &Value) -> Result<Value, AssistError> {
        self.next(prompt)
    }
}
