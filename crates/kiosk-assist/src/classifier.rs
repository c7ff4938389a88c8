//! Closed-set intent classification with canned answers.
//!
//! The model only picks a category token; the words the avatar speaks come
//! from a static table, and each entry points at a pre-rendered avatar clip.

use crate::llm::LanguageModel;
use kiosk_types::{Category, Reply};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Canned answer for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CannedBundle {
    pub category: Category,
    pub text: &'static str,
    /// Place to route to, when the answer implies a map.
    pub destination: Option<&'static str>,
    /// Avatar clip rendered for this answer.
    pub video: &'static str,
}

impl CannedBundle {
    pub fn to_reply(&self) -> Reply {
        match self.destination {
            Some(destination) => Reply::with_route(self.text, destination),
            None => Reply::spoken(self.text),
        }
    }
}

/// Canned bundle for a category.
pub fn canned_bundle(category: Category) -> CannedBundle {
    let (text, destination, video) = match category {
        Category::StadiumRoute => (
            "Para ir al Estadio Azteca toma la Línea 2 hacia Tasqueña y después el Tren Ligero hasta la estación Estadio Azteca.",
            Some("Estadio Azteca, CDMX"),
            "videos/ruta_estadio.mp4",
        ),
        Category::Schedule => (
            "El Metro abre de lunes a viernes a las 5:00, sábados a las 6:00 y domingos a las 7:00. Cierra a medianoche.",
            None,
            "videos/horarios.mp4",
        ),
        Category::Fare => (
            "El boleto cuesta cinco pesos. También puedes pagar con la tarjeta de Movilidad Integrada.",
            None,
            "videos/tarifa.mp4",
        ),
        Category::FanFest => (
            "El FIFA Fan Festival está en el Zócalo, a unos pasos de esta estación. La entrada es gratuita.",
            None,
            "videos/fan_fest.mp4",
        ),
        Category::SecurityReport => (
            "Gracias por avisar. Acude con el personal de vigilancia del andén o llama al 911 si es una emergencia.",
            None,
            "videos/reporte_seguridad.mp4",
        ),
        Category::Greeting => (
            "¡Hola! Soy tu asistente del Metro. Pregúntame por rutas, horarios o el Mundial.",
            None,
            "videos/saludo.mp4",
        ),
        Category::Other => (
            "No estoy seguro de haber entendido. Puedes preguntarme por rutas, horarios, tarifas o el Mundial.",
            None,
            "videos/espera.mp4",
        ),
    };

    CannedBundle {
        category,
        text,
        destination,
        video,
    }
}

/// JSON schema limiting the model to the known tokens.
pub fn category_schema() -> Value {
    let tokens: Vec<&str> = Category::ALL.iter().map(|c| c.token()).collect();
    json!({
        "type": "object",
        "properties": {
            "category": {"type": "string", "enum": tokens}
        },
        "required": ["category"]
    })
}

pub fn classification_prompt(query: &str) -> String {
    let tokens: Vec<&str> = Category::ALL.iter().map(|c| c.token()).collect();
    format!(
        "Clasifica la siguiente consulta de un usuario del Metro CDMX en una sola categoría.\n\
         Categorías válidas: {}.\n\
         Usa \"otro\" si ninguna aplica.\n\
         CONSULTA: {}",
        tokens.join(", "),
        query
    )
}

/// Maps utterances to [`Category`] values.
#[derive(Clone)]
pub struct IntentClassifier {
    model: Arc<dyn LanguageModel>,
}

impl IntentClassifier {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Classifies `query`. Model failures and unknown tokens yield
    /// [`Category::Other`].
    pub async fn classify(&self, query: &str) -> Category {
        let prompt = classification_prompt(query);
        match self.model.generate_json(&prompt, &category_schema()).await {
            Ok(value) => {
                let raw = match &value {
                    Value::String(s) => s.as_str(),
                    other => other.get("category").and_then(Value::as_str).unwrap_or(""),
                };
                let category = Category::from_token(raw);
                debug!(raw, category = category.token(), "classified query");
                category
            }
            Err(e) => {
                warn!(error = %e, "classification failed, using idle category");
                Category::Other
            }
        }
    }

    /// Classifies `query` and returns the matching canned bundle.
    pub async fn answer(&self, query: &str) -> CannedBundle {
        canned_bundle(self.classify(query).await)
    }
}
