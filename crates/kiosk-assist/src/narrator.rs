//! Spoken summaries of transit routes.

use crate::directions::{DirectionsService, TransitRoute};
use std::sync::Arc;
use tracing::warn;

/// Spoken when no transit route is available.
pub const NO_ROUTE_TEXT: &str =
    "Lo siento, no encontré una ruta en transporte público hacia ese destino.";

/// Appended when the route has more transit legs than are narrated.
pub const MORE_TRANSFERS_TEXT: &str = "Consulta los demás transbordos en la pantalla.";

/// Appended when the route has no transit legs at all.
pub const WALKING_TEXT: &str =
    "Puedes llegar caminando; sigue las indicaciones del mapa en pantalla.";

/// Verbosity cap: later legs are left to the on-screen map.
const MAX_NARRATED_TRANSIT_LEGS: usize = 2;

fn plural(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", count, plural)
    }
}

fn format_duration(seconds: u64) -> String {
    let minutes = seconds.div_ceil(60).max(1);
    if minutes < 60 {
        return plural(minutes, "minuto", "minutos");
    }
    let hours = plural(minutes / 60, "hora", "horas");
    match minutes % 60 {
        0 => hours,
        rest => format!("{} y {}", hours, plural(rest, "minuto", "minutos")),
    }
}

/// Narrates a single route.
pub fn narrate_route(route: &TransitRoute) -> String {
    let mut sentences = vec![format!(
        "El trayecto dura aproximadamente {}.",
        format_duration(route.duration_seconds)
    )];

    let legs: Vec<_> = route.transit_legs().collect();
    for (index, leg) in legs.iter().take(MAX_NARRATED_TRANSIT_LEGS).enumerate() {
        let lead = if index == 0 { "Primero toma" } else { "Después toma" };
        let mut sentence = format!("{} {}", lead, leg.vehicle);
        if !leg.line.is_empty() {
            sentence.push_str(&format!(" línea {}", leg.line));
        }
        if !leg.headsign.is_empty() {
            sentence.push_str(&format!(" con dirección {}", leg.headsign));
        }
        sentence.push('.');
        sentences.push(sentence);
    }

    if legs.len() > MAX_NARRATED_TRANSIT_LEGS {
        sentences.push(MORE_TRANSFERS_TEXT.to_string());
    } else if legs.is_empty() {
        sentences.push(WALKING_TEXT.to_string());
    }

    sentences.join(" ")
}

/// Looks up transit directions and condenses them into speech.
#[derive(Clone)]
pub struct RouteNarrator {
    directions: Arc<dyn DirectionsService>,
}

impl RouteNarrator {
    pub fn new(directions: Arc<dyn DirectionsService>) -> Self {
        Self { directions }
    }

    /// Narrates the first route from `origin` to `destination`.
    pub async fn narrate(&self, origin: &str, destination: &str) -> String {
        let routes = match self.directions.transit_routes(origin, destination).await {
            Ok(routes) => routes,
            Err(e) => {
                warn!(origin, destination, error = %e, "directions lookup failed");
                Vec::new()
            }
        };

        match routes.first() {
            Some(route) => narrate_route(route),
            None => NO_ROUTE_TEXT.to_string(),
        }
    }
}
