//! Per-mode prompt context and greetings.

use kiosk_types::Mode;

/// Context used when no mode is selected.
pub const GENERAL_CONTEXT: &str = "El boleto del Metro cuesta $5. \
Horario: lunes a viernes de 5:00 a 24:00, sábados de 6:00 a 24:00, domingos y festivos de 7:00 a 24:00. \
Los menores de 5 años, adultos mayores y personas con discapacidad viajan gratis.";

/// Prompt context for a mode, or the general context when none is active.
pub fn context(mode: Option<Mode>) -> &'static str {
    match mode {
        None => GENERAL_CONTEXT,
        Some(Mode::Routes) => {
            "Ayudas a los usuarios a llegar a su destino usando el Metro y el transporte público de la CDMX. \
             El módulo está en la estación Zócalo/Tenochtitlan de la Línea 2. \
             Si preguntan cómo llegar a un lugar, pide mostrar la ruta. \
             El boleto cuesta $5 y se puede pagar con la tarjeta de Movilidad Integrada."
        }
        Some(Mode::WorldCup) => {
            "Informas sobre la Copa Mundial 2026 en la Ciudad de México. \
             La sede es el Estadio Azteca (Estadio Ciudad de México), en Santa Úrsula, Coyoacán. \
             Se llega con la Línea 2 del Metro hasta Tasqueña y después el Tren Ligero hasta la estación Estadio Azteca. \
             El FIFA Fan Festival se instala en el Zócalo. Recomienda llegar con al menos dos horas de anticipación."
        }
        Some(Mode::Tourism) => {
            "Recomiendas lugares turísticos de la CDMX cercanos al Metro: Centro Histórico, Palacio de Bellas Artes, \
             Bosque de Chapultepec, Museo Nacional de Antropología, Coyoacán, Xochimilco y la Basílica de Guadalupe. \
             Si el usuario quiere ir a alguno, pide mostrar la ruta."
        }
        Some(Mode::SecurityReport) => {
            "Recibes reportes de incidentes y seguridad. Pregunta qué ocurrió, en qué estación o tren y a qué hora. \
             Agradece el reporte y recuerda que puede acudir con el personal de vigilancia del andén, \
             usar los botones de alarma de los vagones o llamar al 911 en caso de emergencia. \
             Nunca pidas datos personales sensibles."
        }
    }
}

/// Utterance the avatar speaks when a mode is entered.
pub fn greeting(mode: Mode) -> &'static str {
    match mode {
        Mode::Routes => "Hola, soy tu asistente del Metro. ¿A dónde quieres ir hoy?",
        Mode::WorldCup => {
            "¡Bienvenido a la Ciudad de México, sede mundialista! ¿Qué quieres saber del Mundial?"
        }
        Mode::Tourism => "Hola, te ayudo a descubrir la ciudad. ¿Qué te gustaría visitar?",
        Mode::SecurityReport => {
            "Estoy aquí para ayudarte. Cuéntame qué ocurrió y en qué estación."
        }
    }
}
