//! Query DTOs - Parametri di query string

use serde::Deserialize;

/// Parametro di ricerca ?q= usato da corsi e membri
#[derive(Deserialize, Debug)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Token JWT passato in query string dalle connessioni WebSocket
#[derive(Deserialize, Debug)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}
