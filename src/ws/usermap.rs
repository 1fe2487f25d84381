//! UserMap - Registro delle connessioni WebSocket per utente
//!
//! Uno stesso utente può avere più connessioni contemporanee (più tab,
//! più dispositivi): ogni connessione ha un id proprio e viene rimossa
//! solo quando il suo socket si chiude, senza toccare le altre.

use crate::dtos::WsEventDTO;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument};

pub struct UserMap {
    connections: DashMap<i64, Vec<(u64, UnboundedSender<WsEventDTO>)>>,
    next_conn_id: AtomicU64,
}

impl UserMap {
    pub fn new() -> Self {
        UserMap {
            connections: DashMap::new(),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Registra una nuova connessione e ritorna il suo id
    #[instrument(skip(self, tx), fields(user_id))]
    pub fn register(&self, user_id: i64, tx: UnboundedSender<WsEventDTO>) -> u64 {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        self.connections.entry(user_id).or_default().push((conn_id, tx));
        info!(conn_id, "Connection registered");
        conn_id
    }

    /// Rimuove una singola connessione; le altre dello stesso utente restano
    #[instrument(skip(self), fields(user_id, conn_id))]
    pub fn unregister(&self, user_id: i64, conn_id: u64) {
        if let Some(mut entry) = self.connections.get_mut(&user_id) {
            entry.retain(|(id, _)| *id != conn_id);
            let empty = entry.is_empty();
            drop(entry);
            if empty {
                self.connections.remove_if(&user_id, |_, conns| conns.is_empty());
            }
        }
        info!("Connection removed");
    }

    /// Invia un evento a tutte le connessioni vive dell'utente.
    /// I sender chiusi vengono eliminati al volo; un invio fallito su una
    /// connessione non blocca la consegna alle altre.
    /// Ritorna il numero di connessioni raggiunte (0 se l'utente è offline).
    #[instrument(skip(self, event), fields(user_id))]
    pub fn send_to_user(&self, user_id: i64, event: &WsEventDTO) -> usize {
        let mut delivered = 0;
        if let Some(mut entry) = self.connections.get_mut(&user_id) {
            entry.retain(|(conn_id, tx)| match tx.send(event.clone()) {
                Ok(_) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    debug!(conn_id, "Dropping dead connection");
                    false
                }
            });
        }

        if delivered == 0 {
            debug!("User not online, event not delivered");
        } else {
            debug!(delivered, "Event delivered to live connections");
        }
        delivered
    }

    /// Check if a specific user has at least one live connection
    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.connections
            .get(&user_id)
            .map(|conns| !conns.is_empty())
            .unwrap_or(false)
    }

    /// Numero di connessioni attive dell'utente
    pub fn connection_count(&self, user_id: i64) -> usize {
        self.connections
            .get(&user_id)
            .map(|conns| conns.len())
            .unwrap_or(0)
    }

    /// Get the count of users with at least one live connection
    pub fn online_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for UserMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_second_connection_does_not_evict_the_first() {
        let map = UserMap::new();
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();

        let c1 = map.register(7, tx1);
        let c2 = map.register(7, tx2);

        assert_ne!(c1, c2, "Connection ids must be distinct");
        assert_eq!(map.connection_count(7), 2);

        let delivered = map.send_to_user(7, &WsEventDTO::ChatSessionsUpdated);
        assert_eq!(delivered, 2, "Both connections should receive the event");
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_unregister_removes_only_one_connection() {
        let map = UserMap::new();
        let (tx1, _rx1) = unbounded_channel();
        let (tx2, _rx2) = unbounded_channel();

        let c1 = map.register(7, tx1);
        let _c2 = map.register(7, tx2);

        map.unregister(7, c1);
        assert!(map.is_user_online(7));
        assert_eq!(map.connection_count(7), 1);
    }

    #[test]
    fn test_send_prunes_dead_connections() {
        let map = UserMap::new();
        let (tx1, rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();

        map.register(7, tx1);
        map.register(7, tx2);

        // la prima connessione muore senza fare unregister
        drop(rx1);

        let delivered = map.send_to_user(7, &WsEventDTO::ChatSessionsUpdated);
        assert_eq!(delivered, 1, "Dead connection must not count as delivered");
        assert_eq!(map.connection_count(7), 1, "Dead connection must be pruned");
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_offline_user_is_a_silent_noop() {
        let map = UserMap::new();
        assert_eq!(map.send_to_user(42, &WsEventDTO::ChatSessionsUpdated), 0);
        assert!(!map.is_user_online(42));
        assert_eq!(map.online_count(), 0);
    }
}
