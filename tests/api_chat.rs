//! Integration tests per la chat su doppio trasporto
//!
//! Il canale REST è sempre la fonte di verità: qui si verifica che il
//! fanout WebSocket spinga gli stessi dati che il fallback HTTP espone.

mod common;

#[cfg(test)]
mod chat_tests {
    use super::common::*;
    use aula::dtos::WsEventDTO;
    use serde_json::json;
    use sqlx::SqlitePool;
    use tokio::sync::mpsc::unbounded_channel;

    // ============================================================
    // GET /chat - lista sessioni
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "messages")))]
    async fn test_list_sessions(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/chat")
            .authorization_bearer(&token_profrossi())
            .await;

        response.assert_status_ok();
        let sessions: serde_json::Value = response.json();
        let sessions = sessions.as_array().unwrap();
        assert_eq!(sessions.len(), 2);

        // la conversazione più recente prima (msg 4 da averdi)
        assert_eq!(sessions[0]["id"], 3);
        assert_eq!(sessions[0]["name"], "Anna Verdi");
        assert_eq!(
            sessions[0]["last_message"],
            "Quando esce il risultato dello scritto?"
        );
        assert_eq!(sessions[0]["is_unread"], true);

        assert_eq!(sessions[1]["id"], 2);
        assert_eq!(sessions[1]["name"], "Luca Bianchi");
        assert_eq!(sessions[1]["last_message"], "Le ho inviato la bozza via mail.");
        assert_eq!(sessions[1]["is_unread"], true);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "messages")))]
    async fn test_list_sessions_unread_only_counts_incoming(
        pool: SqlitePool,
    ) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // lbianchi non ha messaggi non letti in ingresso: l'ultimo suo
        // messaggio non letto è in uscita e non deve accendere il flag
        let response = server
            .get("/chat")
            .authorization_bearer(&token_lbianchi())
            .await;

        response.assert_status_ok();
        let sessions: serde_json::Value = response.json();
        let sessions = sessions.as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["id"], 1);
        assert_eq!(sessions[0]["is_unread"], false);

        Ok(())
    }

    // ============================================================
    // GET /chat/{partner_id} - history
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "messages")))]
    async fn test_history_order_and_is_sender(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/chat/2")
            .authorization_bearer(&token_profrossi())
            .await;

        response.assert_status_ok();
        let messages: serde_json::Value = response.json();
        let messages = messages.as_array().unwrap();
        assert_eq!(messages.len(), 3);

        // ordine di commit, dal più vecchio
        assert_eq!(messages[0]["id"], 1);
        assert_eq!(messages[0]["is_sender"], false);
        assert_eq!(messages[1]["id"], 2);
        assert_eq!(messages[1]["is_sender"], true);
        assert_eq!(messages[2]["id"], 3);
        assert_eq!(messages[2]["is_sender"], false);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "messages")))]
    async fn test_history_with_unknown_user(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/chat/999")
            .authorization_bearer(&token_profrossi())
            .await;

        response.assert_status_not_found();
        Ok(())
    }

    // ============================================================
    // POST /chat - creazione messaggi (REST, unico punto di scrittura)
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "messages")))]
    async fn test_send_message_visible_over_rest_immediately(
        pool: SqlitePool,
    ) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/chat")
            .authorization_bearer(&token_profrossi())
            .json(&json!({ "receiver": 2, "content": "Ci vediamo a ricevimento." }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let message: serde_json::Value = response.json();
        assert_eq!(message["sender_id"], 1);
        assert_eq!(message["receiver_id"], 2);
        assert_eq!(message["message_type"], "text");
        assert_eq!(message["is_read"], false);
        let message_id = message["id"].as_i64().unwrap();

        // subito visibile dal fallback HTTP del destinatario
        let response = server
            .get("/chat/1")
            .authorization_bearer(&token_lbianchi())
            .await;
        let history: serde_json::Value = response.json();
        let last = history.as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["id"], message_id);
        assert_eq!(last["content"], "Ci vediamo a ricevimento.");

        // e la sessione del destinatario si accende
        let response = server
            .get("/chat")
            .authorization_bearer(&token_lbianchi())
            .await;
        let sessions: serde_json::Value = response.json();
        assert_eq!(sessions[0]["is_unread"], true);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_send_message_validation(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // a se stessi
        let response = server
            .post("/chat")
            .authorization_bearer(&token_profrossi())
            .json(&json!({ "receiver": 1, "content": "Ciao me" }))
            .await;
        response.assert_status_bad_request();

        // destinatario inesistente
        let response = server
            .post("/chat")
            .authorization_bearer(&token_profrossi())
            .json(&json!({ "receiver": 999, "content": "C'è nessuno?" }))
            .await;
        response.assert_status_not_found();

        // né contenuto né file
        let response = server
            .post("/chat")
            .authorization_bearer(&token_profrossi())
            .json(&json!({ "receiver": 2, "content": "   " }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_send_message_with_file(pool: SqlitePool) -> sqlx::Result<()> {
        use axum_test::multipart::{MultipartForm, Part};

        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let form = MultipartForm::new()
            .add_text("receiver", "2")
            .add_text("content", "La dispensa di cui parlavamo")
            .add_part(
                "file",
                Part::bytes(b"fake pdf bytes".to_vec()).file_name("dispensa.pdf"),
            );

        let response = server
            .post("/chat")
            .authorization_bearer(&token_profrossi())
            .multipart(form)
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let message: serde_json::Value = response.json();
        assert_eq!(message["message_type"], "file");
        assert_eq!(message["content"], "La dispensa di cui parlavamo");
        let url = message["file"]["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/chat_files/"));
        assert!(url.ends_with("dispensa.pdf"));

        // il file compare anche nella history del destinatario
        let response = server
            .get("/chat/1")
            .authorization_bearer(&token_lbianchi())
            .await;
        let history: serde_json::Value = response.json();
        let last = history.as_array().unwrap().last().unwrap().clone();
        assert!(last["file"]["title"].as_str().unwrap().ends_with("dispensa.pdf"));

        Ok(())
    }

    // ============================================================
    // Fanout: le connessioni vive ricevono gli eventi della POST
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_fanout_reaches_all_receiver_connections(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // due connessioni per il destinatario, una per il mittente
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();
        let (tx_sender, mut rx_sender) = unbounded_channel();
        state.chat_online.register(2, tx_a);
        state.chat_online.register(2, tx_b);
        state.chat_online.register(1, tx_sender);

        let response = server
            .post("/chat")
            .authorization_bearer(&token_profrossi())
            .json(&json!({ "receiver": 2, "content": "Avviso in tempo reale" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let created: serde_json::Value = response.json();
        let message_id = created["id"].as_i64().unwrap();

        // entrambe le connessioni del destinatario ricevono il messaggio
        // con l'id già persistito, poi l'hint di refresh
        for rx in [&mut rx_a, &mut rx_b] {
            match rx.try_recv().expect("receiver should get chat_message") {
                WsEventDTO::ChatMessage { message } => {
                    assert_eq!(message.id, message_id);
                    assert_eq!(message.content, "Avviso in tempo reale");
                }
                other => panic!("Expected ChatMessage, got {:?}", other),
            }
            match rx.try_recv().expect("receiver should get sessions hint") {
                WsEventDTO::ChatSessionsUpdated => {}
                other => panic!("Expected ChatSessionsUpdated, got {:?}", other),
            }
        }

        // il mittente riceve solo l'hint di refresh
        match rx_sender.try_recv().expect("sender should get sessions hint") {
            WsEventDTO::ChatSessionsUpdated => {}
            other => panic!("Expected ChatSessionsUpdated, got {:?}", other),
        }
        assert!(rx_sender.try_recv().is_err(), "No echo of the message to the sender");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_fanout_to_offline_receiver_is_noop(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // nessuna connessione registrata: la POST deve comunque riuscire
        let response = server
            .post("/chat")
            .authorization_bearer(&token_profrossi())
            .json(&json!({ "receiver": 2, "content": "Per quando ti ricolleghi" }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);

        // e il messaggio resta recuperabile via HTTP
        let response = server
            .get("/chat/1")
            .authorization_bearer(&token_lbianchi())
            .await;
        let history: serde_json::Value = response.json();
        assert_eq!(history.as_array().unwrap().len(), 1);

        Ok(())
    }

    // ============================================================
    // mark_read + aggregato non letti
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "messages")))]
    async fn test_mark_read_and_aggregate_flags(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // profrossi ha non letti da lbianchi (msg 3) e da averdi (msg 4)
        let response = server
            .get("/chat/unread")
            .authorization_bearer(&token_profrossi())
            .await;
        let payload: serde_json::Value = response.json();
        assert_eq!(payload["any_unread"], true);

        // legge la chat con lbianchi: resta il non letto di averdi
        let response = server
            .post("/chat/mark_read")
            .authorization_bearer(&token_profrossi())
            .json(&json!({ "chat_id": 2 }))
            .await;
        response.assert_status_ok();
        let status: serde_json::Value = response.json();
        assert_eq!(status["chat_id"], 2);
        assert_eq!(status["has_unread"], false);
        assert_eq!(status["all_read"], false);
        assert_eq!(status["any_unread_sessions"], true);

        // legge anche la chat con averdi: tutto letto
        let response = server
            .post("/chat/mark_read")
            .authorization_bearer(&token_profrossi())
            .json(&json!({ "chat_id": 3 }))
            .await;
        let status: serde_json::Value = response.json();
        assert_eq!(status["all_read"], true);
        assert_eq!(status["any_unread_sessions"], false);

        // l'aggregato ora è coerente con i flag di sessione
        let response = server
            .get("/chat/unread")
            .authorization_bearer(&token_profrossi())
            .await;
        let payload: serde_json::Value = response.json();
        assert_eq!(payload["any_unread"], false);

        let response = server
            .get("/chat")
            .authorization_bearer(&token_profrossi())
            .await;
        let sessions: serde_json::Value = response.json();
        for session in sessions.as_array().unwrap() {
            assert_eq!(session["is_unread"], false);
        }

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "messages")))]
    async fn test_mark_read_does_not_touch_sender_side(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // lbianchi marca la chat con profrossi: i SUOI messaggi inviati
        // (msg 3, non letto da profrossi) non devono cambiare stato
        let response = server
            .post("/chat/mark_read")
            .authorization_bearer(&token_lbianchi())
            .json(&json!({ "chat_id": 1 }))
            .await;
        response.assert_status_ok();

        // profrossi ha ancora il non letto in ingresso da lbianchi
        let response = server
            .get("/chat")
            .authorization_bearer(&token_profrossi())
            .await;
        let sessions: serde_json::Value = response.json();
        let bianchi_session = sessions
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["id"] == 2)
            .unwrap()
            .clone();
        assert_eq!(bianchi_session["is_unread"], true);

        Ok(())
    }
}
