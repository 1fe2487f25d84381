//! Integration tests per gli endpoints di autenticazione
//!
//! Test per:
//! - POST /auth/register
//! - POST /auth/login
//! - POST /auth/logout
//! - middleware di autenticazione
//!
//! Questi test usano `#[sqlx::test]` che:
//! - Crea automaticamente un database SQLite di test isolato
//! - Applica le migrations da `migrations/`
//! - Applica i fixtures specificati da `fixtures/`

mod common;

#[cfg(test)]
mod auth_tests {
    use super::common::*;
    use serde_json::json;
    use sqlx::SqlitePool;

    // ============================================================
    // Test per POST /auth/register
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_success(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "username": "newstudent",
            "password": "Password123",
            "role": "student",
            "first_name": "Nuovo",
            "last_name": "Studente"
        });

        let response = server.post("/auth/register").json(&body).await;

        response.assert_status(axum::http::StatusCode::CREATED);

        let payload: serde_json::Value = response.json();
        assert!(payload["access"].is_string(), "Should return an access token");
        assert_eq!(payload["user"]["username"], "newstudent");
        assert_eq!(payload["user"]["role"], "student");
        assert!(
            payload["user"].get("password").is_none(),
            "Password must never be serialized"
        );

        let headers = response.headers();
        let auth_header = headers.get("authorization").unwrap().to_str().unwrap();
        assert!(auth_header.starts_with("Bearer "));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_duplicate_username(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "username": "profrossi",
            "password": "Password123",
            "role": "teacher"
        });

        let response = server.post("/auth/register").json(&body).await;

        response.assert_status_conflict();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_username_too_short(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "username": "ab",
            "password": "Password123",
            "role": "student"
        });

        let response = server.post("/auth/register").json(&body).await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_username_invalid_characters(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "username": "user@name",
            "password": "Password123",
            "role": "student"
        });

        let response = server.post("/auth/register").json(&body).await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_password_too_weak(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // niente cifre
        let body = json!({
            "username": "weakuser",
            "password": "PasswordOnly",
            "role": "student"
        });

        let response = server.post("/auth/register").json(&body).await;
        response.assert_status_bad_request();

        // niente maiuscole
        let body = json!({
            "username": "weakuser",
            "password": "password123",
            "role": "student"
        });

        let response = server.post("/auth/register").json(&body).await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_invalid_role(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "username": "adminuser",
            "password": "Password123",
            "role": "admin"
        });

        let response = server.post("/auth/register").json(&body).await;

        // serde rifiuta il ruolo sconosciuto prima della validazione
        response.assert_status_unprocessable_entity();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_missing_password(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "username": "newuser",
            "role": "student"
        });

        let response = server.post("/auth/register").json(&body).await;

        response.assert_status_unprocessable_entity();
        Ok(())
    }

    // ============================================================
    // Test per POST /auth/login
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_then_login(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let register_body = json!({
            "username": "logintest",
            "password": "TestLogin123",
            "role": "student"
        });

        let register_response = server.post("/auth/register").json(&register_body).await;
        register_response.assert_status(axum::http::StatusCode::CREATED);

        let login_body = json!({
            "username": "logintest",
            "password": "TestLogin123"
        });

        let response = server.post("/auth/login").json(&login_body).await;
        response.assert_status_ok();

        let payload: serde_json::Value = response.json();
        assert!(payload["access"].is_string());
        assert_eq!(payload["user"]["username"], "logintest");

        let headers = response.headers();
        assert!(
            headers.get("set-cookie").is_some(),
            "Set-Cookie header should be present"
        );
        let auth_header = headers.get("authorization").unwrap().to_str().unwrap();
        assert!(auth_header.starts_with("Bearer "));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_wrong_password(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let register_body = json!({
            "username": "logintest",
            "password": "TestLogin123",
            "role": "student"
        });
        server.post("/auth/register").json(&register_body).await;

        let body = json!({
            "username": "logintest",
            "password": "wrongpassword"
        });

        let response = server.post("/auth/login").json(&body).await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_nonexistent_user(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let body = json!({
            "username": "nonexistent",
            "password": "Password123"
        });

        let response = server.post("/auth/login").json(&body).await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_missing_fields(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "profrossi" }))
            .await;
        response.assert_status_unprocessable_entity();

        let response = server.post("/auth/login").json(&json!({})).await;
        response.assert_status_unprocessable_entity();

        Ok(())
    }

    // ============================================================
    // Test per POST /auth/logout e middleware
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_logout_requires_auth(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server.post("/auth/logout").await;
        response.assert_status_forbidden();

        let response = server
            .post("/auth/logout")
            .authorization_bearer(&token_profrossi())
            .await;
        response.assert_status_ok();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_protected_route_rejects_bad_tokens(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // nessun header -> 403
        let response = server.get("/dashboard").await;
        response.assert_status_forbidden();

        // token spazzatura -> 401
        let response = server
            .get("/dashboard")
            .authorization_bearer("not-a-jwt")
            .await;
        response.assert_status_unauthorized();

        // token firmato per un utente inesistente -> 401
        let response = server
            .get("/dashboard")
            .authorization_bearer(&create_test_jwt(999, "ghost"))
            .await;
        response.assert_status_unauthorized();

        Ok(())
    }
}
