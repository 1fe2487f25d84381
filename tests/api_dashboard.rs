//! Integration tests per la dashboard personale

mod common;

#[cfg(test)]
mod dashboard_tests {
    use super::common::*;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "courses", "enrollments")))]
    async fn test_dashboard_for_teacher(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/dashboard")
            .authorization_bearer(&token_profrossi())
            .await;

        response.assert_status_ok();
        let dashboard: serde_json::Value = response.json();
        assert_eq!(dashboard["username"], "profrossi");
        assert_eq!(dashboard["role"], "teacher");
        assert_eq!(dashboard["status"], "Ricevimento il martedi");

        let courses = dashboard["courses"].as_array().unwrap();
        assert_eq!(courses.len(), 2);
        // prima gli attivi
        assert_eq!(courses[0]["is_active"], true);
        assert_eq!(courses[1]["is_active"], false);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "courses", "enrollments")))]
    async fn test_dashboard_for_student(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/dashboard")
            .authorization_bearer(&token_averdi())
            .await;

        response.assert_status_ok();
        let dashboard: serde_json::Value = response.json();
        assert_eq!(dashboard["role"], "student");

        let courses = dashboard["courses"].as_array().unwrap();
        assert_eq!(courses.len(), 2);
        // prima le iscrizioni in corso, poi le completate
        assert_eq!(courses[0]["name"], "Programmazione");
        assert_eq!(courses[0]["is_active"], true);
        assert_eq!(courses[1]["name"], "Analisi Matematica 1");
        assert_eq!(courses[1]["is_active"], false);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_patch_status(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .patch("/dashboard/status")
            .authorization_bearer(&token_lbianchi())
            .json(&json!({ "status": "In sessione, non disturbare" }))
            .await;
        response.assert_status_ok();
        let payload: serde_json::Value = response.json();
        assert_eq!(payload["status"], "In sessione, non disturbare");

        // persiste sulla dashboard
        let response = server
            .get("/dashboard")
            .authorization_bearer(&token_lbianchi())
            .await;
        let dashboard: serde_json::Value = response.json();
        assert_eq!(dashboard["status"], "In sessione, non disturbare");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_patch_status_validation(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .patch("/dashboard/status")
            .authorization_bearer(&token_lbianchi())
            .json(&json!({ "status": "" }))
            .await;
        response.assert_status_bad_request();

        let response = server
            .patch("/dashboard/status")
            .authorization_bearer(&token_lbianchi())
            .json(&json!({ "status": "x".repeat(300) }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_patch_photo(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let form = MultipartForm::new().add_part(
            "photo",
            Part::bytes(b"fake image bytes".to_vec()).file_name("io.jpg"),
        );

        let response = server
            .patch("/dashboard/photo")
            .authorization_bearer(&token_lbianchi())
            .multipart(form)
            .await;

        response.assert_status_ok();
        let payload: serde_json::Value = response.json();
        let url = payload["photo"].as_str().unwrap();
        assert!(url.starts_with("/uploads/profile_photos/"));
        assert!(url.ends_with("io.jpg"));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_patch_photo_without_file(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let form = MultipartForm::new().add_text("other", "not a photo");

        let response = server
            .patch("/dashboard/photo")
            .authorization_bearer(&token_lbianchi())
            .multipart(form)
            .await;

        response.assert_status_bad_request();
        Ok(())
    }
}
