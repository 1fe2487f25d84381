//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Read};
use crate::dtos::RegisterDTO;
use crate::entities::User;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

const USER_COLUMNS: &str =
    "user_id, username, password, role, first_name, last_name, photo, status, date_joined";

pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Lo username è univoco: match esatto.
    /// Per la ricerca parziale usare search_members.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(user)
    }

    /// Tutti gli utenti tranne il chiamante (lista membri per i docenti)
    pub async fn list_all_except(&self, user_id: i64) -> Result<Vec<User>, Error> {
        let query =
            format!("SELECT {USER_COLUMNS} FROM users WHERE user_id != ? ORDER BY username ASC");
        let users = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(users)
    }

    /// Ricerca per username, nome o cognome (match parziale case-insensitive)
    pub async fn search_members(&self, pattern: &str) -> Result<Vec<User>, Error> {
        let like = format!("%{}%", pattern);
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE username LIKE ?1 OR first_name LIKE ?1 OR last_name LIKE ?1 \
             ORDER BY username ASC LIMIT 20"
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(like)
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(users)
    }

    /// Aggiorna lo status testuale del profilo
    pub async fn update_status(&self, user_id: i64, status: &str) -> Result<(), Error> {
        sqlx::query("UPDATE users SET status = ? WHERE user_id = ?")
            .bind(status)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }

    /// Aggiorna il percorso della foto profilo
    pub async fn update_photo(&self, user_id: i64, photo_path: &str) -> Result<(), Error> {
        sqlx::query("UPDATE users SET photo = ? WHERE user_id = ?")
            .bind(photo_path)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}

impl Create<User, RegisterDTO> for UserRepository {
    /// Il campo password del DTO deve contenere l'hash, mai la password in chiaro
    async fn create(&self, data: &RegisterDTO) -> Result<User, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, password, role, first_name, last_name, date_joined) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&data.username)
        .bind(&data.password)
        .bind(data.role)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_rowid();

        Ok(User {
            user_id: new_id,
            username: data.username.clone(),
            password: data.password.clone(),
            role: data.role,
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            photo: None,
            status: None,
            date_joined: now,
        })
    }
}

impl Read<User, i64> for UserRepository {
    async fn read(&self, id: &i64) -> Result<Option<User>, Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(user)
    }
}
