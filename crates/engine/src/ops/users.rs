use sea_orm::{ActiveModelTrait, DatabaseTransaction};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, store, users,
    util::{normalize_handle, normalize_optional_text},
};

use super::{Engine, with_tx};

/// Hex SHA-256 of `salt || password`. The salt is the user id.
fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

impl Engine {
    /// Registers a user. Handles are unique after normalization.
    pub async fn new_user(
        &self,
        username: &str,
        display_name: Option<&str>,
        password: &str,
    ) -> ResultEngine<User> {
        let username = normalize_handle(username)
            .ok_or_else(|| EngineError::InvalidExpense("username must not be empty".to_string()))?;
        if password.is_empty() {
            return Err(EngineError::InvalidExpense(
                "password must not be empty".to_string(),
            ));
        }
        let display_name = normalize_optional_text(display_name);
        let password = password.to_string();
        with_tx!(self, |db_tx| insert_user(&db_tx, username, display_name, &password).await)
    }

    /// Resolves a user id or handle.
    pub async fn resolve_user(&self, id_or_handle: &str) -> ResultEngine<User> {
        store::resolve_user(&self.database, id_or_handle).await
    }

    /// Checks a handle/password pair, returning the user on success.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<User>> {
        let Some(model) = store::user_model_by_handle(&self.database, username).await? else {
            return Ok(None);
        };
        if model.password != password_digest(&model.id, password) {
            return Ok(None);
        }
        Ok(Some(model.into()))
    }
}

async fn insert_user(
    db_tx: &DatabaseTransaction,
    username: String,
    display_name: Option<String>,
    password: &str,
) -> ResultEngine<User> {
    if store::user_model_by_handle(db_tx, &username).await?.is_some() {
        return Err(EngineError::ExistingKey(username));
    }
    let id = Uuid::new_v4().to_string();
    let digest = password_digest(&id, password);
    let inserted = users::ActiveModel::new_user(id, username, display_name, digest)
        .insert(db_tx)
        .await?;
    tracing::info!(user_id = %inserted.id, username = %inserted.username, "user created");
    Ok(inserted.into())
}
