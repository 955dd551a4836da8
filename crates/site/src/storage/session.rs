//! The visitor's session as a storage backend.

use async_trait::async_trait;
use serde_json::Value;
use tower_sessions::Session;

use super::{Storage, StorageError};

#[async_trait]
impl Storage for Session {
    async fn get_value(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(Self::get_value(self, key).await?)
    }

    async fn set_value(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.insert_value(key, value).await?;
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<(), StorageError> {
        Self::remove_value(self, key).await?;
        Ok(())
    }
}
