use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ContactError;
use crate::models::NewContactMessage;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Persists the message and returns its reference id.
    async fn create(&self, message: NewContactMessage) -> Result<i32, ContactError>;
}

#[derive(Default)]
pub struct InMemoryContactRepository {
    messages: Arc<RwLock<Vec<NewContactMessage>>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stored(&self) -> Vec<NewContactMessage> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, message: NewContactMessage) -> Result<i32, ContactError> {
        let mut messages = self.messages.write().await;
        messages.push(message);
        Ok(messages.len() as i32)
    }
}
