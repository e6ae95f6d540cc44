use std::sync::Arc;

use uuid::Uuid;

use crate::error::ContactError;
use crate::models::{ContactRequest, NewContactMessage};
use crate::repository::ContactRepository;

pub struct ContactService<R: ContactRepository> {
    repository: Arc<R>,
}

impl<R: ContactRepository> Clone for ContactService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// An authenticated caller is silently linked to the message;
    /// authentication is never required to submit.
    pub async fn submit(
        &self,
        request: ContactRequest,
        user_id: Option<Uuid>,
    ) -> Result<i32, ContactError> {
        self.repository
            .create(NewContactMessage {
                name: request.name,
                email: request.email,
                phone: request.phone,
                subject: request.subject,
                message: request.message,
                user_id,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactSubject;
    use crate::repository::InMemoryContactRepository;

    fn request() -> ContactRequest {
        ContactRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            subject: ContactSubject::Support,
            message: "My dashboard is empty.".to_string(),
        }
    }

    #[tokio::test]
    async fn submit_returns_reference_id() {
        let repo = Arc::new(InMemoryContactRepository::new());
        let service = ContactService::new(Arc::clone(&repo));
        let id = service.submit(request(), None).await.unwrap();
        assert_eq!(id, 1);
        assert!(repo.stored().await[0].user_id.is_none());
    }

    #[tokio::test]
    async fn authenticated_caller_is_attached() {
        let repo = Arc::new(InMemoryContactRepository::new());
        let service = ContactService::new(Arc::clone(&repo));
        let user = Uuid::new_v4();
        service.submit(request(), Some(user)).await.unwrap();
        assert_eq!(repo.stored().await[0].user_id, Some(user));
    }
}
