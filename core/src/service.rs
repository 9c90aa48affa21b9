//! Business rules between transport and storage.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TodoError;
use crate::repository::TodoRepository;
use crate::types::{CreateTodo, Todo, TodoFilter, TodoId, UpdateTodo};
use crate::validation::{
    check_then_trim_description, normalize_description, normalize_title, validate_id,
};

/// Operations the HTTP layer needs. Errors are `TodoError`; the handler owns
/// the mapping to status codes.
#[async_trait]
pub trait TodoService: Send + Sync {
    async fn create(&self, input: CreateTodo, cancel: &CancellationToken) -> Result<Todo, TodoError>;

    async fn get_by_id(&self, id: TodoId, cancel: &CancellationToken) -> Result<Todo, TodoError>;

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Todo>, TodoError>;

    async fn update(
        &self,
        id: TodoId,
        input: UpdateTodo,
        cancel: &CancellationToken,
    ) -> Result<Todo, TodoError>;

    async fn delete(&self, id: TodoId, cancel: &CancellationToken) -> Result<(), TodoError>;

    async fn get_filtered(
        &self,
        filter: TodoFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Todo>, TodoError>;
}

/// Trims and validates input, then delegates to a repository.
///
/// The id is always checked before the payload, so a request that is wrong
/// in both ways reports `InvalidId`. A created description is trimmed before
/// its length is checked; an updated one is checked as sent.
#[derive(Clone)]
pub struct DefaultTodoService {
    repository: Arc<dyn TodoRepository>,
}

impl DefaultTodoService {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl TodoService for DefaultTodoService {
    async fn create(&self, input: CreateTodo, cancel: &CancellationToken) -> Result<Todo, TodoError> {
        let input = CreateTodo {
            title: normalize_title(&input.title)?,
            description: normalize_description(&input.description)?,
            completed: input.completed,
        };
        let todo = self.repository.create(input, cancel).await?;
        debug!(id = todo.id, "todo created");
        Ok(todo)
    }

    async fn get_by_id(&self, id: TodoId, cancel: &CancellationToken) -> Result<Todo, TodoError> {
        let id = validate_id(id)?;
        self.repository.get_by_id(id, cancel).await
    }

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Todo>, TodoError> {
        self.repository.get_all(cancel).await
    }

    async fn update(
        &self,
        id: TodoId,
        input: UpdateTodo,
        cancel: &CancellationToken,
    ) -> Result<Todo, TodoError> {
        let id = validate_id(id)?;
        let input = UpdateTodo {
            title: input.title.try_map(|title| normalize_title(&title))?,
            description: input
                .description
                .try_map(|description| check_then_trim_description(&description))?,
            completed: input.completed,
        };
        self.repository.update(id, input, cancel).await
    }

    async fn delete(&self, id: TodoId, cancel: &CancellationToken) -> Result<(), TodoError> {
        let id = validate_id(id)?;
        self.repository.delete(id, cancel).await
    }

    async fn get_filtered(
        &self,
        filter: TodoFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Todo>, TodoError> {
        self.repository.get_filtered(&filter, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryTodoRepository;
    use crate::types::Field;
    use rstest::rstest;

    fn service() -> DefaultTodoService {
        DefaultTodoService::new(Arc::new(InMemoryTodoRepository::new()))
    }

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    fn input(title: &str, description: &str) -> CreateTodo {
        CreateTodo {
            title: title.to_string(),
            description: description.to_string(),
            completed: false,
        }
    }

    #[tokio::test]
    async fn create_trims_title_and_description() {
        let todo = service()
            .create(input("  Task 1 ", "\tDesc 1\n"), &token())
            .await
            .unwrap();
        assert!(todo.id > 0);
        assert_eq!(todo.title, "Task 1");
        assert_eq!(todo.description, "Desc 1");
    }

    #[tokio::test]
    async fn create_rejects_whitespace_title() {
        let result = service().create(input("   ", "Desc"), &token()).await;
        assert_eq!(result, Err(TodoError::TitleRequired));
    }

    #[tokio::test]
    async fn create_rejects_long_fields() {
        let svc = service();
        let long_title = svc.create(input(&"t".repeat(256), ""), &token()).await;
        assert_eq!(long_title, Err(TodoError::TitleTooLong));

        let long_description = svc.create(input("ok", &"d".repeat(1001)), &token()).await;
        assert_eq!(long_description, Err(TodoError::DescriptionTooLong));
    }

    #[tokio::test]
    async fn create_accepts_title_at_limit() {
        let todo = service()
            .create(input(&"t".repeat(255), ""), &token())
            .await
            .unwrap();
        assert_eq!(todo.title.len(), 255);
    }

    #[tokio::test]
    async fn get_by_id_rejects_non_positive_before_lookup() {
        let svc = service();
        assert_eq!(svc.get_by_id(0, &token()).await, Err(TodoError::InvalidId));
        assert_eq!(svc.get_by_id(-5, &token()).await, Err(TodoError::InvalidId));
        assert_eq!(svc.get_by_id(9, &token()).await, Err(TodoError::NotFound));
    }

    #[tokio::test]
    async fn update_checks_id_before_payload() {
        let patch = UpdateTodo {
            title: Field::Set("   ".to_string()),
            ..UpdateTodo::default()
        };
        let result = service().update(0, patch, &token()).await;
        assert_eq!(result, Err(TodoError::InvalidId));
    }

    #[tokio::test]
    async fn update_rejects_whitespace_title() {
        let svc = service();
        let created = svc.create(input("title", ""), &token()).await.unwrap();
        let patch = UpdateTodo {
            title: Field::Set(" \t ".to_string()),
            ..UpdateTodo::default()
        };
        assert_eq!(
            svc.update(created.id, patch, &token()).await,
            Err(TodoError::TitleRequired)
        );
    }

    #[tokio::test]
    async fn update_trims_set_fields_and_keeps_unset() {
        let svc = service();
        let created = svc.create(input("title", "keep me"), &token()).await.unwrap();
        let patch = UpdateTodo {
            title: Field::Set("  renamed  ".to_string()),
            ..UpdateTodo::default()
        };
        let updated = svc.update(created.id, patch, &token()).await.unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description, "keep me");
    }

    #[tokio::test]
    async fn update_can_clear_description() {
        let svc = service();
        let created = svc.create(input("title", "something"), &token()).await.unwrap();
        let patch = UpdateTodo {
            description: Field::Set(String::new()),
            ..UpdateTodo::default()
        };
        let updated = svc.update(created.id, patch, &token()).await.unwrap();
        assert_eq!(updated.description, "");
    }

    fn set_title(title: String) -> UpdateTodo {
        UpdateTodo {
            title: Field::Set(title),
            ..UpdateTodo::default()
        }
    }

    fn set_description(description: String) -> UpdateTodo {
        UpdateTodo {
            description: Field::Set(description),
            ..UpdateTodo::default()
        }
    }

    #[rstest]
    #[case::title_over_limit(set_title("t".repeat(256)), TodoError::TitleTooLong)]
    #[case::padded_title_over_limit(
        set_title(format!(" {} ", "t".repeat(256))),
        TodoError::TitleTooLong
    )]
    #[case::description_over_limit(
        set_description("d".repeat(1001)),
        TodoError::DescriptionTooLong
    )]
    #[case::padded_description_over_raw_limit(
        set_description(format!(" {}", "d".repeat(1000))),
        TodoError::DescriptionTooLong
    )]
    #[tokio::test]
    async fn update_rejects_fields_over_limit(
        #[case] patch: UpdateTodo,
        #[case] expected: TodoError,
    ) {
        let svc = service();
        let created = svc.create(input("title", "desc"), &token()).await.unwrap();

        assert_eq!(svc.update(created.id, patch, &token()).await, Err(expected));

        let stored = svc.get_by_id(created.id, &token()).await.unwrap();
        assert_eq!(stored.title, "title");
        assert_eq!(stored.description, "desc");
    }

    #[rstest]
    #[case::title_at_limit(set_title("t".repeat(255)), "t".repeat(255), String::new())]
    #[case::padded_title_at_limit(
        set_title(format!("  {}  ", "t".repeat(255))),
        "t".repeat(255),
        String::new()
    )]
    #[case::description_at_limit(
        set_description("d".repeat(1000)),
        "title".to_string(),
        "d".repeat(1000)
    )]
    #[tokio::test]
    async fn update_accepts_fields_at_limit(
        #[case] patch: UpdateTodo,
        #[case] title: String,
        #[case] description: String,
    ) {
        let svc = service();
        let created = svc.create(input("title", ""), &token()).await.unwrap();

        let updated = svc.update(created.id, patch, &token()).await.unwrap();
        assert_eq!(updated.title, title);
        assert_eq!(updated.description, description);
    }

    #[tokio::test]
    async fn update_and_delete_propagate_not_found() {
        let svc = service();
        assert_eq!(
            svc.update(12, UpdateTodo::default(), &token()).await,
            Err(TodoError::NotFound)
        );
        assert_eq!(svc.delete(12, &token()).await, Err(TodoError::NotFound));
        assert_eq!(svc.delete(0, &token()).await, Err(TodoError::InvalidId));
    }

    #[tokio::test]
    async fn get_filtered_passes_search_through_untrimmed() {
        let svc = service();
        svc.create(input("alpha beta", ""), &token()).await.unwrap();
        svc.create(input("alphabet", ""), &token()).await.unwrap();

        let spaced = svc
            .get_filtered(TodoFilter::new(None, "a b"), &token())
            .await
            .unwrap();
        assert_eq!(spaced.len(), 1);
        assert_eq!(spaced[0].title, "alpha beta");
    }
}
