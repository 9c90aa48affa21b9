//! Concurrent access to the in-memory repository on a multi-threaded runtime.
//!
//! Each test spawns many tasks against one shared store, then checks the
//! properties that only hold if the lock discipline is right: unique ids and
//! readers never seeing half of a write.

use std::collections::HashSet;
use std::sync::Arc;

use todo_core::{
    CancellationToken, CreateTodo, Field, InMemoryTodoRepository, TodoRepository, UpdateTodo,
};

fn create_input(title: String) -> CreateTodo {
    CreateTodo {
        title: title.clone(),
        description: title,
        completed: false,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_ids() {
    let repo = Arc::new(InMemoryTodoRepository::new());

    let handles: Vec<_> = (0..200)
        .map(|n| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                let cancel = CancellationToken::new();
                repo.create(create_input(format!("task {n}")), &cancel)
                    .await
                    .unwrap()
                    .id
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()), "duplicate id issued");
    }

    assert_eq!(ids.len(), 200);
    assert_eq!(ids.iter().min(), Some(&1));
    assert_eq!(ids.iter().max(), Some(&200));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ids_keep_increasing_across_concurrent_deletes() {
    let repo = Arc::new(InMemoryTodoRepository::new());
    let cancel = CancellationToken::new();
    for n in 0..50 {
        repo.create(create_input(format!("seed {n}")), &cancel).await.unwrap();
    }

    let deleters: Vec<_> = (1..=50)
        .map(|id| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move { repo.delete(id, &CancellationToken::new()).await })
        })
        .collect();
    let creators: Vec<_> = (0..50)
        .map(|n| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                repo.create(create_input(format!("late {n}")), &CancellationToken::new())
                    .await
                    .unwrap()
                    .id
            })
        })
        .collect();

    for handle in deleters {
        handle.await.unwrap().unwrap();
    }
    for handle in creators {
        assert!(handle.await.unwrap() > 50, "deleted id was reissued");
    }
    assert_eq!(repo.get_all(&cancel).await.unwrap().len(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_partial_updates() {
    let repo = Arc::new(InMemoryTodoRepository::new());
    let cancel = CancellationToken::new();
    let id = repo.create(create_input("v0".into()), &cancel).await.unwrap().id;

    // Every write sets title and description to the same value.
    let writers: Vec<_> = (1..=100)
        .map(|n| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                let value = format!("v{n}");
                let patch = UpdateTodo {
                    title: Field::Set(value.clone()),
                    description: Field::Set(value),
                    completed: Field::Set(n % 2 == 0),
                };
                repo.update(id, patch, &CancellationToken::new()).await.unwrap();
            })
        })
        .collect();
    let readers: Vec<_> = (0..100)
        .map(|_| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                let todo = repo.get_by_id(id, &CancellationToken::new()).await.unwrap();
                assert_eq!(todo.title, todo.description);
                assert!(todo.updated_at >= todo.created_at);
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.await.unwrap();
    }
}
