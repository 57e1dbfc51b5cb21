// SPDX-License-Identifier: MIT

use super::*;
use oj_adapters::FakeVcsAdapter;

#[tokio::test]
async fn ensure_without_worktree_returns_repo_root() {
    let manager = WorktreeManager::new(FakeVcsAdapter::new(), PathBuf::from("/repo"));
    let dir = manager.ensure(None).await.unwrap();
    assert_eq!(dir, PathBuf::from("/repo"));
}

#[tokio::test]
async fn ensure_with_worktree_creates_sibling_dir() {
    let manager = WorktreeManager::new(FakeVcsAdapter::new(), PathBuf::from("/repo"));
    let dir = manager.ensure(Some("feature-x")).await.unwrap();
    assert_eq!(dir, PathBuf::from("/repo/.grove-worktrees/feature-x"));
}

#[tokio::test]
async fn ensure_is_idempotent() {
    let manager = WorktreeManager::new(FakeVcsAdapter::new(), PathBuf::from("/repo"));
    let first = manager.ensure(Some("feature-x")).await.unwrap();
    let second = manager.ensure(Some("feature-x")).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(manager.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn destroy_removes_worktree() {
    let manager = WorktreeManager::new(FakeVcsAdapter::new(), PathBuf::from("/repo"));
    manager.ensure(Some("feature-x")).await.unwrap();
    manager.destroy("feature-x").await.unwrap();
    assert!(manager.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_ensure_for_distinct_names_both_succeed() {
    let manager = Arc::new(WorktreeManager::new(FakeVcsAdapter::new(), PathBuf::from("/repo")));
    let a = manager.clone();
    let b = manager.clone();
    let (ra, rb) = tokio::join!(tokio::spawn(async move { a.ensure(Some("a")).await }), tokio::spawn(async move {
        b.ensure(Some("b")).await
    }));
    ra.unwrap().unwrap();
    rb.unwrap().unwrap();
    assert_eq!(manager.list().await.unwrap().len(), 2);
}
