// SPDX-License-Identifier: MIT

use super::*;

#[tokio::test]
async fn fake_ensure_is_idempotent() {
    let vcs = FakeVcsAdapter::new();
    let repo = std::path::Path::new("/repo");
    let path = std::path::Path::new("/repo/.grove-worktrees/feature");

    vcs.ensure(repo, "feature", path, "feature-branch").await.unwrap();
    vcs.ensure(repo, "feature", path, "feature-branch").await.unwrap();

    let entries = vcs.list(repo).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "feature");
    assert_eq!(entries[0].branch.as_deref(), Some("feature-branch"));
}

#[tokio::test]
async fn fake_destroy_removes_entry() {
    let vcs = FakeVcsAdapter::new();
    let repo = std::path::Path::new("/repo");
    let path = std::path::Path::new("/repo/.grove-worktrees/feature");

    vcs.ensure(repo, "feature", path, "feature-branch").await.unwrap();
    vcs.destroy(repo, path).await.unwrap();

    assert!(vcs.list(repo).await.unwrap().is_empty());
}

#[tokio::test]
async fn fake_destroy_missing_worktree_errors() {
    let vcs = FakeVcsAdapter::new();
    let repo = std::path::Path::new("/repo");
    let err = vcs.destroy(repo, std::path::Path::new("/repo/.grove-worktrees/missing")).await.unwrap_err();
    assert!(matches!(err, VcsError::NotFound(_)));
}

#[test]
fn parses_porcelain_output() {
    let text = "worktree /repo\nHEAD abc123\nbranch refs/heads/main\n\nworktree /repo/.grove-worktrees/feature\nHEAD def456\nbranch refs/heads/feature\n\n";
    let entries = parse_porcelain(text);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].branch.as_deref(), Some("main"));
    assert_eq!(entries[1].name, "feature");
    assert_eq!(entries[1].branch.as_deref(), Some("feature"));
}
