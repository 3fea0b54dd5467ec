use common::repository::{TestRepository, error_kind, init_repository};
use pretty_assertions::assert_eq;
use twig::errors::TwigError;

mod common;

async fn persisted_index(repo: &TestRepository) -> (Vec<String>, Vec<String>, Vec<String>) {
    let index = repo.repository.index();
    let mut index = index.lock().await;
    index.rehydrate().expect("Failed to load index");

    let keys = |files: &twig::artifacts::index::index_record::FileMap| {
        files.keys().cloned().collect::<Vec<_>>()
    };
    (keys(index.added()), keys(index.removed()), keys(index.tracked()))
}

#[tokio::test]
async fn add_then_rm_of_a_new_file_leaves_no_trace() -> anyhow::Result<()> {
    let mut repo = init_repository().await;
    repo.write("committed.txt", "c");
    repo.commit_all("base").await;
    let before = persisted_index(&repo).await;

    repo.write("scratch.txt", "s");
    repo.add(&["scratch.txt"]).await?;
    repo.rm(&["scratch.txt"]).await?;

    assert_eq!(persisted_index(&repo).await, before);
    assert!(repo.exists("scratch.txt"));

    Ok(())
}

#[tokio::test]
async fn rm_stages_deletion_but_keeps_the_file() -> anyhow::Result<()> {
    let mut repo = init_repository().await;
    repo.write("a.txt", "a");
    repo.commit_all("base").await;

    repo.rm(&["a.txt"]).await?;
    repo.repository.status().await?;

    assert!(repo.exists("a.txt"));
    assert_eq!(
        repo.take_output(),
        "On branch master\n\
         Changes to be committed:\n\
         \tdeleted:    a.txt\n\
         \n\
         Untracked files:\n\
         \ta.txt\n\
         \n"
    );

    Ok(())
}

#[tokio::test]
async fn re_adding_a_removed_file_restores_it_to_tracked() -> anyhow::Result<()> {
    let mut repo = init_repository().await;
    repo.write("a.txt", "a");
    repo.commit_all("base").await;

    repo.rm(&["a.txt"]).await?;
    repo.add(&["a.txt"]).await?;

    let (added, removed, tracked) = persisted_index(&repo).await;
    assert!(added.is_empty());
    assert!(removed.is_empty());
    assert_eq!(tracked, vec!["a.txt"]);

    Ok(())
}

#[tokio::test]
async fn adding_a_directory_stages_every_file_below_it() -> anyhow::Result<()> {
    let mut repo = init_repository().await;
    repo.write("a/1.txt", "1");
    repo.write("a/b/2.txt", "2");
    repo.write("c.txt", "c");

    repo.add(&["a"]).await?;

    let (added, _, _) = persisted_index(&repo).await;
    assert_eq!(added, vec!["a/1.txt", "a/b/2.txt"]);

    Ok(())
}

#[tokio::test]
async fn adding_an_unknown_missing_path_is_not_found() {
    let mut repo = init_repository().await;

    let error = repo.add(&["missing.txt"]).await.unwrap_err();

    assert!(matches!(error_kind(&error), TwigError::NotFound(_)));
}

#[tokio::test]
async fn adding_a_deleted_tracked_file_stages_its_deletion() -> anyhow::Result<()> {
    let mut repo = init_repository().await;
    repo.write("a.txt", "a");
    repo.write("b.txt", "b");
    repo.commit_all("base").await;

    repo.delete("a.txt");
    repo.add(&["a.txt"]).await?;
    repo.repository.commit("drop a").await?;

    let head = repo.head().expect("HEAD has a commit");
    let files = repo.repository.database().commit_files(Some(&head))?;
    assert_eq!(files.keys().cloned().collect::<Vec<_>>(), vec!["b.txt"]);

    Ok(())
}

#[tokio::test]
async fn identical_contents_are_stored_once() -> anyhow::Result<()> {
    let mut repo = init_repository().await;
    repo.write("one.txt", "same");
    repo.write("two.txt", "same");

    repo.add(&["."]).await?;

    let objects = std::fs::read_dir(repo.dir.path().join(".twig").join("objects"))?.count();
    assert_eq!(objects, 1);

    Ok(())
}

#[tokio::test]
async fn unchanged_subtrees_are_not_written_again() -> anyhow::Result<()> {
    let mut repo = init_repository().await;
    repo.write("top.txt", "v1");
    repo.write("dir/nested.txt", "nested");
    let first = repo.commit_all("first").await;
    let objects_dir = repo.dir.path().join(".twig").join("objects");
    let objects_before = std::fs::read_dir(&objects_dir)?.count();

    repo.write("top.txt", "v2");
    let second = repo.commit_all("second").await;

    let subtree_of = |commit| {
        let root = repo.parse_commit(commit).tree_oid().clone();
        let tree = repo.repository.database().parse_tree(&root).unwrap();
        tree.entries()
            .iter()
            .find(|entry| entry.name == "dir")
            .map(|entry| entry.oid.clone())
            .unwrap()
    };
    assert_eq!(subtree_of(&first), subtree_of(&second));

    // new blob, new root tree and the commit record
    let objects_after = std::fs::read_dir(&objects_dir)?.count();
    assert_eq!(objects_after, objects_before + 3);

    Ok(())
}

#[tokio::test]
async fn committing_nothing_is_refused() {
    let mut repo = init_repository().await;
    repo.write("a.txt", "a");
    repo.commit_all("base").await;

    let error = repo.repository.commit("again").await.unwrap_err();

    assert!(matches!(error_kind(&error), TwigError::InvalidState(_)));
}

#[tokio::test]
async fn status_lists_every_kind_of_change() -> anyhow::Result<()> {
    let mut repo = init_repository().await;
    repo.write("edited.txt", "v1");
    repo.write("staged.txt", "v1");
    repo.commit_all("base").await;

    repo.write("edited.txt", "v2");
    repo.write("staged.txt", "v2");
    repo.write("new.txt", "new");
    repo.write("loose/file.txt", "loose");
    repo.add(&["staged.txt", "new.txt"]).await?;

    repo.repository.status().await?;

    assert_eq!(
        repo.take_output(),
        "On branch master\n\
         Changes to be committed:\n\
         \tnew file:   new.txt\n\
         \tmodified:   staged.txt\n\
         \n\
         Changes not staged for commit:\n\
         \tmodified:   edited.txt\n\
         \n\
         Untracked files:\n\
         \tloose/file.txt\n\
         \n"
    );

    Ok(())
}

#[tokio::test]
async fn status_of_a_clean_tree() -> anyhow::Result<()> {
    let mut repo = init_repository().await;
    repo.write("a.txt", "a");
    repo.commit_all("base").await;

    repo.repository.status().await?;

    assert_eq!(
        repo.take_output(),
        "On branch master\nnothing to commit, working tree clean\n"
    );

    Ok(())
}

#[tokio::test]
async fn commands_outside_a_repository_are_not_found() {
    let dir = assert_fs::TempDir::new().expect("Failed to create temp dir");
    let mut repository = twig::areas::repository::Repository::new(
        dir.path(),
        Box::new(std::io::sink()),
        common::repository::test_config(),
    )
    .expect("Failed to open repository");

    let error = repository.status().await.unwrap_err();

    assert!(matches!(error_kind(&error), TwigError::NotFound(_)));
}
