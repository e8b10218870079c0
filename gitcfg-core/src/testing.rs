//! Local repository fixtures shared by the unit tests

use std::path::Path;

use git2::{Oid, Repository, RepositoryInitOptions, Signature};

/// Initialize a repository whose first branch is `master`
pub fn init_repo(path: &Path) -> Repository {
    let mut options = RepositoryInitOptions::new();
    options.initial_head("master");
    Repository::init_opts(path, &options).unwrap()
}

/// Write `contents` to `name` and commit it on the current branch
pub fn commit_file(repo: &Repository, name: &str, contents: &str, message: &str) -> Oid {
    let root = repo.workdir().unwrap();
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let signature = Signature::now("gitcfg", "gitcfg@example.test").unwrap();
    let parent = repo.head().ok().map(|head| head.peel_to_commit().unwrap());
    let parents: Vec<_> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}

/// Create a branch at the current HEAD without switching to it
pub fn branch_here(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch(name, &head, false).unwrap();
}

/// Switch the working tree and HEAD to an existing local branch
pub fn switch_branch(repo: &Repository, name: &str) {
    let refname = format!("refs/heads/{}", name);
    let commit = repo
        .find_reference(&refname)
        .unwrap()
        .peel_to_commit()
        .unwrap();
    let mut builder = git2::build::CheckoutBuilder::new();
    builder.force();
    repo.checkout_tree(commit.as_object(), Some(&mut builder))
        .unwrap();
    repo.set_head(&refname).unwrap();
}

/// Tag the current HEAD
pub fn tag_here(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel(git2::ObjectType::Commit).unwrap();
    repo.tag_lightweight(name, &head, false).unwrap();
}

/// Path of `repo` as a clone url
pub fn url_of(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
