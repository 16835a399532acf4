//! Integration tests for symlink resolution and glob traversal.

mod common;

use anypath::*;
use common::backend;
use std::collections::BTreeSet;

fn names<A: Accessor>(glob: Glob<A>) -> BTreeSet<String> {
    glob.map(|p| p.unwrap().to_string()).collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Resolve
// =============================================================================

#[test]
fn resolve_follows_a_chain() {
    let (b, fs) = backend();
    fs.add_dir("/target");
    fs.add_symlink("/c", "/target");
    fs.add_symlink("/b", "/c");
    fs.add_symlink("/a", "/b");

    assert_eq!(b.path("/a").resolve(true).unwrap(), b.path("/target"));
    assert_eq!(b.path("/a").resolve(false).unwrap(), b.path("/target"));
}

#[test]
fn resolve_detects_cycles() {
    let (b, fs) = backend();
    fs.add_symlink("/x", "/y");
    fs.add_symlink("/y", "/x");

    let err = b.path("/x").resolve(false).unwrap_err();
    assert!(matches!(
        err,
        PathError::ResolutionLimitExceeded { limit: MAX_SYMLINK_STEPS, .. }
    ));
    // kind tests treat an unresolvable path as absent
    assert!(!b.path("/x").exists().unwrap());
    assert!(b.path("/x").is_symlink().unwrap());
}

#[test]
fn dot_dot_applies_after_following_links() {
    let (b, fs) = backend();
    fs.add_dir("/deep/nested/dir");
    fs.add_dir("/top");
    fs.add_symlink("/top/link", "/deep/nested/dir");

    assert_eq!(
        b.path("/top/link/..").resolve(true).unwrap(),
        b.path("/deep/nested")
    );
}

#[test]
fn relative_links_resolve_against_their_directory() {
    let (b, fs) = backend();
    fs.add_file("/etc/app/config.toml", b"");
    fs.add_symlink("/etc/current", "app/config.toml");

    assert_eq!(
        b.path("/etc/current").resolve(true).unwrap(),
        b.path("/etc/app/config.toml")
    );
}

#[test]
fn strict_and_lenient_missing_components() {
    let (b, fs) = backend();
    fs.add_dir("/real");
    fs.add_symlink("/alias", "/real");

    assert!(b.path("/alias/missing/file").resolve(true).unwrap_err().is_not_found());
    assert_eq!(
        b.path("/alias/missing/../file").resolve(false).unwrap(),
        b.path("/real/file")
    );
}

#[test]
fn relative_paths_resolve_from_cwd() {
    let fs = common::MemFs::new().with_cwd("/home");
    fs.add_dir("/home/docs");
    let b = Backend::new(fs.clone());
    assert_eq!(b.path("docs").resolve(true).unwrap().to_string(), "/home/docs");
}

// =============================================================================
// Glob
// =============================================================================

fn sample_tree() -> (Backend<common::MemFs>, common::MemFs) {
    let (b, fs) = backend();
    fs.add_file("/a/b.ext", b"");
    fs.add_file("/a/c/d.ext", b"");
    fs.add_file("/x.ext", b"");
    fs.add_file("/a/c/e.txt", b"");
    (b, fs)
}

#[test]
fn recursive_glob_finds_every_match_once() {
    let (b, _) = sample_tree();
    assert_eq!(
        names(b.path("/").glob("**/*.ext").unwrap()),
        set(&["/a/b.ext", "/a/c/d.ext", "/x.ext"])
    );
    assert_eq!(
        names(b.path("/").rglob("*.ext").unwrap()),
        set(&["/a/b.ext", "/a/c/d.ext", "/x.ext"])
    );
}

#[test]
fn glob_below_a_subdirectory() {
    let (b, _) = sample_tree();
    assert_eq!(
        names(b.path("/a").glob("*/*").unwrap()),
        set(&["/a/c/d.ext", "/a/c/e.txt"])
    );
    assert_eq!(names(b.path("/a").glob("c/e.txt").unwrap()), set(&["/a/c/e.txt"]));
    assert!(names(b.path("/a").glob("nope/*").unwrap()).is_empty());
}

#[test]
fn recursive_glob_does_not_follow_symlinked_directories() {
    let (b, fs) = sample_tree();
    fs.add_symlink("/a/loop", "/a");
    assert_eq!(
        names(b.path("/").glob("**/*.ext").unwrap()),
        set(&["/a/b.ext", "/a/c/d.ext", "/x.ext"])
    );
}

#[test]
fn double_star_needs_an_existing_directory_base() {
    let (b, _) = sample_tree();
    assert!(names(b.path("/nope").glob("**").unwrap()).is_empty());
    assert!(names(b.path("/x.ext").glob("**").unwrap()).is_empty());
    assert!(names(b.path("/x.ext").rglob("*").unwrap()).is_empty());
    assert_eq!(names(b.path("/a/c").glob("**").unwrap()), set(&["/a/c"]));
}

#[test]
fn glob_results_are_bound_to_the_same_backend() {
    let (b, _) = sample_tree();
    let root = b.path("/");
    for found in root.glob("**/*").unwrap() {
        assert!(found.unwrap().same_accessor(&root));
    }
}

#[test]
fn absolute_patterns_are_rejected() {
    let (b, _) = sample_tree();
    assert!(matches!(
        b.path("/").glob("/a/*"),
        Err(PathError::InvalidPattern { .. })
    ));
    assert!(matches!(
        b.path("/").rglob("/a"),
        Err(PathError::InvalidPattern { .. })
    ));
}

#[test]
fn glob_sees_changes_made_before_iteration() {
    let (b, fs) = sample_tree();
    let pending = b.path("/").glob("*.ext").unwrap();
    fs.add_file("/y.ext", b"");
    assert_eq!(names(pending), set(&["/x.ext", "/y.ext"]));
}
