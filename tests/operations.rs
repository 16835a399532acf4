//! Integration tests for impure bound-path operations against the in-memory
//! accessor: queries, mutation, I/O and the local filesystem bridge.

mod common;

use anypath::*;
use common::{MemFs, backend};
use std::io::Write;

// =============================================================================
// Queries
// =============================================================================

#[test]
fn kind_tests_follow_symlinks() {
    let (b, fs) = backend();
    fs.add_file("/docs/readme.md", b"# hi");
    fs.add_symlink("/latest", "/docs");

    assert!(b.path("/docs").is_dir().unwrap());
    assert!(b.path("/latest").is_dir().unwrap());
    assert!(b.path("/latest").is_symlink().unwrap());
    assert!(!b.path("/docs").is_symlink().unwrap());
    assert!(b.path("/latest/readme.md").is_file().unwrap());
    assert!(!b.path("/docs/readme.md").is_fifo().unwrap());
    assert!(!b.path("/docs/readme.md").is_socket().unwrap());
}

#[test]
fn missing_paths_are_false_not_errors() {
    let (b, fs) = backend();
    fs.add_file("/file.txt", b"");
    assert!(!b.path("/nope").exists().unwrap());
    assert!(!b.path("/nope/deeper").is_file().unwrap());
    assert!(!b.path("/file.txt/child").exists().unwrap());
    assert!(!b.path("/nope").is_block_device().unwrap());
    assert!(b.path("/nope").stat().unwrap_err().is_not_found());
}

#[test]
fn iterdir_and_scandir_list_children() {
    let (b, fs) = backend();
    fs.add_file("/dir/a.txt", b"aa");
    fs.add_dir("/dir/sub");
    fs.add_symlink("/dir/link", "/dir/a.txt");

    let mut names: Vec<String> = b
        .path("/dir")
        .iterdir()
        .unwrap()
        .map(|p| p.unwrap().name().to_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["a.txt", "link", "sub"]);

    let entries = b.path("/dir").scandir().unwrap();
    let link = entries.iter().find(|e| e.path.name() == "link").unwrap();
    assert!(link.stat.is_symlink());
    let file = entries.iter().find(|e| e.path.name() == "a.txt").unwrap();
    assert_eq!(file.stat.size, 2);

    assert!(matches!(
        b.path("/dir/a.txt").iterdir(),
        Err(PathError::NotADirectory { .. })
    ));
}

#[test]
fn readlink_returns_stored_target() {
    let (b, fs) = backend();
    fs.add_dir("/real");
    fs.add_symlink("/rel", "real");
    assert_eq!(b.path("/rel").readlink().unwrap().to_string(), "real");
    assert!(matches!(
        b.path("/real").readlink(),
        Err(PathError::NotASymlink { .. })
    ));
}

#[test]
fn owner_and_group_come_from_stat() {
    let (b, fs) = backend();
    fs.add_file("/f", b"");
    assert_eq!(b.path("/f").owner().unwrap(), "tester");
    assert_eq!(b.path("/f").group().unwrap(), "staff");
}

#[test]
fn samefile_uses_entry_ids() {
    let (b, fs) = backend();
    fs.add_file("/a", b"1");
    fs.add_file("/b", b"1");
    let a = b.path("/a");
    b.path("/hard").hardlink_to(&a).unwrap();
    b.path("/soft").symlink_to("/a").unwrap();

    assert!(a.samefile("/hard").unwrap());
    assert!(a.samefile(b.path("/soft")).unwrap());
    assert!(!a.samefile("/b").unwrap());
    assert_eq!(a.stat().unwrap().nlink, 2);
}

// =============================================================================
// Path computation
// =============================================================================

#[test]
fn absolute_and_expanduser() {
    let fs = MemFs::new().with_cwd("/work");
    let b = Backend::new(fs.clone());
    assert_eq!(b.path("notes.txt").absolute().unwrap().to_string(), "/work/notes.txt");
    assert_eq!(b.paths().cwd().unwrap().to_string(), "/work");
    assert_eq!(b.paths().home().unwrap().to_string(), "/home/tester");
    assert_eq!(b.path("~/x").expanduser().unwrap().to_string(), "/home/tester/x");
    assert_eq!(b.path("~bob/x").expanduser().unwrap().to_string(), "/home/bob/x");
    assert_eq!(b.path("/~/x").expanduser().unwrap().to_string(), "/~/x");
}

#[test]
fn relative_paths_use_the_session_cwd() {
    let fs = MemFs::new().with_cwd("/work");
    fs.add_dir("/work");
    let b = Backend::new(fs.clone());
    b.path("notes.txt").write_text("relative").unwrap();
    assert_eq!(b.path("/work/notes.txt").read_text().unwrap(), "relative");
}

// =============================================================================
// Mutation
// =============================================================================

#[test]
fn mkdir_respects_parents_and_exist_ok() {
    let (b, _) = backend();
    let deep = b.path("/a/b/c");

    assert!(deep.mkdir(MkdirOptions::new()).unwrap_err().is_not_found());
    deep.mkdir(MkdirOptions::new().parents(true)).unwrap();
    assert!(b.path("/a/b").is_dir().unwrap());
    assert!(deep.is_dir().unwrap());

    assert!(matches!(
        deep.mkdir(MkdirOptions::new()),
        Err(PathError::AlreadyExists { .. })
    ));
    deep.mkdir(MkdirOptions::new().exist_ok(true)).unwrap();
    deep.mkdir(MkdirOptions::new().parents(true).exist_ok(true)).unwrap();
}

#[test]
fn mkdir_exist_ok_still_rejects_files() {
    let (b, fs) = backend();
    fs.add_file("/taken", b"");
    assert!(matches!(
        b.path("/taken").mkdir(MkdirOptions::new().exist_ok(true)),
        Err(PathError::AlreadyExists { .. })
    ));
}

#[test]
fn mkdir_applies_mode() {
    let (b, _) = backend();
    let d = b.path("/private");
    d.mkdir(MkdirOptions::new().mode(0o700)).unwrap();
    assert_eq!(d.stat().unwrap().permissions.mode(), 0o700);
}

#[test]
fn touch_creates_and_respects_exist_ok() {
    let (b, _) = backend();
    let f = b.path("/empty");
    f.touch(TouchOptions::default()).unwrap();
    assert!(f.is_file().unwrap());
    assert_eq!(f.stat().unwrap().size, 0);
    f.touch(TouchOptions::default()).unwrap();
    assert!(matches!(
        f.touch(TouchOptions::new().exist_ok(false)),
        Err(PathError::AlreadyExists { .. })
    ));
}

#[test]
fn unlink_and_rmdir_check_kinds() {
    let (b, fs) = backend();
    fs.add_file("/d/f", b"");
    let (d, f) = (b.path("/d"), b.path("/d/f"));

    assert!(matches!(d.unlink(false), Err(PathError::IsADirectory { .. })));
    assert!(matches!(f.rmdir(), Err(PathError::NotADirectory { .. })));
    assert!(matches!(d.rmdir(), Err(PathError::DirectoryNotEmpty { .. })));

    f.unlink(false).unwrap();
    assert!(!f.exists().unwrap());
    assert!(f.unlink(false).unwrap_err().is_not_found());
    f.unlink(true).unwrap();
    d.rmdir().unwrap();
    assert!(!d.exists().unwrap());
}

#[test]
fn rmtree_removes_everything_below() {
    let (b, fs) = backend();
    fs.add_file("/tree/a/b/c.txt", b"c");
    fs.add_file("/tree/top.txt", b"t");
    fs.add_file("/outside/keep.txt", b"k");
    fs.add_symlink("/tree/a/escape", "/outside");

    b.path("/tree").rmtree().unwrap();
    assert!(!b.path("/tree").exists().unwrap());
    assert_eq!(b.path("/outside/keep.txt").read_text().unwrap(), "k");
    assert!(matches!(
        b.path("/outside/keep.txt").rmtree(),
        Err(PathError::NotADirectory { .. })
    ));
}

#[test]
fn rename_refuses_and_replace_clobbers() {
    let (b, fs) = backend();
    fs.add_file("/old", b"old");
    fs.add_file("/other", b"other");

    let src = b.path("/old");
    assert!(matches!(
        src.rename("/other"),
        Err(PathError::AlreadyExists { .. })
    ));

    let moved = src.rename("/new").unwrap();
    assert_eq!(moved, b.path("/new"));
    assert!(!src.exists().unwrap());
    assert_eq!(moved.read_text().unwrap(), "old");

    let replaced = moved.replace("/other").unwrap();
    assert_eq!(replaced.read_text().unwrap(), "old");
    assert!(!b.path("/new").exists().unwrap());
}

#[test]
fn rename_moves_whole_directories() {
    let (b, fs) = backend();
    fs.add_file("/src/pkg/lib.rs", b"fn main() {}");
    b.path("/src").rename("/dst").unwrap();
    assert!(b.path("/dst/pkg/lib.rs").is_file().unwrap());
    assert!(!b.path("/src").exists().unwrap());
}

#[test]
fn chmod_follows_and_lchmod_does_not() {
    let (b, fs) = backend();
    fs.add_file("/target", b"");
    fs.add_symlink("/link", "/target");
    let link = b.path("/link");

    link.chmod(0o600).unwrap();
    assert_eq!(b.path("/target").stat().unwrap().permissions.mode(), 0o600);
    assert_eq!(link.lstat().unwrap().permissions.mode(), 0o777);

    link.lchmod(0o700).unwrap();
    assert_eq!(link.lstat().unwrap().permissions.mode(), 0o700);
    assert_eq!(b.path("/target").stat().unwrap().permissions.mode(), 0o600);
}

// =============================================================================
// I/O
// =============================================================================

#[test]
fn text_round_trip() {
    let (b, _) = backend();
    let p = b.path("/hello.txt");
    p.write_text("hello").unwrap();
    assert_eq!(p.read_text().unwrap(), "hello");
    p.write_bytes(b"bye").unwrap();
    assert_eq!(p.read_bytes().unwrap(), b"bye");
    assert_eq!(p.stat().unwrap().size, 3);
}

#[test]
fn append_keeps_existing_contents() {
    let (b, fs) = backend();
    fs.add_file("/log", b"one\n");
    let mut handle = b.path("/log").open(OpenMode::parse("a").unwrap()).unwrap();
    assert!(handle.is_writable());
    assert!(!handle.is_readable());
    handle.write_all(b"two\n").unwrap();
    handle.close().unwrap();
    assert_eq!(b.path("/log").read_text().unwrap(), "one\ntwo\n");
}

#[test]
fn exclusive_open_refuses_existing() {
    let (b, fs) = backend();
    fs.add_file("/x", b"");
    assert!(matches!(
        b.path("/x").open(OpenMode::CREATE_NEW),
        Err(PathError::AlreadyExists { .. })
    ));
}

#[test]
fn writes_through_symlinks_land_on_the_target() {
    let (b, fs) = backend();
    fs.add_file("/data/real.txt", b"before");
    fs.add_symlink("/alias", "/data/real.txt");
    b.path("/alias").write_text("after").unwrap();
    assert_eq!(b.path("/data/real.txt").read_text().unwrap(), "after");
    assert!(b.path("/alias").is_symlink().unwrap());
}

#[test]
fn io_errors_keep_their_kind() {
    let (b, fs) = backend();
    fs.add_dir("/dir");
    fs.add_file("/bin", &[0xff, 0xfe, 0x00]);
    assert!(matches!(b.path("/dir").read_text(), Err(PathError::IsADirectory { .. })));
    assert!(matches!(b.path("/bin").read_text(), Err(PathError::InvalidData { .. })));
    assert!(b.path("/missing/f").write_text("x").unwrap_err().is_not_found());
}

// =============================================================================
// Local filesystem bridge
// =============================================================================

#[test]
fn upload_falls_back_to_streaming() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("in.txt");
    std::fs::write(&local, "from disk").unwrap();

    let (b, _) = backend();
    let remote = b.path("/in.txt");
    remote.upload_from(&local).unwrap();
    assert_eq!(remote.read_text().unwrap(), "from disk");
}

#[test]
fn download_falls_back_to_streaming() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("out.txt");

    let (b, fs) = backend();
    fs.add_file("/out.txt", b"to disk");
    b.path("/out.txt").download_to(&local).unwrap();
    assert_eq!(std::fs::read_to_string(&local).unwrap(), "to disk");
}

#[test]
fn local_bridge_reports_local_failures() {
    let dir = tempfile::tempdir().unwrap();
    let (b, _) = backend();
    let err = b
        .path("/x")
        .upload_from(&dir.path().join("does-not-exist"))
        .unwrap_err();
    assert!(matches!(err, PathError::Io { operation: "upload", .. }));
}

#[test]
fn fspath_downloads_missing_local_copy() {
    let dir = tempfile::tempdir().unwrap();
    let fs = MemFs::new().with_local_root(dir.path().to_path_buf());
    fs.add_file("/f.txt", b"materialised");
    let b = Backend::new(fs.clone());

    let local = b.path("/f.txt").fspath().unwrap();
    assert_eq!(local, dir.path().join("f.txt"));
    assert_eq!(std::fs::read_to_string(&local).unwrap(), "materialised");

    // an existing local copy is returned as is
    std::fs::write(&local, "edited locally").unwrap();
    let again = b.path("/f.txt").fspath().unwrap();
    assert_eq!(std::fs::read_to_string(again).unwrap(), "edited locally");
}

#[test]
fn fsencode_is_answered_by_the_backend() {
    let fs = MemFs::new().with_cwd("/home");
    let b = Backend::new(fs.clone());
    assert_eq!(b.path("/caf\u{e9}.txt").fsencode().unwrap(), "/café.txt".as_bytes());
    assert_eq!(b.path("notes").fsencode().unwrap(), b"/home/notes");

    b.close().unwrap();
    assert!(matches!(
        b.path("/x").fsencode(),
        Err(PathError::BackendClosed { operation: "fsencode", .. })
    ));
}
