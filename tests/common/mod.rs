//! In-memory accessor shared by the integration suites.
//!
//! Supports files, directories, symlinks and hard links, and opens files
//! through [`Creator`] the way an archive backend would. It implements
//! neither `upload` nor `download`, so the bound-path fallbacks are used.

#![allow(dead_code)]

use anypath::*;
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

const DEVICE: u64 = 1;

struct State {
    nodes: BTreeMap<PurePath, Stat>,
    blobs: HashMap<u64, Vec<u8>>,
    next_id: u64,
    cwd: PurePath,
    local_root: Option<PathBuf>,
}

/// Cheaply cloneable handle; clones share one tree.
#[derive(Clone)]
pub struct MemFs {
    state: Arc<RwLock<State>>,
    closes: Arc<AtomicUsize>,
}

impl MemFs {
    pub fn new() -> Self {
        let mut root = Stat::directory();
        root.device_id = Some(DEVICE);
        root.file_id = Some(1);
        let mut nodes = BTreeMap::new();
        nodes.insert(PurePath::root_path(), root);
        Self {
            state: Arc::new(RwLock::new(State {
                nodes,
                blobs: HashMap::new(),
                next_id: 2,
                cwd: PurePath::root_path(),
                local_root: None,
            })),
            closes: Arc::default(),
        }
    }

    pub fn with_cwd(self, cwd: &str) -> Self {
        self.state.write().unwrap().cwd = PurePath::new(cwd);
        self
    }

    /// Make `fspath` map entries below `root` on the local disk.
    pub fn with_local_root(self, root: PathBuf) -> Self {
        self.state.write().unwrap().local_root = Some(root);
        self
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Test setup: a directory, creating ancestors.
    pub fn add_dir(&self, path: &str) {
        let path = PurePath::new(path);
        for ancestor in path.parents().collect::<Vec<_>>().into_iter().rev() {
            if !self.state.read().unwrap().nodes.contains_key(&ancestor) {
                self.mkdir(&ancestor, 0o755).unwrap();
            }
        }
        self.mkdir(&path, 0o755).unwrap();
    }

    /// Test setup: a file with contents, creating ancestors.
    pub fn add_file(&self, path: &str, data: &[u8]) {
        let path = PurePath::new(path);
        let parent = path.parent();
        if !self.state.read().unwrap().nodes.contains_key(&parent) {
            self.add_dir(&parent.to_string());
        }
        self.create(&path, &Stat::file(0), Some(&mut Cursor::new(data.to_vec())))
            .unwrap();
    }

    /// Test setup: a symlink.
    pub fn add_symlink(&self, path: &str, target: &str) {
        self.symlink(&PurePath::new(path), &PurePath::new(target))
            .unwrap();
    }

    fn abs(&self, path: &PurePath) -> PurePath {
        if path.is_absolute() {
            path.clone()
        } else {
            self.state.read().unwrap().cwd.join(path)
        }
    }

    /// Key of the entry itself: parent resolved, final segment not followed.
    fn locate(&self, path: &PurePath) -> Result<PurePath, PathError> {
        let abs = self.abs(path);
        let name = abs.name().to_owned();
        if name.is_empty() || name == ".." {
            return self.resolve(&abs, true);
        }
        let parent = self.resolve(&abs.parent(), true)?;
        Ok(parent / name)
    }

    fn node(&self, key: &PurePath, operation: &'static str, path: &PurePath) -> Result<Stat, PathError> {
        self.state
            .read()
            .unwrap()
            .nodes
            .get(key)
            .cloned()
            .ok_or_else(|| PathError::not_found(operation, path))
    }
}

impl AccessorRead for MemFs {
    fn stat(&self, path: &PurePath) -> Result<Stat, PathError> {
        let key = self.resolve(&self.abs(path), true)?;
        self.node(&key, "stat", path)
    }

    fn lstat(&self, path: &PurePath) -> Result<Stat, PathError> {
        let key = self.locate(path)?;
        self.node(&key, "lstat", path)
    }

    fn listdir(&self, path: &PurePath) -> Result<Vec<String>, PathError> {
        let key = self.resolve(&self.abs(path), true)?;
        if !self.node(&key, "listdir", path)?.is_dir() {
            return Err(PathError::not_a_directory("listdir", path));
        }
        let state = self.state.read().unwrap();
        Ok(state
            .nodes
            .keys()
            .filter(|k| **k != key && k.parent() == key)
            .map(|k| k.name().to_owned())
            .collect())
    }

    fn readlink(&self, path: &PurePath) -> Result<PurePath, PathError> {
        let abs = self.abs(path);
        let state = self.state.read().unwrap();
        match state.nodes.get(&abs) {
            Some(stat) => stat
                .target
                .clone()
                .ok_or_else(|| PathError::not_a_symlink("readlink", path)),
            None => match state.nodes.get(&abs.parent()) {
                Some(parent) if !parent.is_dir() => Err(PathError::not_a_directory("readlink", path)),
                _ => Err(PathError::not_found("readlink", path)),
            },
        }
    }
}

impl AccessorWrite for MemFs {
    fn create(&self, path: &PurePath, stat: &Stat, data: Option<&mut dyn Read>) -> Result<(), PathError> {
        let key = self.locate(path)?;
        if !self.node(&key.parent(), "create", path)?.is_dir() {
            return Err(PathError::not_a_directory("create", path));
        }
        let mut bytes = Vec::new();
        if let Some(reader) = data {
            reader.read_to_end(&mut bytes).map_err(|source| PathError::Stream {
                operation: "create",
                path: path.clone(),
                source,
            })?;
        }
        let mut state = self.state.write().unwrap();
        if state.nodes.contains_key(&key) {
            return Err(PathError::already_exists("create", path));
        }
        let id = state.next_id;
        state.next_id += 1;
        let mut stat = stat.clone();
        stat.device_id = Some(DEVICE);
        stat.file_id = Some(id);
        stat.user = Some("tester".into());
        stat.group = Some("staff".into());
        if stat.is_file() {
            stat.size = bytes.len() as u64;
            state.blobs.insert(id, bytes);
        }
        state.nodes.insert(key, stat);
        Ok(())
    }

    fn link(&self, path: &PurePath, target: &PurePath) -> Result<(), PathError> {
        let source = self.resolve(&self.abs(target), true)?;
        if self.node(&source, "link", target)?.is_dir() {
            return Err(PathError::is_a_directory("link", target));
        }
        let key = self.locate(path)?;
        let mut state = self.state.write().unwrap();
        if state.nodes.contains_key(&key) {
            return Err(PathError::already_exists("link", path));
        }
        let mut stat = state.nodes[&source].clone();
        stat.nlink += 1;
        let id = stat.file_id;
        for node in state.nodes.values_mut().filter(|n| n.file_id == id) {
            node.nlink = stat.nlink;
        }
        state.nodes.insert(key, stat);
        Ok(())
    }

    fn chmod(&self, path: &PurePath, mode: u32, follow_symlinks: bool) -> Result<(), PathError> {
        let key = if follow_symlinks {
            self.resolve(&self.abs(path), true)?
        } else {
            self.locate(path)?
        };
        let mut state = self.state.write().unwrap();
        let node = state
            .nodes
            .get_mut(&key)
            .ok_or_else(|| PathError::not_found("chmod", path))?;
        node.permissions = Permissions::from_mode(mode);
        Ok(())
    }

    fn move_entry(&self, src: &PurePath, dst: &PurePath, clobber: bool) -> Result<(), PathError> {
        let from = self.locate(src)?;
        let to = self.locate(dst)?;
        self.node(&from, "move", src)?;
        if to != from && to.is_relative_to(&from) {
            return Err(PathError::backend("move", dst, "cannot move a directory into itself"));
        }
        if let Ok(existing) = self.node(&to, "move", dst) {
            if !clobber {
                return Err(PathError::already_exists("move", dst));
            }
            if existing.is_dir() {
                self.rmdir(&to)?;
            } else {
                self.delete(&to)?;
            }
        }
        let mut state = self.state.write().unwrap();
        let moving: Vec<PurePath> = state
            .nodes
            .keys()
            .filter(|k| k.is_relative_to(&from))
            .cloned()
            .collect();
        for key in moving {
            if let (Some(stat), Ok(rest)) = (state.nodes.remove(&key), key.relative_to(&from)) {
                state.nodes.insert(to.join(rest), stat);
            }
        }
        Ok(())
    }

    fn delete(&self, path: &PurePath) -> Result<(), PathError> {
        let key = self.locate(path)?;
        let mut state = self.state.write().unwrap();
        let doomed: Vec<PurePath> = state
            .nodes
            .keys()
            .filter(|k| k.is_relative_to(&key))
            .cloned()
            .collect();
        if doomed.is_empty() {
            return Err(PathError::not_found("delete", path));
        }
        for k in doomed {
            let Some(stat) = state.nodes.remove(&k) else { continue };
            let id = stat.file_id;
            let survivors = state.nodes.values().filter(|n| n.file_id == id).count() as u64;
            if survivors == 0 {
                if let Some(id) = id {
                    state.blobs.remove(&id);
                }
            }
            for node in state.nodes.values_mut().filter(|n| n.file_id == id) {
                node.nlink = survivors;
            }
        }
        Ok(())
    }
}

impl AccessorIo for MemFs {
    fn open(&self, path: &PurePath, mode: OpenMode) -> Result<FileHandle, PathError> {
        if mode.read && mode.write {
            return Err(PathError::not_supported("open", path));
        }
        if mode.read {
            let key = self.resolve(&self.abs(path), true)?;
            let stat = self.node(&key, "open", path)?;
            if stat.is_dir() {
                return Err(PathError::is_a_directory("open", path));
            }
            let state = self.state.read().unwrap();
            let data = stat
                .file_id
                .and_then(|id| state.blobs.get(&id))
                .cloned()
                .unwrap_or_default();
            return Ok(FileHandle::reader(Cursor::new(data)));
        }
        let target = self.resolve(&self.abs(path), false)?;
        let (stat, contents) = match self.node(&target, "open", path) {
            Ok(existing) if existing.is_dir() => return Err(PathError::is_a_directory("open", path)),
            Ok(_) if mode.exclusive => return Err(PathError::already_exists("open", path)),
            Ok(existing) => {
                let contents = if mode.append {
                    let state = self.state.read().unwrap();
                    existing
                        .file_id
                        .and_then(|id| state.blobs.get(&id))
                        .cloned()
                        .unwrap_or_default()
                } else {
                    Vec::new()
                };
                (Stat::file(0).with_mode(existing.permissions.mode()), contents)
            }
            Err(e) if e.is_not_found() && mode.create => (Stat::file(0), Vec::new()),
            Err(e) => return Err(e),
        };
        let creator = Creator::with_stat(self.clone(), target, stat).with_contents(contents);
        Ok(FileHandle::Write(Box::new(creator)))
    }

    fn fspath(&self, path: &PurePath) -> Result<PathBuf, PathError> {
        let root = self.state.read().unwrap().local_root.clone();
        match root {
            Some(root) => Ok(root.join(self.abs(path).segments().join("/"))),
            None => Err(PathError::not_supported("fspath", path)),
        }
    }

    fn fsencode(&self, path: &PurePath) -> Result<Vec<u8>, PathError> {
        Ok(self.abs(path).to_string().into_bytes())
    }
}

impl AccessorEnv for MemFs {
    fn getcwd(&self) -> Result<PurePath, PathError> {
        Ok(self.state.read().unwrap().cwd.clone())
    }

    fn gethomedir(&self, user: Option<&str>) -> Result<PurePath, PathError> {
        Ok(PurePath::new("/home").join(user.unwrap_or("tester")))
    }

    fn close(&self) -> Result<(), PathError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A backend owning a fresh tree, plus a handle for test setup.
pub fn backend() -> (Backend<MemFs>, MemFs) {
    let fs = MemFs::new();
    (Backend::new(fs.clone()), fs)
}
