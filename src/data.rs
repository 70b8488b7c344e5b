use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::{Mutex, RwLock};

use crate::post::{Loadable, LoadableMode, Post, RawThread, Thread};

/// Supplies the posts to display and whether the list is showing a thread.
pub trait ThreadSource: Send + Sync {
    fn posts(&self) -> Vec<Arc<Post>>;
    fn is_thread_mode(&self) -> bool;
}

/// Told when the list was scrolled to the end and the thread has grown since
/// the last time that happened.
pub trait GrowthCallback: Send + Sync {
    fn on_list_scrolled_to_bottom(&self);
}

/// Receives refresh signals from the projection. Owns the actual widgets.
pub trait ViewRenderer: Send + Sync {
    fn data_set_changed(&self);
    fn status_changed(&self, _error: Option<&str>) {}
}

#[derive(Debug, thiserror::Error)]
pub enum ThreadLoadError {
    #[error("thread file not found: {0}")]
    NotFound(PathBuf),
    #[error("thread contains duplicate post no {0}")]
    DuplicateNo(i64),
}

pub struct StaticThreadSource {
    thread: RwLock<Thread>,
}

impl StaticThreadSource {
    pub fn new(thread: Thread) -> Self {
        Self {
            thread: RwLock::new(thread),
        }
    }

    pub fn set_posts(&self, posts: Vec<Post>) {
        self.thread.write().posts = posts.into_iter().map(Arc::new).collect();
    }

    pub fn set_loadable(&self, loadable: Loadable) {
        self.thread.write().loadable = loadable;
    }
}

impl ThreadSource for StaticThreadSource {
    fn posts(&self) -> Vec<Arc<Post>> {
        self.thread.read().posts.clone()
    }

    fn is_thread_mode(&self) -> bool {
        self.thread.read().loadable.is_thread_mode()
    }
}

/// Thread read once from a JSON document on disk.
pub struct FileThreadSource {
    path: PathBuf,
    thread: Thread,
}

impl FileThreadSource {
    pub fn open(path: impl Into<PathBuf>, default_mode: LoadableMode) -> Result<Self> {
        let path = path.into();
        let thread = read_thread_file(&path, default_mode)?;
        Ok(Self { path, thread })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ThreadSource for FileThreadSource {
    fn posts(&self) -> Vec<Arc<Post>> {
        self.thread.posts.clone()
    }

    fn is_thread_mode(&self) -> bool {
        self.thread.loadable.is_thread_mode()
    }
}

pub fn read_thread_file(path: &Path, default_mode: LoadableMode) -> Result<Thread> {
    if !path.exists() {
        return Err(ThreadLoadError::NotFound(path.to_path_buf()).into());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read thread file at {}", path.display()))?;
    parse_thread(&data)
        .map(|(mode, posts)| {
            Thread::new(
                Loadable {
                    mode: mode.unwrap_or(default_mode),
                },
                posts,
            )
        })
        .with_context(|| format!("Failed to parse thread file at {}", path.display()))
}

fn parse_thread(data: &str) -> Result<(Option<LoadableMode>, Vec<Post>)> {
    let raw: RawThread = serde_json::from_str(data).context("decode thread json")?;
    let mut seen = std::collections::HashSet::with_capacity(raw.posts.len());
    for post in &raw.posts {
        if !seen.insert(post.no) {
            return Err(ThreadLoadError::DuplicateNo(post.no).into());
        }
    }
    Ok((raw.mode, raw.posts))
}

#[derive(Default)]
pub struct NoopGrowthCallback;

impl GrowthCallback for NoopGrowthCallback {
    fn on_list_scrolled_to_bottom(&self) {}
}

#[derive(Default)]
pub struct CountingGrowthCallback {
    calls: AtomicUsize,
}

impl CountingGrowthCallback {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GrowthCallback for CountingGrowthCallback {
    fn on_list_scrolled_to_bottom(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct NoopRenderer;

impl ViewRenderer for NoopRenderer {
    fn data_set_changed(&self) {}
}

/// Remembers how many refreshes were requested and the last status error pushed.
#[derive(Default)]
pub struct RecordingRenderer {
    refreshes: AtomicUsize,
    status_updates: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

impl RecordingRenderer {
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn status_updates(&self) -> usize {
        self.status_updates.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

impl ViewRenderer for RecordingRenderer {
    fn data_set_changed(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }

    fn status_changed(&self, error: Option<&str>) {
        self.status_updates.fetch_add(1, Ordering::SeqCst);
        *self.last_error.lock() = error.map(str::to_owned);
    }
}
