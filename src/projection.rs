//! Maps a thread's posts to list rows.
//!
//! [`ListProjection`] keeps the full post list of the last load (the source
//! list) and the subset actually shown (the display list). A thread view also
//! gets one trailing status row after the posts, which shows load errors and
//! doubles as the trigger for fetching more posts.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{GrowthCallback, ThreadSource, ViewRenderer};
use crate::post::{Post, Thread};

/// Stable id reported for the trailing status row.
pub const STATUS_ROW_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostViewMode {
    #[default]
    List,
    Card,
}

/// The single criterion used to mark one post as highlighted.
#[derive(Debug, Clone, Default)]
pub enum Highlight {
    #[default]
    None,
    Post(Arc<Post>),
    Id(String),
    No(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Post,
    Status,
}

#[derive(Debug, Clone)]
pub enum Row {
    Post {
        post: Arc<Post>,
        highlighted: bool,
        view_mode: PostViewMode,
    },
    Status {
        error: Option<String>,
    },
}

pub struct ListProjection {
    thread_source: Arc<dyn ThreadSource>,
    growth: Arc<dyn GrowthCallback>,
    renderer: Arc<dyn ViewRenderer>,

    source: Vec<Arc<Post>>,
    display: Vec<Arc<Post>>,
    filtering: bool,
    filter: HashSet<i64>,
    highlight: Highlight,
    last_post_count: usize,
    error: Option<String>,
    view_mode: PostViewMode,
}

impl ListProjection {
    pub fn new(
        thread_source: Arc<dyn ThreadSource>,
        growth: Arc<dyn GrowthCallback>,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Self {
        Self {
            thread_source,
            growth,
            renderer,
            source: Vec::new(),
            display: Vec::new(),
            filtering: false,
            filter: HashSet::new(),
            highlight: Highlight::None,
            last_post_count: 0,
            error: None,
            view_mode: PostViewMode::default(),
        }
    }

    /// Pulls the current posts from the thread source.
    pub fn reload(&mut self) {
        let posts = self.thread_source.posts();
        self.replace_source(posts);
    }

    pub fn set_thread(&mut self, thread: &Thread) {
        self.replace_source(thread.posts.clone());
    }

    /// Replaces every post. An active filter is applied again to the new
    /// posts, so the display list never holds posts from an older load.
    pub fn replace_source(&mut self, posts: Vec<Arc<Post>>) {
        self.show_error(None);
        self.source = posts;

        if self.filtering {
            self.rebuild_filtered();
        } else {
            self.display = self.source.clone();
        }

        tracing::debug!(
            posts = self.source.len(),
            shown = self.display.len(),
            filtering = self.filtering,
            "source list replaced"
        );
        self.renderer.data_set_changed();
    }

    /// Shows only the posts whose `no` matches one of `allowed`.
    pub fn apply_filter(&mut self, allowed: &[Arc<Post>]) {
        self.filtering = true;
        self.filter = allowed.iter().map(|post| post.no).collect();
        self.rebuild_filtered();

        tracing::debug!(
            allowed = self.filter.len(),
            shown = self.display.len(),
            "filter applied"
        );
        self.renderer.data_set_changed();
    }

    fn rebuild_filtered(&mut self) {
        self.display = self
            .source
            .iter()
            .filter(|post| self.filter.contains(&post.no))
            .cloned()
            .collect();
    }

    pub fn clear_filter(&mut self) {
        if !self.filtering {
            return;
        }
        self.filtering = false;
        self.filter.clear();
        self.display = self.source.clone();

        tracing::debug!(shown = self.display.len(), "filter cleared");
        self.renderer.data_set_changed();
    }

    pub fn highlight_post(&mut self, post: &Arc<Post>) {
        self.set_highlight(Highlight::Post(Arc::clone(post)));
    }

    pub fn highlight_post_id<S: Into<String>>(&mut self, id: S) {
        self.set_highlight(Highlight::Id(id.into()));
    }

    pub fn highlight_post_no(&mut self, no: i64) {
        self.set_highlight(Highlight::No(no));
    }

    fn set_highlight(&mut self, highlight: Highlight) {
        tracing::debug!(?highlight, "highlight changed");
        self.highlight = highlight;
        self.renderer.data_set_changed();
    }

    pub fn is_highlighted(&self, post: &Arc<Post>) -> bool {
        match &self.highlight {
            Highlight::None => false,
            Highlight::Post(target) => Arc::ptr_eq(target, post),
            Highlight::Id(id) => post.id == *id,
            Highlight::No(no) => post.no == *no,
        }
    }

    /// Forgets the highlight and the growth bookkeeping. Posts and the filter
    /// stay until the next load.
    pub fn reset(&mut self) {
        self.highlight = Highlight::None;
        self.last_post_count = 0;
    }

    /// Stores the error shown on the status row and pushes it to the row if
    /// it is currently part of the list.
    pub fn show_error(&mut self, error: Option<String>) {
        self.error = error;
        if self.shows_status_row() {
            self.renderer.status_changed(self.error.as_deref());
        }
    }

    /// Called whenever the status row is displayed. Signals the growth callback
    /// once for every increase of the source list, never while filtering.
    pub fn on_trailing_row_bound(&mut self) {
        if self.filtering {
            return;
        }
        let count = self.source.len();
        if count > self.last_post_count {
            self.last_post_count = count;
            tracing::debug!(posts = count, "reached end of loaded posts");
            self.growth.on_list_scrolled_to_bottom();
        } else if count < self.last_post_count {
            self.last_post_count = count;
        }
    }

    pub fn row_count(&self) -> usize {
        if self.shows_status_row() {
            self.display.len() + 1
        } else {
            self.display.len()
        }
    }

    pub fn row_kind(&self, position: usize) -> RowKind {
        if self.shows_status_row() && position == self.display.len() {
            RowKind::Status
        } else {
            RowKind::Post
        }
    }

    /// Stable id of a row: the post `no`, or [`STATUS_ROW_ID`].
    pub fn item_id(&self, position: usize) -> Option<i64> {
        match self.row_kind(position) {
            RowKind::Status => Some(STATUS_ROW_ID),
            RowKind::Post => self.display.get(position).map(|post| post.no),
        }
    }

    pub fn bind_row(&mut self, position: usize) -> Option<Row> {
        match self.row_kind(position) {
            RowKind::Post => {
                let post = self.display.get(position)?;
                Some(Row::Post {
                    post: Arc::clone(post),
                    highlighted: self.is_highlighted(post),
                    view_mode: self.view_mode,
                })
            }
            RowKind::Status => {
                self.on_trailing_row_bound();
                Some(Row::Status {
                    error: self.error.clone(),
                })
            }
        }
    }

    pub fn set_post_view_mode(&mut self, mode: PostViewMode) {
        self.view_mode = mode;
    }

    pub fn source(&self) -> &[Arc<Post>] {
        &self.source
    }

    pub fn display(&self) -> &[Arc<Post>] {
        &self.display
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_post_count(&self) -> usize {
        self.last_post_count
    }

    fn shows_status_row(&self) -> bool {
        self.thread_source.is_thread_mode()
    }
}
