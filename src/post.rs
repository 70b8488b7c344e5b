use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A single post in a thread. `no` is unique within its thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub no: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub time: i64,
}

impl Post {
    pub fn new<S: Into<String>>(id: S, no: i64) -> Self {
        Self {
            id: id.into(),
            no,
            name: String::new(),
            subject: String::new(),
            comment: String::new(),
            time: 0,
        }
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = subject.into();
        self
    }

    /// Subject if present, otherwise the first line of the comment.
    pub fn headline(&self) -> &str {
        let subject = self.subject.trim();
        if !subject.is_empty() {
            return subject;
        }
        self.comment.lines().next().unwrap_or("").trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadableMode {
    #[default]
    Thread,
    Catalog,
}

/// What is being viewed. Only the mode matters to the list: a thread gets a
/// trailing status row, a catalog does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Loadable {
    pub mode: LoadableMode,
}

impl Loadable {
    pub fn thread() -> Self {
        Self {
            mode: LoadableMode::Thread,
        }
    }

    pub fn catalog() -> Self {
        Self {
            mode: LoadableMode::Catalog,
        }
    }

    pub fn is_thread_mode(&self) -> bool {
        self.mode == LoadableMode::Thread
    }
}

#[derive(Debug, Clone, Default)]
pub struct Thread {
    pub loadable: Loadable,
    pub posts: Vec<Arc<Post>>,
}

impl Thread {
    pub fn new(loadable: Loadable, posts: Vec<Post>) -> Self {
        Self {
            loadable,
            posts: posts.into_iter().map(Arc::new).collect(),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct RawThread {
    #[serde(default)]
    pub(crate) mode: Option<LoadableMode>,
    #[serde(default)]
    pub(crate) posts: Vec<Post>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_prefers_subject() {
        let post = Post::new("a", 1)
            .with_subject("  Subject ")
            .with_comment("first\nsecond");
        assert_eq!(post.headline(), "Subject");
    }

    #[test]
    fn headline_falls_back_to_first_comment_line() {
        let post = Post::new("a", 1).with_comment("first line\nsecond");
        assert_eq!(post.headline(), "first line");
        assert_eq!(Post::new("b", 2).headline(), "");
    }

    #[test]
    fn decodes_posts_with_missing_optional_fields() {
        let raw: RawThread =
            serde_json::from_str(r#"{"posts":[{"id":"x","no":7,"comment":"hi"}]}"#).unwrap();
        assert!(raw.mode.is_none());
        assert_eq!(raw.posts.len(), 1);
        assert_eq!(raw.posts[0].no, 7);
        assert_eq!(raw.posts[0].name, "");
    }

    #[test]
    fn loadable_mode_controls_thread_mode() {
        assert!(Loadable::thread().is_thread_mode());
        assert!(!Loadable::catalog().is_thread_mode());
        assert!(Loadable::default().is_thread_mode());
    }
}
