//! In-memory post store.
//!
//! The store is the single owner of post records. In-flight operations
//! hold only a [`PostId`] and commit results through [`PostStore::update`],
//! which is a silent no-op when the post has since been removed. A reset
//! clears the posts but never the sequence counter, so ids are unique for
//! the lifetime of the process even across resets.

use chrono::Utc;
use genie_types::{GenerationTarget, Post, PostId, TargetKey};

#[derive(Debug, Default)]
pub struct PostStore {
    posts: Vec<Post>,
    next_seq: u64,
}

impl PostStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the placeholder for a freshly-claimed target and return its
    /// id. The placeholder satisfies the target from this moment on, so a
    /// re-plan against the updated store cannot hand the triple out twice.
    pub fn insert_placeholder(
        &mut self,
        target: GenerationTarget,
        persona_text: Option<String>,
        interim: String,
    ) -> PostId {
        self.insert_placeholder_at(
            Utc::now().timestamp_millis(),
            target,
            persona_text,
            interim,
        )
    }

    /// Newest-first by prepending: ordering follows the sequence counter,
    /// not the minted timestamp, so a system-clock regression between
    /// mints cannot reorder posts.
    fn insert_placeholder_at(
        &mut self,
        timestamp_millis: i64,
        target: GenerationTarget,
        persona_text: Option<String>,
        interim: String,
    ) -> PostId {
        self.next_seq += 1;
        let id = PostId::mint(timestamp_millis, self.next_seq, target);
        let post = Post::placeholder(id.clone(), TargetKey::new(target, persona_text), interim);
        self.posts.insert(0, post);
        id
    }

    /// Apply `apply` to the post with the given id. Returns `false` when
    /// no such post exists, which callers treat as a stale result to drop.
    pub fn update(&mut self, id: &PostId, apply: impl FnOnce(&mut Post)) -> bool {
        match self.posts.iter_mut().find(|post| post.id == *id) {
            Some(post) => {
                apply(post);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == *id)
    }

    /// All posts, newest first.
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Number of posts whose text resolved, counting degraded results but
    /// not pending or failed ones.
    #[must_use]
    pub fn generated_text_count(&self) -> usize {
        self.posts
            .iter()
            .filter(|post| post.text.is_ready())
            .count()
    }

    /// Drop all posts. The sequence counter survives so minted ids never
    /// repeat.
    pub fn reset(&mut self) {
        self.posts.clear();
    }
}
