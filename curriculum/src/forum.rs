//! Local community forum board.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::persistence::{load_json, save_json, KeyValueStore, StorageKeys};
use crate::types::generate_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ForumReply {
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ForumPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<ForumReply>,
    #[serde(default)]
    pub likes: u32,
}

fn seed_posts() -> Vec<ForumPost> {
    let now = Utc::now();
    vec![
        ForumPost {
            id: "1".to_string(),
            title: "Best resources for Python basics?".to_string(),
            content: "I just started the Python path. Anyone have extra exercises?".to_string(),
            author: "Alice".to_string(),
            created_at: now - Duration::days(1),
            replies: Vec::new(),
            likes: 3,
        },
        ForumPost {
            id: "2".to_string(),
            title: "How long did it take you to finish Web Dev?".to_string(),
            content: "I am struggling with CSS Grid. Just wondering!".to_string(),
            author: "Bob".to_string(),
            created_at: now - Duration::days(2),
            replies: Vec::new(),
            likes: 5,
        },
    ]
}

/// Forum posts, newest first, written through on every change.
pub struct ForumBoard {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    posts: Vec<ForumPost>,
}

impl ForumBoard {
    /// Load the board, seeding it with welcome posts the first time.
    ///
    /// Only an absent key is seeded. Unreadable data leaves the board empty
    /// and the stored value untouched until the next post or reply.
    pub fn open(storage: Arc<dyn KeyValueStore>, keys: &StorageKeys) -> Self {
        let key = keys.forum();
        let posts = match storage.get(&key) {
            Ok(None) => {
                debug!(key = %key, "Seeding forum board");
                let seeds = seed_posts();
                save_json(storage.as_ref(), &key, &seeds);
                seeds
            }
            _ => load_json::<Vec<ForumPost>>(storage.as_ref(), &key).unwrap_or_default(),
        };

        Self { storage, key, posts }
    }

    pub fn posts(&self) -> &[ForumPost] {
        &self.posts
    }

    pub fn post(&self, post_id: &str) -> Option<&ForumPost> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    /// Publish a new post. Blank titles or bodies are rejected.
    pub fn create_post(
        &mut self,
        title: &str,
        content: &str,
        author: &str,
    ) -> Option<&ForumPost> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return None;
        }

        let post = ForumPost {
            id: generate_id("post"),
            title: title.to_string(),
            content: content.to_string(),
            author: author.to_string(),
            created_at: Utc::now(),
            replies: Vec::new(),
            likes: 0,
        };
        debug!(post_id = %post.id, "Created forum post");

        self.posts.insert(0, post);
        self.persist();
        self.posts.first()
    }

    /// Reply to a post. Blank replies and unknown posts are rejected.
    pub fn reply(&mut self, post_id: &str, content: &str, author: &str) -> Option<&ForumReply> {
        if content.trim().is_empty() {
            return None;
        }

        let index = self.posts.iter().position(|p| p.id == post_id)?;
        self.posts[index].replies.push(ForumReply {
            id: generate_id("reply"),
            content: content.to_string(),
            author: author.to_string(),
            created_at: Utc::now(),
        });
        self.persist();
        self.posts[index].replies.last()
    }

    fn persist(&self) {
        save_json(self.storage.as_ref(), &self.key, &self.posts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn board(storage: &Arc<MemoryStorage>) -> ForumBoard {
        ForumBoard::open(storage.clone(), &StorageKeys::default())
    }

    #[test]
    fn test_first_open_seeds_board() {
        let storage = Arc::new(MemoryStorage::new());
        let board = board(&storage);

        assert_eq!(board.posts().len(), 2);
        assert!(storage.get("pathfinder_forum").unwrap().is_some());
    }

    #[test]
    fn test_malformed_board_is_not_reseeded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("pathfinder_forum", "{not json").unwrap();

        let board = board(&storage);

        assert!(board.posts().is_empty());
        assert_eq!(storage.get("pathfinder_forum").unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_create_post_newest_first() {
        let storage = Arc::new(MemoryStorage::new());
        let mut board = board(&storage);

        let id = board
            .create_post("Stuck on lifetimes", "Any tips for Lab 102?", "You")
            .unwrap()
            .id
            .clone();

        assert_eq!(board.posts()[0].id, id);
        assert_eq!(board.posts().len(), 3);
    }

    #[test]
    fn test_blank_posts_rejected() {
        let storage = Arc::new(MemoryStorage::new());
        let mut board = board(&storage);

        assert!(board.create_post("  ", "body", "You").is_none());
        assert!(board.create_post("title", "", "You").is_none());
        assert_eq!(board.posts().len(), 2);
    }

    #[test]
    fn test_reply_persists() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut board = board(&storage);
            assert!(board.reply("1", "Try the exercism track.", "You").is_some());
            assert!(board.reply("1", " ", "You").is_none());
            assert!(board.reply("missing", "hello", "You").is_none());
        }

        let board = board(&storage);
        assert_eq!(board.post("1").unwrap().replies.len(), 1);
        assert_eq!(board.post("1").unwrap().replies[0].content, "Try the exercism track.");
    }
}
