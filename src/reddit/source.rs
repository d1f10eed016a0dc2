// Content source trait.
//
// The collector only needs "recent posts of a community" and "a few comments
// of a post". Tests drive it with an in-memory source.

use anyhow::Result;
use async_trait::async_trait;

use super::client::RedditClient;
use super::posts::{fetch_new_posts, fetch_top_comments};
use crate::models::RawItem;

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// The most recent posts of `source`, newest first, at most `limit`.
    async fn fetch_recent(&self, source: &str, limit: usize) -> Result<Vec<RawItem>>;

    /// Up to `limit` top-level comment bodies. Sources without comments
    /// keep the default.
    async fn fetch_comments(&self, _item: &RawItem, _limit: usize) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

pub struct RedditSource {
    client: RedditClient,
}

impl RedditSource {
    pub fn new(client: RedditClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentSource for RedditSource {
    async fn fetch_recent(&self, source: &str, limit: usize) -> Result<Vec<RawItem>> {
        fetch_new_posts(&self.client, source, limit).await
    }

    async fn fetch_comments(&self, item: &RawItem, limit: usize) -> Result<Vec<String>> {
        fetch_top_comments(&self.client, &item.permalink, limit).await
    }
}
