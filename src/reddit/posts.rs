// Subreddit listing and comment retrieval.

use anyhow::{Context, Result};
use tracing::debug;

use super::client::RedditClient;
use super::listing::{CommentData, Listing, PostData};
use crate::models::RawItem;

/// Reddit's page size cap for listings.
const PAGE_SIZE: usize = 100;

/// Fetch up to `limit` of a subreddit's newest posts, newest first, following
/// the `after` cursor across pages.
pub async fn fetch_new_posts(
    client: &RedditClient,
    subreddit: &str,
    limit: usize,
) -> Result<Vec<RawItem>> {
    let path = format!("/r/{subreddit}/new.json");
    let mut posts = Vec::new();
    let mut after: Option<String> = None;

    while posts.len() < limit {
        let page_size = (limit - posts.len()).min(PAGE_SIZE).to_string();
        let mut params: Vec<(&str, &str)> = vec![("limit", &page_size)];
        if let Some(ref cursor) = after {
            params.push(("after", cursor));
        }

        let listing: Listing<PostData> = client
            .get_json(&path, &params)
            .await
            .with_context(|| format!("Failed to fetch r/{subreddit}"))?;

        let page_len = listing.data.children.len();
        let remaining = limit - posts.len();
        posts.extend(
            listing
                .data
                .children
                .into_iter()
                .filter(|thing| thing.kind == "t3")
                .map(|thing| thing.data.into_raw_item())
                .take(remaining),
        );

        debug!(
            subreddit = subreddit,
            page_posts = page_len,
            total_collected = posts.len(),
            "Fetched listing page"
        );

        after = listing.data.after;
        if after.is_none() || page_len == 0 {
            break;
        }
    }

    Ok(posts)
}

/// Fetch up to `limit` top-level comment bodies of a post, best first.
pub async fn fetch_top_comments(
    client: &RedditClient,
    permalink: &str,
    limit: usize,
) -> Result<Vec<String>> {
    if limit == 0 || permalink.is_empty() {
        return Ok(Vec::new());
    }

    let path = format!("{}.json", permalink.trim_end_matches('/'));
    let limit_param = limit.to_string();
    let listings: Vec<Listing<CommentData>> = client
        .get_json(
            &path,
            &[
                ("limit", limit_param.as_str()),
                ("depth", "1"),
                ("sort", "top"),
            ],
        )
        .await
        .with_context(|| format!("Failed to fetch comments for {permalink}"))?;

    // [0] is the post itself, [1] its comment tree
    let comments = listings
        .into_iter()
        .nth(1)
        .map(|listing| {
            listing
                .data
                .children
                .into_iter()
                .filter(|thing| thing.kind == "t1")
                .filter_map(|thing| thing.data.body)
                .filter(|body| !body.trim().is_empty())
                .take(limit)
                .collect()
        })
        .unwrap_or_default();

    Ok(comments)
}
