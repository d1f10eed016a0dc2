// Serde types for Reddit listing responses.
//
// Everything Reddit returns is a "thing" wrapped as {kind, data}; listings
// are things whose data holds `children` and an `after` cursor.

use serde::Deserialize;

use crate::models::RawItem;

#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
    /// Fullname of the last item, for the next page
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

/// A submission (kind `t3`).
#[derive(Debug, Deserialize)]
pub struct PostData {
    pub subreddit: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub created_utc: f64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub permalink: String,
}

impl PostData {
    pub fn into_raw_item(self) -> RawItem {
        RawItem {
            subreddit: self.subreddit,
            title: self.title,
            text: self.selftext,
            created_utc: self.created_utc,
            url: self.url,
            score: self.score,
            num_comments: self.num_comments,
            comments: Vec::new(),
            permalink: self.permalink,
        }
    }
}

/// A comment (kind `t1`). "more" stubs share the listing but carry no body.
#[derive(Debug, Default, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_new_listing() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "after": "t3_abc",
                "children": [
                    {"kind": "t3", "data": {
                        "subreddit": "rust", "title": "Lifetime error",
                        "selftext": "help", "created_utc": 1700000000.0,
                        "url": "https://www.reddit.com/r/rust/comments/abc/",
                        "score": 12, "num_comments": 3,
                        "permalink": "/r/rust/comments/abc/lifetime_error/",
                        "over_18": false
                    }}
                ]
            }
        }"#;
        let listing: Listing<PostData> = serde_json::from_str(json).unwrap();
        assert_eq!(listing.data.after.as_deref(), Some("t3_abc"));

        let item = listing.data.children.into_iter().next().unwrap().data.into_raw_item();
        assert_eq!(item.title, "Lifetime error");
        assert_eq!(item.text, "help");
        assert_eq!(item.score, 12);
        assert!(item.comments.is_empty());
    }

    #[test]
    fn test_comment_listing_skips_more_stubs() {
        let json = r#"[
            {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {}}]}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {"body": "Try cargo clean"}},
                {"kind": "more", "data": {"count": 4, "children": ["x"]}}
            ]}}
        ]"#;
        let listings: Vec<Listing<CommentData>> = serde_json::from_str(json).unwrap();
        let bodies: Vec<String> = listings[1]
            .data
            .children
            .iter()
            .filter(|c| c.kind == "t1")
            .filter_map(|c| c.data.body.clone())
            .collect();
        assert_eq!(bodies, vec!["Try cargo clean"]);
    }
}
