// Reddit access: HTTP client, listing types, and the ContentSource seam.

pub mod client;
pub mod listing;
pub mod posts;
pub mod rate_limiter;
pub mod source;
