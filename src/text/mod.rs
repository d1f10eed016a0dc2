// Text handling: cleaning, keyword matching, sentiment and labeling.

pub mod clean;
pub mod keywords;
pub mod label;
pub mod sentiment;
