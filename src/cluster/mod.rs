// Document clustering: a 2D layout for display and k-means labels.

pub mod embed;
pub mod kmeans;
