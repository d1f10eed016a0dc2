// Innomine: developer pain-point mining from Reddit
//
// This is the library root. Each module corresponds to a stage or a shared
// layer of the collect → label → rank → topics → cluster pipeline.

pub mod cluster;
pub mod config;
pub mod insights;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod reddit;
pub mod scoring;
pub mod status;
pub mod store;
pub mod text;
pub mod topics;
