pub mod config;
pub mod destination;
pub mod downloader;
pub mod report;
pub mod types;
