pub mod batch_downloader;
pub mod image_grabber;
pub mod item_handler;
pub mod strategy;
pub mod wait_group;
