pub mod config;
pub mod logging;

pub mod driver;
pub mod fetch;
pub mod media;
pub mod pacing;
pub mod page;
pub mod render;
pub mod storage;
pub mod summary;
pub mod thread_list;
pub mod title;
