#![allow(dead_code)]

pub mod media_server;
pub mod static_renderer;
