pub mod api;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod normalize;
pub mod render;
