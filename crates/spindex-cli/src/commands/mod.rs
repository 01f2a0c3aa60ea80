pub mod auth;
pub mod completions;
pub mod config;
pub mod recommend;
pub mod search;
pub mod sync;
pub mod vertical;
