#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod config;
pub mod data;
pub mod post;
pub mod projection;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
pub use projection::ListProjection;
