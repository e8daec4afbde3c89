//! Command implementations for orderx-cli

pub mod check;
pub mod config;
pub mod template;

pub use check::run_check;
pub use config::run_config_show;
pub use template::run_template_render;
