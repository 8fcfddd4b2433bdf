//! Report assembly and rendering.

pub mod builder;
pub mod generator;

pub use builder::{build_report, ReportOptions};
pub use generator::{format_currency, generate_json_report, generate_markdown_report};
