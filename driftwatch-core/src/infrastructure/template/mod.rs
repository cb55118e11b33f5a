pub mod jinja;

pub use jinja::{JinjaRenderer, REPORT_TEMPLATE};
