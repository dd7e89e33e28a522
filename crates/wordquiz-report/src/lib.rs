//! wordquiz-report: Result export.
//!
//! Turns a finished quiz's answer log into a CSV download or a standalone
//! HTML results page.

pub mod csv;
pub mod html;

pub use csv::{export_csv, export_filename, write_csv_report};
pub use html::{generate_html, write_html_report};
