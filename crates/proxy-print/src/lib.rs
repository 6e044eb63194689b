pub mod cache;
mod config;
pub mod constants;
pub mod imaging;
mod io;
pub mod layout;
pub mod marks;
mod options;
mod pipeline;
mod progress;
mod project;
pub mod render;
mod stats;
mod types;

pub use config::Config;
pub use io::{load_pdf, save_pdf};
pub use options::*;
pub use pipeline::*;
pub use progress::*;
pub use project::{ScanReport, scan_images};
pub use stats::calculate_statistics;
pub use types::*;
