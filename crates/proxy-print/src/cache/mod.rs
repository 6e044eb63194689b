//! Derived-artifact cache
//!
//! - Variant directories (plain, bleed, vibrance, both)
//! - Cropping passes that keep them in step with the image root
//! - The persistent preview cache

mod crop;
mod previews;
mod variants;

pub use crop::*;
pub use previews::*;
pub use variants::*;
