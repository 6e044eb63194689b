//! Image derivation
//!
//! - Resolution inference, cropping, downsampling and uncropping
//! - 3D color lookup tables for the vibrance bump
//! - Preview renditions for the image cache
//! - File access for source and derived images

mod codec;
mod derive;
mod lut;
mod preview;

pub use codec::*;
pub use derive::*;
pub use lut::Lut3d;
pub use preview::*;
