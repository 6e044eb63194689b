//! Derived image variants
//!
//! Every source image is derived into up to four variants: plain, with a
//! kept bleed edge, pushed through the vibrance table, or both. Each lives
//! in its own directory under the crop root so toggling a setting never
//! throws away work.

use crate::constants::VIBRANCE_DIR_NAME;
use crate::options::PrintJob;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    /// No bleed edge, original colors. Always derived; feeds the previews.
    Plain,
    Bleed,
    Vibrance,
    BleedVibrance,
}

impl Variant {
    pub fn has_bleed(self) -> bool {
        matches!(self, Variant::Bleed | Variant::BleedVibrance)
    }

    pub fn has_vibrance(self) -> bool {
        matches!(self, Variant::Vibrance | Variant::BleedVibrance)
    }

    fn from_axes(bleed: bool, vibrance: bool) -> Self {
        match (bleed, vibrance) {
            (false, false) => Variant::Plain,
            (true, false) => Variant::Bleed,
            (false, true) => Variant::Vibrance,
            (true, true) => Variant::BleedVibrance,
        }
    }
}

/// Directory name of a bleed edge variant: the value as a decimal with the
/// point spelled `p`, always with a fractional part (`1` -> `1p0`).
pub fn bleed_dir_name(bleed_edge_mm: f64) -> String {
    format!("{:?}", bleed_edge_mm).replace('.', "p")
}

/// The variants a job needs and where they live
#[derive(Debug, Clone, PartialEq)]
pub struct VariantPlan {
    pub crop_dir: PathBuf,
    /// Bleed edge in millimeters, 0 when none
    pub bleed_edge_mm: f32,
    bleed_key: Option<String>,
    pub vibrance: bool,
}

impl VariantPlan {
    pub fn new(crop_dir: impl Into<PathBuf>, bleed_edge: &str, vibrance: bool) -> Self {
        let value: f64 = bleed_edge.parse().unwrap_or(0.0);
        let bleed_key = (value > 0.0).then(|| bleed_dir_name(value));
        Self {
            crop_dir: crop_dir.into(),
            bleed_edge_mm: value as f32,
            bleed_key,
            vibrance,
        }
    }

    /// Plan for a job under the installation's vibrance setting
    pub fn for_job(job: &PrintJob, vibrance: bool) -> Self {
        Self::new(job.crop_dir(), &job.bleed_edge, vibrance)
    }

    pub fn has_bleed(&self) -> bool {
        self.bleed_key.is_some()
    }

    /// Variants to derive, in derivation order
    pub fn variants(&self) -> Vec<Variant> {
        let mut variants = vec![Variant::Plain];
        if self.has_bleed() {
            variants.push(Variant::Bleed);
        }
        if self.vibrance {
            variants.push(Variant::Vibrance);
        }
        if self.has_bleed() && self.vibrance {
            variants.push(Variant::BleedVibrance);
        }
        variants
    }

    /// The variant printed on the sheets
    pub fn render_variant(&self) -> Variant {
        Variant::from_axes(self.has_bleed(), self.vibrance)
    }

    /// Path of a variant's directory relative to the crop root, with `/`
    /// separators. Empty for the plain variant.
    pub fn relative_dir(&self, variant: Variant) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if variant.has_vibrance() {
            parts.push(VIBRANCE_DIR_NAME);
        }
        if variant.has_bleed() {
            if let Some(key) = &self.bleed_key {
                parts.push(key);
            }
        }
        parts.join("/")
    }

    pub fn dir(&self, variant: Variant) -> PathBuf {
        let relative = self.relative_dir(variant);
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.crop_dir.clone(), |dir, part| dir.join(part))
    }

    /// Directory holding the images to print
    pub fn render_dir(&self) -> PathBuf {
        self.dir(self.render_variant())
    }

    /// Bleed edge to keep when deriving `variant`
    pub fn bleed_for(&self, variant: Variant) -> f32 {
        if variant.has_bleed() {
            self.bleed_edge_mm
        } else {
            0.0
        }
    }
}
