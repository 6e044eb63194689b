//! 3D color lookup tables in the `.cube` format

use crate::types::{ProxyError, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;

/// A cubic RGB lookup table, red index varying fastest
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3d {
    size: usize,
    domain_min: [f32; 3],
    domain_max: [f32; 3],
    table: Vec<[f32; 3]>,
}

impl Lut3d {
    /// Read a `.cube` file
    pub fn read(path: &Path) -> Result<Self> {
        std::fs::read_to_string(path)?.parse()
    }

    /// Number of samples along each axis
    pub fn size(&self) -> usize {
        self.size
    }

    /// Identity table with `size` samples per axis
    pub fn identity(size: usize) -> Self {
        let step = 1.0 / (size.max(2) - 1) as f32;
        let mut table = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    table.push([r as f32 * step, g as f32 * step, b as f32 * step]);
                }
            }
        }
        Self {
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            table,
        }
    }

    fn at(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        self.table[r + self.size * (g + self.size * b)]
    }

    /// Look up one color with trilinear interpolation. Channels in 0..=1.
    pub fn lookup(&self, rgb: [f32; 3]) -> [f32; 3] {
        let max_index = (self.size - 1) as f32;

        let mut lower = [0usize; 3];
        let mut frac = [0f32; 3];
        for c in 0..3 {
            let span = self.domain_max[c] - self.domain_min[c];
            let t = if span > 0.0 {
                ((rgb[c] - self.domain_min[c]) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let pos = t * max_index;
            let base = (pos.floor() as usize).min(self.size.saturating_sub(2));
            lower[c] = base;
            frac[c] = pos - base as f32;
        }

        let [r0, g0, b0] = lower;
        let [fr, fg, fb] = frac;
        let lerp = |a: [f32; 3], b: [f32; 3], t: f32| {
            [
                a[0] + (b[0] - a[0]) * t,
                a[1] + (b[1] - a[1]) * t,
                a[2] + (b[2] - a[2]) * t,
            ]
        };

        let c00 = lerp(self.at(r0, g0, b0), self.at(r0 + 1, g0, b0), fr);
        let c10 = lerp(self.at(r0, g0 + 1, b0), self.at(r0 + 1, g0 + 1, b0), fr);
        let c01 = lerp(self.at(r0, g0, b0 + 1), self.at(r0 + 1, g0, b0 + 1), fr);
        let c11 = lerp(self.at(r0, g0 + 1, b0 + 1), self.at(r0 + 1, g0 + 1, b0 + 1), fr);

        let c0 = lerp(c00, c10, fg);
        let c1 = lerp(c01, c11, fg);
        lerp(c0, c1, fb)
    }

    /// Apply the table to every pixel. Alpha is kept.
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        let source = image.to_rgba8();
        let mut out = RgbaImage::new(source.width(), source.height());
        for (x, y, pixel) in source.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            let mapped = self.lookup([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]);
            let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            out.put_pixel(
                x,
                y,
                Rgba([to_u8(mapped[0]), to_u8(mapped[1]), to_u8(mapped[2]), a]),
            );
        }
        if image.color().has_alpha() {
            DynamicImage::ImageRgba8(out)
        } else {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(out).to_rgb8())
        }
    }
}

fn parse_triplet(parts: &[&str], line_no: usize) -> Result<[f32; 3]> {
    if parts.len() != 3 {
        return Err(ProxyError::Lut(format!(
            "line {}: expected three values, found {}",
            line_no,
            parts.len()
        )));
    }
    let mut values = [0f32; 3];
    for (value, part) in values.iter_mut().zip(parts) {
        *value = part
            .parse()
            .map_err(|_| ProxyError::Lut(format!("line {}: bad number {:?}", line_no, part)))?;
    }
    Ok(values)
}

impl std::str::FromStr for Lut3d {
    type Err = ProxyError;

    fn from_str(text: &str) -> Result<Self> {
        let mut size = None;
        let mut domain_min = [0.0; 3];
        let mut domain_max = [1.0; 3];
        let mut table = Vec::new();

        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts[0] {
                "TITLE" => {}
                "LUT_3D_SIZE" => {
                    let n: usize = parts
                        .get(1)
                        .and_then(|s| s.parse().ok())
                        .ok_or_else(|| ProxyError::Lut(format!("line {}: bad LUT_3D_SIZE", line_no)))?;
                    if n < 2 {
                        return Err(ProxyError::Lut(format!("LUT_3D_SIZE {} is too small", n)));
                    }
                    size = Some(n);
                }
                "DOMAIN_MIN" => domain_min = parse_triplet(&parts[1..], line_no)?,
                "DOMAIN_MAX" => domain_max = parse_triplet(&parts[1..], line_no)?,
                "LUT_1D_SIZE" => {
                    return Err(ProxyError::Lut("1D tables are not supported".to_string()));
                }
                keyword if keyword.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                    log::debug!("Ignoring .cube keyword {}", keyword);
                }
                _ => table.push(parse_triplet(&parts, line_no)?),
            }
        }

        let size = size.ok_or_else(|| ProxyError::Lut("missing LUT_3D_SIZE".to_string()))?;
        let expected = size * size * size;
        if table.len() != expected {
            return Err(ProxyError::Lut(format!(
                "expected {} entries, found {}",
                expected,
                table.len()
            )));
        }

        Ok(Self {
            size,
            domain_min,
            domain_max,
            table,
        })
    }
}
