use crate::config::Config;
use crate::constants::{
    CROP_DIR_NAME, HIDDEN_PREFIX, MAX_BACKSIDE_OFFSET_MM, max_bleed_edge_mm, mm_to_pt,
};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One card image of the job and how it should be printed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardEntry {
    /// Number of copies to print
    pub copies: u32,
    /// Card spans two horizontal slots
    pub oversized: bool,
    /// Backside image for this card, overriding the job default
    pub backside: Option<String>,
    /// Duplex flip happens around the short edge for this card
    pub backside_short_edge: bool,
    /// Filename carries the hidden prefix. Derived when the job is loaded
    /// or scanned, never persisted.
    #[serde(skip)]
    pub hidden: bool,
}

impl CardEntry {
    /// Entry for a newly discovered image
    pub fn discovered(name: &str) -> Self {
        let hidden = is_hidden_name(name);
        Self {
            copies: if hidden { 0 } else { 1 },
            hidden,
            ..Default::default()
        }
    }
}

/// Whether a filename uses the hidden prefix
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with(HIDDEN_PREFIX)
}

/// Full description of a print job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintJob {
    // Project
    pub image_dir: PathBuf,
    pub cache_file: PathBuf,
    pub output_name: String,

    // Cards, keyed by source image filename
    pub cards: BTreeMap<String, CardEntry>,

    // Backsides
    pub backside_enabled: bool,
    pub backside_default: String,
    /// Horizontal backside shift in millimeters, kept as the normalized text
    pub backside_offset: String,

    // Oversized cards
    pub oversized_enabled: bool,

    // Page generation
    /// Bleed edge in millimeters, kept as the normalized text
    pub bleed_edge: String,
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub extended_guides: bool,
    pub guide_colors: GuideColors,
}

impl Default for PrintJob {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("images"),
            cache_file: PathBuf::from("img.cache"),
            output_name: "_printme".to_string(),
            cards: BTreeMap::new(),
            backside_enabled: false,
            backside_default: "__back.png".to_string(),
            backside_offset: "0".to_string(),
            oversized_enabled: false,
            bleed_edge: "0".to_string(),
            paper_size: PaperSize::Letter,
            orientation: Orientation::Portrait,
            extended_guides: true,
            guide_colors: GuideColors::default(),
        }
    }
}

impl PrintJob {
    /// New job using the installation defaults
    pub fn new(config: &Config) -> Self {
        Self {
            paper_size: config.default_page_size,
            ..Default::default()
        }
    }

    /// Load a job from a JSON file and normalize it
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let mut job: PrintJob = serde_json::from_slice(&bytes)
            .map_err(|e| ProxyError::Config(format!("Failed to parse job: {}", e)))?;
        job.normalize();
        Ok(job)
    }

    /// Save the job to a JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ProxyError::Config(format!("Failed to serialize job: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Apply the job invariants to values that came from outside:
    /// numeric fields are normalized and clamped, hidden flags derived.
    pub fn normalize(&mut self) {
        self.bleed_edge = normalize_bleed_edge(&self.bleed_edge);
        self.backside_offset = normalize_backside_offset(&self.backside_offset);
        for (name, entry) in self.cards.iter_mut() {
            entry.hidden = is_hidden_name(name);
            if entry.hidden {
                entry.copies = 0;
            }
        }
    }

    pub fn set_bleed_edge(&mut self, text: &str) {
        self.bleed_edge = normalize_bleed_edge(text);
    }

    pub fn set_backside_offset(&mut self, text: &str) {
        self.backside_offset = normalize_backside_offset(text);
    }

    /// Bleed edge in millimeters (0 when none)
    pub fn bleed_edge_mm(&self) -> f32 {
        self.bleed_edge.parse().unwrap_or(0.0)
    }

    /// Backside shift in points
    pub fn backside_offset_pt(&self) -> f32 {
        mm_to_pt(self.backside_offset.parse().unwrap_or(0.0))
    }

    /// Page size in points, orientation applied
    pub fn page_size_pt(&self) -> (f32, f32) {
        self.paper_size.dimensions_pt(self.orientation)
    }

    /// Directory holding the derived crops
    pub fn crop_dir(&self) -> PathBuf {
        self.image_dir.join(CROP_DIR_NAME)
    }

    /// Backside image used for a card
    pub fn backside_for<'a>(&'a self, name: &str) -> &'a str {
        self.cards
            .get(name)
            .and_then(|entry| entry.backside.as_deref())
            .unwrap_or(&self.backside_default)
    }

    /// Whether a card is packed as oversized in this job
    pub fn is_oversized(&self, name: &str) -> bool {
        self.oversized_enabled && self.has_oversized_source(name)
    }

    /// Whether a card's source image carries the oversized frame.
    ///
    /// Derived images follow this flag alone so the job switch can change
    /// without invalidating them.
    pub fn has_oversized_source(&self, name: &str) -> bool {
        self.cards.get(name).is_some_and(|entry| entry.oversized)
    }

    /// Total number of copies requested
    pub fn total_copies(&self) -> usize {
        self.cards.values().map(|entry| entry.copies as usize).sum()
    }
}

// =============================================================================
// Numeric text fields
// =============================================================================

/// Digits with at most one decimal point
pub fn is_number_string(text: &str) -> bool {
    let mut seen_point = false;
    let mut seen_digit = false;
    for c in text.chars() {
        match c {
            '.' if !seen_point => seen_point = true,
            '0'..='9' => seen_digit = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Accept a locale decimal comma and stray whitespace
fn normalize_decimal(text: &str) -> String {
    text.trim().replacen(',', ".", 1)
}

/// Normalize a bleed edge entry: values above the supported maximum are
/// clamped and anything unparsable becomes "0".
pub fn normalize_bleed_edge(text: &str) -> String {
    let text = normalize_decimal(text);
    if !is_number_string(&text) {
        return "0".to_string();
    }
    match text.parse::<f32>() {
        Ok(value) if value > max_bleed_edge_mm() => format!("{:.2}", max_bleed_edge_mm()),
        Ok(_) => text,
        Err(_) => "0".to_string(),
    }
}

/// Normalize a backside offset entry, which may be negative
pub fn normalize_backside_offset(text: &str) -> String {
    let text = normalize_decimal(text);
    let (negative, magnitude) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    if !is_number_string(magnitude) {
        return "0".to_string();
    }
    match magnitude.parse::<f32>() {
        Ok(value) if value > MAX_BACKSIDE_OFFSET_MM => {
            let sign = if negative { "-" } else { "" };
            format!("{}{:.2}", sign, MAX_BACKSIDE_OFFSET_MM)
        }
        Ok(_) => text,
        Err(_) => "0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bleed_edge_locale_comma_is_clamped() {
        assert_eq!(normalize_bleed_edge("5,5"), "3.05");
    }

    #[test]
    fn test_bleed_edge_in_range_kept_verbatim() {
        assert_eq!(normalize_bleed_edge("1.5"), "1.5");
        assert_eq!(normalize_bleed_edge("0,5"), "0.5");
        assert_eq!(normalize_bleed_edge("0"), "0");
    }

    #[test]
    fn test_bleed_edge_garbage_resets() {
        assert_eq!(normalize_bleed_edge("abc"), "0");
        assert_eq!(normalize_bleed_edge(""), "0");
        assert_eq!(normalize_bleed_edge("-1"), "0");
        assert_eq!(normalize_bleed_edge("1.2.3"), "0");
    }

    #[test]
    fn test_backside_offset() {
        assert_eq!(normalize_backside_offset("2.5"), "2.5");
        assert_eq!(normalize_backside_offset("-1,25"), "-1.25");
        assert_eq!(normalize_backside_offset("42"), "10.00");
        assert_eq!(normalize_backside_offset("-42"), "-10.00");
        assert_eq!(normalize_backside_offset("x"), "0");
    }

    #[test]
    fn test_is_number_string() {
        assert!(is_number_string("12"));
        assert!(is_number_string("1.5"));
        assert!(is_number_string("5."));
        assert!(!is_number_string("."));
        assert!(!is_number_string("1e3"));
    }

    #[test]
    fn test_normalize_derives_hidden() {
        let mut job = PrintJob::default();
        job.cards.insert(
            "__back.png".to_string(),
            CardEntry {
                copies: 3,
                ..Default::default()
            },
        );
        job.cards.insert(
            "bolt.png".to_string(),
            CardEntry {
                copies: 2,
                ..Default::default()
            },
        );
        job.normalize();
        assert!(job.cards["__back.png"].hidden);
        assert_eq!(job.cards["__back.png"].copies, 0);
        assert!(!job.cards["bolt.png"].hidden);
        assert_eq!(job.total_copies(), 2);
    }

    #[test]
    fn test_backside_lookup() {
        let mut job = PrintJob::default();
        job.cards.insert(
            "a.png".to_string(),
            CardEntry {
                copies: 1,
                backside: Some("alt.png".to_string()),
                ..Default::default()
            },
        );
        job.cards.insert("b.png".to_string(), CardEntry::discovered("b.png"));
        assert_eq!(job.backside_for("a.png"), "alt.png");
        assert_eq!(job.backside_for("b.png"), "__back.png");
    }

    #[test]
    fn test_oversized_requires_job_switch() {
        let mut job = PrintJob::default();
        job.cards.insert(
            "big.png".to_string(),
            CardEntry {
                copies: 1,
                oversized: true,
                ..Default::default()
            },
        );
        assert!(!job.is_oversized("big.png"));
        assert!(job.has_oversized_source("big.png"));
        job.oversized_enabled = true;
        assert!(job.is_oversized("big.png"));
        assert!(!job.has_oversized_source("missing.png"));
    }
}
