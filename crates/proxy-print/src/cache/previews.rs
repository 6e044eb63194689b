//! Persistent cache of preview renditions
//!
//! One entry per image in the plain crop directory, holding small PNG
//! renditions for display. The cache is fully regenerable, so an unreadable
//! cache file simply starts over.

use crate::imaging::{PreviewBlob, card_preview, read_image, thumbnail, uncropped_preview};
use crate::options::PrintJob;
use crate::progress::{Progress, ProgressSink, Stage};
use crate::types::Result;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::{Variant, VariantPlan, list_images};

/// Encoded image bytes, stored as base64 text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob(pub Vec<u8>);

impl Serialize for Blob {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Blob {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s.as_bytes())
            .map(Blob)
            .map_err(serde::de::Error::custom)
    }
}

impl From<PreviewBlob> for Blob {
    fn from(blob: PreviewBlob) -> Self {
        Blob(blob.png)
    }
}

/// Cached renditions of one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageCacheEntry {
    /// Pixel size of the preview
    pub size: Option<(u32, u32)>,
    pub preview: Option<Blob>,
    pub thumbnail: Option<Blob>,
    /// Preview of the source image with its border
    pub uncropped: Option<Blob>,
    /// Previews of the non-plain variants, keyed by variant directory
    /// relative to the crop root
    pub variants: BTreeMap<String, Blob>,
}

impl ImageCacheEntry {
    /// Whether the renditions every entry needs are present
    pub fn is_complete(&self) -> bool {
        self.size.is_some()
            && self.preview.is_some()
            && self.thumbnail.is_some()
            && self.uncropped.is_some()
    }
}

/// Preview cache keyed by image filename
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageCache {
    entries: BTreeMap<String, ImageCacheEntry>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ImageCacheEntry> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ImageCacheEntry> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Read a cache file. A missing or unreadable file gives an empty cache.
    pub fn read_from(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(e) => {
                log::warn!("Cannot read cache {}: {}, starting empty", path.display(), e);
                return Self::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(cache) => cache,
            Err(e) => {
                log::warn!("Corrupt cache {}: {}, starting empty", path.display(), e);
                Self::new()
            }
        }
    }

    /// Write the cache file through a temporary file, so readers see either
    /// the old or the new content.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(self)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Load a cache file off the async runtime
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        Ok(tokio::task::spawn_blocking(move || Self::read_from(&path)).await?)
    }

    /// Save a cache file off the async runtime
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_owned();
        let cache = self.clone();
        tokio::task::spawn_blocking(move || cache.write_to(&path)).await?
    }

    /// Drop entries whose image is no longer in `names`
    pub fn prune(&mut self, names: &BTreeSet<String>) -> Vec<String> {
        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|key| !names.contains(*key))
            .cloned()
            .collect();
        for key in &stale {
            log::debug!("Pruning cache entry {}", key);
            self.entries.remove(key);
        }
        stale
    }
}

/// Whether the cache is missing anything for the job's current settings:
/// an image in the crop directory without an entry, an entry lacking a
/// rendition, or an entry whose image is gone.
pub fn needs_cache_previews(cache: &ImageCache, plan: &VariantPlan) -> Result<bool> {
    let names: BTreeSet<String> = list_images(&plan.dir(Variant::Plain))?.into_iter().collect();
    let variant_key = active_variant_key(plan);

    if names.iter().any(|name| cache.get(name).is_none()) {
        return Ok(true);
    }
    for (name, entry) in &cache.entries {
        if !names.contains(name) || !entry.is_complete() {
            return Ok(true);
        }
        if let Some(key) = &variant_key {
            if !entry.variants.contains_key(key) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn active_variant_key(plan: &VariantPlan) -> Option<String> {
    let variant = plan.render_variant();
    (variant != Variant::Plain).then(|| plan.relative_dir(variant))
}

/// Generate whatever renditions are missing and prune stale entries.
/// Returns the number of entries that changed. Images that cannot be
/// decoded are logged and left incomplete.
pub fn cache_previews(
    cache: &mut ImageCache,
    job: &PrintJob,
    plan: &VariantPlan,
    progress: &dyn ProgressSink,
) -> Result<usize> {
    let plain_dir = plan.dir(Variant::Plain);
    let names = list_images(&plain_dir)?;
    let name_set: BTreeSet<String> = names.iter().cloned().collect();
    let pruned = cache.prune(&name_set);

    let variant_key = active_variant_key(plan);
    let variant_dir = plan.render_dir();

    let todo: Vec<&String> = names
        .iter()
        .filter(|name| {
            cache.get(name).is_none_or(|entry| {
                !entry.is_complete()
                    || variant_key
                        .as_ref()
                        .is_some_and(|key| !entry.variants.contains_key(key))
            })
        })
        .collect();

    for (i, name) in todo.iter().enumerate() {
        progress.report(&Progress::new(Stage::CachingPreviews, name.as_str(), i + 1, todo.len()));
        let entry = cache.entries.entry(name.to_string()).or_default();

        if entry.size.is_none() || entry.preview.is_none() || entry.thumbnail.is_none() {
            let result = read_image(&plain_dir.join(name)).and_then(|cropped| {
                let (preview, blob) = card_preview(&cropped)?;
                Ok((blob, thumbnail(&preview)?))
            });
            match result {
                Ok((blob, thumb)) => {
                    entry.size = Some(blob.size);
                    entry.preview = Some(blob.into());
                    entry.thumbnail = Some(thumb.into());
                }
                Err(e) => log::warn!("Cannot preview {}: {}", name, e),
            }
        }

        if entry.uncropped.is_none() {
            match read_image(&job.image_dir.join(name)).and_then(|source| uncropped_preview(&source)) {
                Ok(blob) => entry.uncropped = Some(blob.into()),
                Err(e) => log::warn!("Cannot preview source of {}: {}", name, e),
            }
        }

        if let Some(key) = &variant_key {
            if !entry.variants.contains_key(key) {
                let result = read_image(&variant_dir.join(name))
                    .and_then(|image| card_preview(&image))
                    .map(|(_, blob)| blob);
                match result {
                    Ok(blob) => {
                        entry.variants.insert(key.clone(), blob.into());
                    }
                    Err(e) => log::warn!("Cannot preview {} of {}: {}", key, name, e),
                }
            }
        }
    }

    Ok(todo.len() + pruned.len())
}
