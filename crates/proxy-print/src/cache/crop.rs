//! Cropping passes over the image root
//!
//! Keeps every variant directory in step with the source directory. Work is
//! decided by filename only: a derived file that exists is assumed current,
//! and settings that change what a file should look like get their own
//! variant directory instead.

use crate::config::Config;
use crate::imaging::{CropSettings, Lut3d, crop_card, is_image_file, read_image, uncrop_card, write_png};
use crate::options::PrintJob;
use crate::progress::{Progress, ProgressSink, Stage};
use crate::types::{ProxyError, Result};
use std::collections::BTreeSet;
use std::path::Path;

use super::{ImageCache, Variant, VariantPlan};

/// Sorted names of the image files directly inside `dir`.
/// A missing directory has no images.
pub fn list_images(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_image_file(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Whether `out_dir` must be brought up to date with `src_dir`: it does not
/// exist, or the two hold different sets of image filenames.
pub fn need_recrop(src_dir: &Path, out_dir: &Path) -> Result<bool> {
    if !out_dir.is_dir() {
        return Ok(true);
    }
    Ok(list_images(src_dir)? != list_images(out_dir)?)
}

/// Whether any variant the job needs is out of date
pub fn need_run_cropper(job: &PrintJob, plan: &VariantPlan) -> Result<bool> {
    for variant in plan.variants() {
        if need_recrop(&job.image_dir, &plan.dir(variant))? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// What a cropper run did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropReport {
    /// Files derived, per variant
    pub cropped: Vec<(Variant, String)>,
    /// Precropped images rebuilt into the image root
    pub uncropped: Vec<String>,
    /// Derived files deleted because their source is gone
    pub removed: Vec<(Variant, String)>,
    /// Files that could not be processed, with the reason
    pub failed: Vec<(String, String)>,
}

impl CropReport {
    /// Whether the run touched the disk
    pub fn is_empty(&self) -> bool {
        self.cropped.is_empty() && self.uncropped.is_empty() && self.removed.is_empty()
    }
}

/// Bring every variant directory of the job up to date.
///
/// Derived files without a source are handled first. In the plain
/// directory they are either rebuilt into a source (`enable_uncrop`) or
/// deleted; in the other variant directories they are deleted. Each
/// variant then derives the files it is missing. A file that fails is
/// logged and reported, and the batch continues.
pub fn run_cropper(
    job: &PrintJob,
    config: &Config,
    plan: &VariantPlan,
    lut: Option<&Lut3d>,
    progress: &dyn ProgressSink,
) -> Result<CropReport> {
    if plan.vibrance && lut.is_none() {
        return Err(ProxyError::Config(
            "Vibrance bump is enabled but no lookup table was loaded".to_string(),
        ));
    }

    let mut report = CropReport::default();
    std::fs::create_dir_all(&job.image_dir)?;

    handle_orphans(job, config, plan, progress, &mut report)?;

    let sources = list_images(&job.image_dir)?;
    for variant in plan.variants() {
        let out_dir = plan.dir(variant);
        std::fs::create_dir_all(&out_dir)?;

        let present: BTreeSet<String> = list_images(&out_dir)?.into_iter().collect();
        let todo: Vec<&String> = sources.iter().filter(|n| !present.contains(*n)).collect();
        if todo.is_empty() {
            continue;
        }
        log::info!("Cropping {} image(s) into {}", todo.len(), out_dir.display());

        let settings = CropSettings {
            bleed_edge_mm: plan.bleed_for(variant),
            max_dpi: config.max_dpi,
            oversized: false,
        };
        let variant_lut = if variant.has_vibrance() { lut } else { None };

        for (i, name) in todo.iter().enumerate() {
            progress.report(&Progress::new(Stage::Cropping, name.as_str(), i + 1, todo.len()));

            let settings = CropSettings {
                oversized: job.has_oversized_source(name),
                ..settings
            };
            let result = read_image(&job.image_dir.join(name))
                .and_then(|image| crop_card(&image, &settings, variant_lut))
                .and_then(|card| {
                    log::debug!(
                        "{} - {:.0} dpi, cropping {} pixels around frame",
                        name,
                        card.dpi,
                        card.cropped_px
                    );
                    write_png(&out_dir.join(name), &card.image)
                });

            match result {
                Ok(()) => report.cropped.push((variant, name.to_string())),
                Err(e) => {
                    log::warn!("Failed to crop {}: {}", name, e);
                    report.failed.push((name.to_string(), e.to_string()));
                }
            }
        }
    }

    Ok(report)
}

fn handle_orphans(
    job: &PrintJob,
    config: &Config,
    plan: &VariantPlan,
    progress: &dyn ProgressSink,
    report: &mut CropReport,
) -> Result<()> {
    let plain_dir = plan.dir(Variant::Plain);
    let sources: BTreeSet<String> = list_images(&job.image_dir)?.into_iter().collect();
    let orphans: Vec<String> = list_images(&plain_dir)?
        .into_iter()
        .filter(|name| !sources.contains(name))
        .collect();

    for (i, name) in orphans.iter().enumerate() {
        let path = plain_dir.join(name);
        if config.enable_uncrop {
            progress.report(&Progress::new(Stage::Uncropping, name.as_str(), i + 1, orphans.len()));
            let result = read_image(&path).and_then(|image| {
                let source = uncrop_card(&image, job.has_oversized_source(name));
                write_png(&job.image_dir.join(name), &source)
            });
            match result {
                Ok(()) => {
                    log::info!("Rebuilt source for precropped image {}", name);
                    report.uncropped.push(name.clone());
                }
                Err(e) => {
                    log::warn!("Failed to uncrop {}: {}", name, e);
                    report.failed.push((name.clone(), e.to_string()));
                }
            }
        } else {
            std::fs::remove_file(&path)?;
            log::debug!("Removed {}, its source is gone", path.display());
            report.removed.push((Variant::Plain, name.clone()));
        }
    }

    // Sources may have been rebuilt above
    let sources: BTreeSet<String> = list_images(&job.image_dir)?.into_iter().collect();
    for variant in plan.variants().into_iter().filter(|v| *v != Variant::Plain) {
        let dir = plan.dir(variant);
        for name in list_images(&dir)? {
            if !sources.contains(&name) {
                std::fs::remove_file(dir.join(&name))?;
                log::debug!("Removed {}, its source is gone", dir.join(&name).display());
                report.removed.push((variant, name));
            }
        }
    }

    Ok(())
}

/// Drop every derived file and cached preview of one card, so the next
/// pass rebuilds them. Needed when a setting that changes how the card is
/// cropped, such as its oversized flag, is toggled.
///
/// Variant directories of other settings are cleaned too, since they would
/// otherwise come back stale when the setting is switched back.
pub fn invalidate_card(plan: &VariantPlan, cache: &mut ImageCache, name: &str) -> Result<()> {
    remove_derived(&plan.crop_dir, name)?;
    cache.remove(name);
    Ok(())
}

fn remove_derived(dir: &Path, name: &str) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            remove_derived(&path, name)?;
        } else if entry.file_name() == name {
            std::fs::remove_file(&path)?;
            log::debug!("Invalidated {}", path.display());
        }
    }
    Ok(())
}

/// Toggle a card's oversized flag, invalidating its derived files when
/// the flag changes. Returns whether anything changed.
pub fn set_card_oversized(
    job: &mut PrintJob,
    plan: &VariantPlan,
    cache: &mut ImageCache,
    name: &str,
    oversized: bool,
) -> Result<bool> {
    let Some(entry) = job.cards.get_mut(name) else {
        return Ok(false);
    };
    if entry.oversized == oversized {
        return Ok(false);
    }
    entry.oversized = oversized;
    invalidate_card(plan, cache, name)?;
    Ok(true)
}
