//! End-to-end job processing
//!
//! Derivation runs first and is idempotent: an unchanged image root causes
//! no writes. Rendering then reads the variant directory matching the job.

use crate::cache::{
    CropReport, ImageCache, VariantPlan, cache_previews, need_run_cropper, needs_cache_previews,
    run_cropper,
};
use crate::config::Config;
use crate::imaging::Lut3d;
use crate::io::save_pdf;
use crate::options::PrintJob;
use crate::progress::ProgressSink;
use crate::render::{PdfSink, RenderSummary, render_job};
use crate::types::*;
use std::path::{Path, PathBuf};

/// What preparing a job's images did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrepareReport {
    pub crop: CropReport,
    /// Cache entries created, updated or pruned
    pub cache_changes: usize,
}

/// Bring the derived images and the preview cache of a job up to date.
///
/// The vibrance table is read from `config.vibrance_cube` only when the
/// bump is enabled and cropping has work to do.
pub fn prepare_images(
    job: &PrintJob,
    config: &Config,
    cache: &mut ImageCache,
    progress: &dyn ProgressSink,
) -> Result<PrepareReport> {
    let plan = VariantPlan::for_job(job, config.vibrance_bump);
    let mut report = PrepareReport::default();

    if need_run_cropper(job, &plan)? {
        let lut = if config.vibrance_bump {
            Some(Lut3d::read(&config.vibrance_cube)?)
        } else {
            None
        };
        report.crop = run_cropper(job, config, &plan, lut.as_ref(), progress)?;
    } else {
        log::debug!("Derived images are up to date");
    }

    if needs_cache_previews(cache, &plan)? {
        report.cache_changes = cache_previews(cache, job, &plan, progress)?;
    }

    Ok(report)
}

/// Render a prepared job into a PDF document in memory
pub fn render_pdf(
    job: &PrintJob,
    config: &Config,
    progress: &dyn ProgressSink,
) -> Result<(lopdf::Document, RenderSummary)> {
    let plan = VariantPlan::for_job(job, config.vibrance_bump);
    let mut sink = PdfSink::new(job.page_size_pt());
    let summary = render_job(job, &plan.render_dir(), &mut sink, progress)?;
    Ok((sink.finish()?, summary))
}

/// Default output path of a job: `<output_name>.pdf` next to the image root
pub fn default_output_path(job: &PrintJob) -> PathBuf {
    let parent = job.image_dir.parent().unwrap_or(Path::new(""));
    parent.join(format!("{}.pdf", job.output_name))
}

/// Result of a full run
#[derive(Debug)]
pub struct GenerateOutcome {
    pub cache: ImageCache,
    pub prepare: PrepareReport,
    pub render: RenderSummary,
}

/// Prepare images, render and save a job's PDF.
///
/// The CPU-bound work runs on a blocking task; the cache travels with it and
/// comes back in the outcome for the caller to persist.
pub async fn generate_pdf<P>(
    job: PrintJob,
    config: Config,
    cache: ImageCache,
    output: impl AsRef<Path>,
    progress: P,
) -> Result<GenerateOutcome>
where
    P: ProgressSink + Send + 'static,
{
    let (doc, outcome) = tokio::task::spawn_blocking(move || {
        let mut cache = cache;
        let prepare = prepare_images(&job, &config, &mut cache, &progress)?;
        let (doc, render) = render_pdf(&job, &config, &progress)?;
        Ok::<_, ProxyError>((
            doc,
            GenerateOutcome {
                cache,
                prepare,
                render,
            },
        ))
    })
    .await??;

    save_pdf(doc, output).await?;
    Ok(outcome)
}
