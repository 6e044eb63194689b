mod logger;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use proxy_print::cache::ImageCache;
use proxy_print::{Config, Progress, PrintJob};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ppp", about = "Proxy card print layout", version)]
struct Cli {
    /// Installation settings file
    #[arg(long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Print job file, created when missing
    #[arg(short, long, default_value = "print.json", global = true)]
    job: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the job's card list with its image directory
    Scan {
        /// Image directory, replacing the one stored in the job
        #[arg(short, long)]
        images: Option<PathBuf>,
    },

    /// Derive cropped images and refresh the preview cache
    Crop,

    /// Set print options of one card
    Card {
        /// Source image filename
        name: String,

        /// Number of copies
        #[arg(long)]
        copies: Option<u32>,

        /// Mark the card as oversized
        #[arg(long)]
        oversized: Option<bool>,

        /// Backside image for this card
        #[arg(long)]
        backside: Option<String>,

        /// Flip the backside around the short edge
        #[arg(long)]
        short_edge: Option<bool>,
    },

    /// Set job-wide options
    Set {
        /// Paper size
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// Paper orientation
        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,

        /// Bleed edge in millimeters
        #[arg(long)]
        bleed_edge: Option<String>,

        /// Print backsides
        #[arg(long)]
        backsides: Option<bool>,

        /// Default backside image
        #[arg(long)]
        backside_default: Option<String>,

        /// Horizontal backside shift in millimeters
        #[arg(long, allow_hyphen_values = true)]
        backside_offset: Option<String>,

        /// Allow oversized cards
        #[arg(long)]
        oversized: Option<bool>,

        /// Extend guides to the page edges
        #[arg(long)]
        extended_guides: Option<bool>,

        /// Output filename without extension
        #[arg(long)]
        output_name: Option<String>,
    },

    /// Prepare images and render the PDF
    Render {
        /// Output PDF file, defaults to the job's output name next to the
        /// image directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<PaperArg> for proxy_print::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<OrientationArg> for proxy_print::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

async fn load_job(path: &Path, config: &Config) -> Result<PrintJob> {
    if path.exists() {
        PrintJob::load(path)
            .await
            .with_context(|| format!("Failed to load job {}", path.display()))
    } else {
        log::info!("Starting new job {}", path.display());
        Ok(PrintJob::new(config))
    }
}

fn report_progress(progress: &Progress) {
    log::info!("{}", progress);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::CliLogger::new(cli.verbose).init()?;

    let config = Config::load(&cli.config).await?;
    let mut job = load_job(&cli.job, &config).await?;

    match cli.command {
        Commands::Scan { images } => {
            if let Some(images) = images {
                job.image_dir = images;
            }
            let report = proxy_print::scan_images(&mut job)?;
            for name in &report.reset_backsides {
                log::warn!("Backside of {} is missing, using the default", name);
            }
            job.save(&cli.job).await?;
            println!(
                "{} card(s): {} new, {} removed",
                job.cards.len(),
                report.added.len(),
                report.removed.len()
            );
        }

        Commands::Crop => {
            let mut cache = ImageCache::load(&job.cache_file).await?;
            let (report, cache, job) = tokio::task::spawn_blocking(move || {
                proxy_print::prepare_images(&job, &config, &mut cache, &report_progress)
                    .map(|report| (report, cache, job))
            })
            .await??;
            cache.save(&job.cache_file).await?;

            println!(
                "Cropped {}, uncropped {}, removed {}, failed {}",
                report.crop.cropped.len(),
                report.crop.uncropped.len(),
                report.crop.removed.len(),
                report.crop.failed.len()
            );
        }

        Commands::Card {
            name,
            copies,
            oversized,
            backside,
            short_edge,
        } => {
            if !job.cards.contains_key(&name) {
                anyhow::bail!("No card named {} in the job, run scan first", name);
            }
            if let Some(oversized) = oversized {
                let mut cache = ImageCache::load(&job.cache_file).await?;
                let plan = proxy_print::cache::VariantPlan::for_job(&job, config.vibrance_bump);
                let changed = proxy_print::cache::set_card_oversized(
                    &mut job, &plan, &mut cache, &name, oversized,
                )?;
                if changed {
                    cache.save(&job.cache_file).await?;
                }
            }
            if let Some(entry) = job.cards.get_mut(&name) {
                if let Some(copies) = copies {
                    entry.copies = if entry.hidden { 0 } else { copies };
                }
                if let Some(backside) = backside {
                    entry.backside = Some(backside);
                }
                if let Some(short_edge) = short_edge {
                    entry.backside_short_edge = short_edge;
                }
            }
            job.save(&cli.job).await?;
        }

        Commands::Set {
            paper,
            orientation,
            bleed_edge,
            backsides,
            backside_default,
            backside_offset,
            oversized,
            extended_guides,
            output_name,
        } => {
            if let Some(paper) = paper {
                job.paper_size = paper.into();
            }
            if let Some(orientation) = orientation {
                job.orientation = orientation.into();
            }
            if let Some(text) = bleed_edge {
                job.set_bleed_edge(&text);
            }
            if let Some(enabled) = backsides {
                job.backside_enabled = enabled;
            }
            if let Some(name) = backside_default {
                job.backside_default = name;
            }
            if let Some(text) = backside_offset {
                job.set_backside_offset(&text);
            }
            if let Some(enabled) = oversized {
                job.oversized_enabled = enabled;
            }
            if let Some(enabled) = extended_guides {
                job.extended_guides = enabled;
            }
            if let Some(name) = output_name {
                job.output_name = name;
            }
            job.save(&cli.job).await?;
        }

        Commands::Render { output, stats_only } => {
            let stats = proxy_print::calculate_statistics(&job, job.page_size_pt());
            println!("Layout Statistics:");
            println!("  Paper: {} {:?}", job.paper_size.name(), job.orientation);
            println!("  Cards per sheet: {} x {}", stats.columns, stats.rows);
            println!("  Cards requested: {}", stats.cards_requested);
            println!("  Cards placed: {}", stats.cards_placed);
            if stats.oversized_placed > 0 {
                println!("  Oversized: {}", stats.oversized_placed);
            }
            if stats.cards_unplaced > 0 {
                println!("  Unplaced: {}", stats.cards_unplaced);
            }
            println!("  Sheets: {}", stats.sheets);
            println!("  Output pages: {}", stats.output_pages);

            if stats_only {
                return Ok(());
            }

            let output = output.unwrap_or_else(|| proxy_print::default_output_path(&job));
            let cache_file = job.cache_file.clone();
            let cache = ImageCache::load(&cache_file).await?;

            let outcome =
                proxy_print::generate_pdf(job, config, cache, &output, report_progress).await?;
            outcome.cache.save(&cache_file).await?;

            for name in &outcome.render.missing {
                log::warn!("{} was missing and printed as a placeholder", name);
            }
            if !outcome.render.unplaced.is_empty() {
                log::warn!(
                    "{} card(s) do not fit this paper size and were skipped",
                    outcome.render.unplaced.len()
                );
            }
            println!(
                "Rendered {} card(s) on {} page(s) → {}",
                outcome.render.cards,
                outcome.render.pages,
                output.display()
            );
        }
    }

    Ok(())
}
