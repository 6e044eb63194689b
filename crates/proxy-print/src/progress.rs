//! Incremental progress reporting for long-running batches

use std::fmt;

/// Pipeline stage a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Cropping,
    Uncropping,
    CachingPreviews,
    RenderingFront,
    RenderingBack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Cropping => "Cropping images",
            Stage::Uncropping => "Uncropping images",
            Stage::CachingPreviews => "Caching previews",
            Stage::RenderingFront => "Rendering page",
            Stage::RenderingBack => "Rendering backside for page",
        };
        f.write_str(s)
    }
}

/// One progress event: which file is being worked on, at which stage
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub stage: Stage,
    pub file: String,
    /// 1-based position within the batch
    pub current: usize,
    pub total: usize,
    /// 1-based sheet number while rendering
    pub page: Option<usize>,
}

impl Progress {
    pub fn new(stage: Stage, file: impl Into<String>, current: usize, total: usize) -> Self {
        Self {
            stage,
            file: file.into(),
            current,
            total,
            page: None,
        }
    }

    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(
                f,
                "{} {}... Image number {} - {}",
                self.stage, page, self.current, self.file
            ),
            None => write!(
                f,
                "{}... ({}/{}) {}",
                self.stage, self.current, self.total, self.file
            ),
        }
    }
}

/// Receiver of progress events
pub trait ProgressSink {
    fn report(&self, progress: &Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(&Progress),
{
    fn report(&self, progress: &Progress) {
        self(progress)
    }
}

/// Sink that drops every event
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: &Progress) {}
}
