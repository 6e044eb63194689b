//! Page-content sink
//!
//! The renderer only needs a handful of drawing primitives. Everything it
//! emits goes through [`PageSink`], so the sheet walk can be tested against
//! a recording sink and written out by [`super::PdfSink`].

use crate::layout::{CardRotation, Rect};
use crate::types::{Result, Rgb};
use std::path::PathBuf;

/// What to draw into a card rectangle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// Derived image on disk
    File(PathBuf),
    /// Stand-in for a card whose derived image is missing
    Placeholder,
}

/// A single stroked line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub width: f32,
    pub color: Rgb,
    /// On/off dash lengths, solid when `None`
    pub dash: Option<(f32, f32)>,
    pub dash_phase: f32,
}

/// Drawing primitives of an output document
pub trait PageSink {
    /// Draw an image filling `rect`, turned by `rotation`
    fn draw_image(&mut self, source: &ImageSource, rect: Rect, rotation: CardRotation)
    -> Result<()>;

    fn draw_line(&mut self, stroke: &Stroke) -> Result<()>;

    /// Finish the current page and start a new one
    fn show_page(&mut self) -> Result<()>;
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Image {
        source: ImageSource,
        rect: Rect,
        rotation: CardRotation,
    },
    Line(Stroke),
    ShowPage,
}

/// Sink that keeps every call, for inspecting a render
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<DrawCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls split at page boundaries (the boundary itself is dropped)
    pub fn pages(&self) -> Vec<&[DrawCall]> {
        let mut pages = Vec::new();
        let mut start = 0;
        for (i, call) in self.calls.iter().enumerate() {
            if *call == DrawCall::ShowPage {
                pages.push(&self.calls[start..i]);
                start = i + 1;
            }
        }
        pages
    }

    pub fn images(&self) -> impl Iterator<Item = (&ImageSource, &Rect, CardRotation)> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Image {
                source,
                rect,
                rotation,
            } => Some((source, rect, *rotation)),
            _ => None,
        })
    }
}

impl PageSink for RecordingSink {
    fn draw_image(
        &mut self,
        source: &ImageSource,
        rect: Rect,
        rotation: CardRotation,
    ) -> Result<()> {
        self.calls.push(DrawCall::Image {
            source: source.clone(),
            rect,
            rotation,
        });
        Ok(())
    }

    fn draw_line(&mut self, stroke: &Stroke) -> Result<()> {
        self.calls.push(DrawCall::Line(*stroke));
        Ok(())
    }

    fn show_page(&mut self) -> Result<()> {
        self.calls.push(DrawCall::ShowPage);
        Ok(())
    }
}
