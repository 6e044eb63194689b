//! PDF output through lopdf
//!
//! Every distinct image file becomes one Image XObject that all draws of
//! that file share, so a card printed nine times is embedded once.

use crate::layout::{CardRotation, Rect};
use crate::types::Result;
use image::{DynamicImage, GenericImageView};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

use super::sink::{ImageSource, PageSink, Stroke};

/// Fill of the placeholder drawn for missing images
const PLACEHOLDER_GREY: u8 = 0xc8;

/// Page sink building a PDF document
pub struct PdfSink {
    doc: Document,
    pages_id: ObjectId,
    page_refs: Vec<Object>,
    page_width: f32,
    page_height: f32,
    /// Content operators of the page being drawn
    ops: String,
    /// XObjects used on the page being drawn
    xobjects: Dictionary,
    images: HashMap<ImageSource, (String, ObjectId)>,
}

impl PdfSink {
    /// New document whose pages are all `page_size_pt`
    pub fn new(page_size_pt: (f32, f32)) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_refs: Vec::new(),
            page_width: page_size_pt.0,
            page_height: page_size_pt.1,
            ops: String::new(),
            xobjects: Dictionary::new(),
            images: HashMap::new(),
        }
    }

    /// Pages finished so far
    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Close the page tree and hand out the document.
    /// Drawing after the last `show_page` is discarded.
    pub fn finish(mut self) -> Result<Document> {
        if !self.ops.is_empty() {
            log::warn!("Discarding drawing after the last page boundary");
        }
        if self.page_refs.is_empty() {
            log::info!("Nothing to print, writing a document without pages");
        }

        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);

        Ok(self.doc)
    }

    /// XObject name and id for a source, embedding it on first use
    fn image_xobject(&mut self, source: &ImageSource) -> Result<(String, ObjectId)> {
        if let Some(entry) = self.images.get(source) {
            return Ok(entry.clone());
        }

        let id = match source {
            ImageSource::File(path) => match load_image(path) {
                Ok(image) => self.add_image(&image)?,
                Err(e) => {
                    log::warn!("Cannot embed {}: {}, using placeholder", path.display(), e);
                    self.image_xobject(&ImageSource::Placeholder)?.1
                }
            },
            ImageSource::Placeholder => {
                let grey = image::RgbImage::from_pixel(1, 1, image::Rgb([PLACEHOLDER_GREY; 3]));
                self.add_image(&DynamicImage::ImageRgb8(grey))?
            }
        };

        let entry = (format!("Im{}", self.images.len()), id);
        self.images.insert(source.clone(), entry.clone());
        Ok(entry)
    }

    /// Embed an image, with a soft mask when it carries alpha
    fn add_image(&mut self, image: &DynamicImage) -> Result<ObjectId> {
        let (width, height) = image.dimensions();

        let mut dict = image_dict(width, height, "DeviceRGB");
        if image.color().has_alpha() {
            let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
            let mut mask = Stream::new(image_dict(width, height, "DeviceGray"), alpha);
            mask.compress()?;
            let mask_id = self.doc.add_object(mask);
            dict.set("SMask", Object::Reference(mask_id));
        }

        let mut stream = Stream::new(dict, image.to_rgb8().into_raw());
        stream.compress()?;
        Ok(self.doc.add_object(stream))
    }
}

fn image_dict(width: u32, height: u32, color_space: &str) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(color_space.as_bytes().to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ])
}

fn load_image(path: &std::path::Path) -> Result<DynamicImage> {
    Ok(image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?)
}

/// Transformation placing the unit image square into `rect`, turned
/// clockwise by `rotation`
pub fn image_matrix(rect: &Rect, rotation: CardRotation) -> [f32; 6] {
    let Rect {
        x,
        y,
        width: w,
        height: h,
    } = *rect;
    match rotation {
        CardRotation::None => [w, 0.0, 0.0, h, x, y],
        CardRotation::Clockwise90 => [0.0, -h, w, 0.0, x, y + h],
        CardRotation::CounterClockwise90 => [0.0, h, -w, 0.0, x + w, y],
        CardRotation::Rotate180 => [-w, 0.0, 0.0, -h, x + w, y + h],
    }
}

impl PageSink for PdfSink {
    fn draw_image(
        &mut self,
        source: &ImageSource,
        rect: Rect,
        rotation: CardRotation,
    ) -> Result<()> {
        let (name, id) = self.image_xobject(source)?;
        self.xobjects.set(name.as_bytes(), Object::Reference(id));

        let [a, b, c, d, e, f] = image_matrix(&rect, rotation);
        self.ops.push_str(&format!(
            "q {} {} {} {} {} {} cm /{} Do Q\n",
            a, b, c, d, e, f, name
        ));
        Ok(())
    }

    fn draw_line(&mut self, stroke: &Stroke) -> Result<()> {
        let ops = &mut self.ops;
        ops.push_str("q\n");
        ops.push_str(&format!("{} w\n", stroke.width));
        match stroke.dash {
            Some((on, off)) => ops.push_str(&format!("[{} {}] {} d\n", on, off, stroke.dash_phase)),
            None => ops.push_str("[] 0 d\n"),
        }
        let color = stroke.color;
        ops.push_str(&format!("{} {} {} RG\n", color.0, color.1, color.2));
        ops.push_str(&format!(
            "{} {} m {} {} l S\n",
            stroke.from.0, stroke.from.1, stroke.to.0, stroke.to.1
        ));
        ops.push_str("Q\n");
        Ok(())
    }

    fn show_page(&mut self) -> Result<()> {
        let content = std::mem::take(&mut self.ops);
        let xobjects = std::mem::take(&mut self.xobjects);

        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(self.page_width),
                    Object::Real(self.page_height),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]);
        let page_id = self.doc.add_object(page);
        self.page_refs.push(Object::Reference(page_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(m: [f32; 6], u: f32, v: f32) -> (f32, f32) {
        (m[0] * u + m[2] * v + m[4], m[1] * u + m[3] * v + m[5])
    }

    #[test]
    fn test_matrices_cover_rect() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        for rotation in [
            CardRotation::None,
            CardRotation::Clockwise90,
            CardRotation::CounterClockwise90,
            CardRotation::Rotate180,
        ] {
            let m = image_matrix(&rect, rotation);
            let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)].map(|(u, v)| apply(m, u, v));
            let min_x = corners.iter().map(|c| c.0).fold(f32::MAX, f32::min);
            let max_y = corners.iter().map(|c| c.1).fold(f32::MIN, f32::max);
            assert_eq!(min_x, 10.0, "{rotation:?}");
            assert_eq!(max_y, 70.0, "{rotation:?}");
        }
    }

    #[test]
    fn test_clockwise_puts_image_top_on_the_right() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let m = image_matrix(&rect, CardRotation::Clockwise90);
        // Top-left corner of the image lands top-right
        assert_eq!(apply(m, 0.0, 1.0), (100.0, 50.0));
    }

    #[test]
    fn test_placeholder_is_shared() {
        let mut sink = PdfSink::new((200.0, 200.0));
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        sink.draw_image(&ImageSource::Placeholder, rect, CardRotation::None)
            .unwrap();
        sink.draw_image(&ImageSource::Placeholder, rect, CardRotation::Rotate180)
            .unwrap();
        assert_eq!(sink.images.len(), 1);
        sink.show_page().unwrap();

        let doc = sink.finish().unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_missing_file_falls_back_to_placeholder() {
        let mut sink = PdfSink::new((200.0, 200.0));
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let missing = ImageSource::File("/nonexistent/card.png".into());
        sink.draw_image(&missing, rect, CardRotation::None).unwrap();
        let placeholder = sink.images[&ImageSource::Placeholder].1;
        assert_eq!(sink.images[&missing].1, placeholder);
    }

    #[test]
    fn test_empty_document_has_empty_page_tree() {
        let sink = PdfSink::new((200.0, 200.0));
        let doc = sink.finish().unwrap();
        assert!(doc.get_pages().is_empty());

        let catalog = doc.catalog().unwrap();
        let pages_id = catalog.get(b"Pages").unwrap().as_reference().unwrap();
        let pages = doc.get_dictionary(pages_id).unwrap();
        assert_eq!(pages.get(b"Count").unwrap().as_i64().unwrap(), 0);
        assert!(pages.get(b"Kids").unwrap().as_array().unwrap().is_empty());
    }
}
