//! Writing annotations into PDF pages
//!
//! Built-in stamp rendering in most viewers draws a bordered placeholder, so
//! stamps here carry their own appearance stream: a form XObject that paints
//! the raw image into the annotation rect with no border stroke and no
//! background fill. Highlights use the standard Highlight subtype with quad
//! points and a translucent fill.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::annotation::{HighlightAnnotation, PageAnnotation, StampAnnotation};
use crate::error::MarkupError;

/// A page's `/Rotate` entry, normalized to a quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl PageRotation {
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => PageRotation::Quarter,
            180 => PageRotation::Half,
            270 => PageRotation::ThreeQuarter,
            _ => PageRotation::None,
        }
    }

    /// Appearance-stream matrix carrying the page's rotation into form space.
    fn matrix(self) -> [f64; 6] {
        match self {
            PageRotation::None => [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            PageRotation::Quarter => [0.0, 1.0, -1.0, 0.0, 0.0, 0.0],
            PageRotation::Half => [-1.0, 0.0, 0.0, -1.0, 0.0, 0.0],
            PageRotation::ThreeQuarter => [0.0, -1.0, 1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Anything that can build its own annotation object inside a document,
/// honoring the target page's transform.
pub trait Renderable {
    /// Allocate the annotation dictionary and any appearance objects in
    /// `doc`, returning the annotation's object id. The id is not yet linked
    /// to a page.
    fn render(&self, doc: &mut Document, rotation: PageRotation) -> Result<ObjectId, MarkupError>;
}

impl Renderable for StampAnnotation {
    fn render(&self, doc: &mut Document, rotation: PageRotation) -> Result<ObjectId, MarkupError> {
        if self.image.is_empty() {
            return Err(MarkupError::InvalidImage(
                "cannot render an empty image".to_string(),
            ));
        }

        let width = i64::from(self.image.width());
        let height = i64::from(self.image.height());

        // Alpha channel as a soft mask so transparent strokes composite as-is
        let mut smask_dict = Dictionary::new();
        smask_dict.set("Type", Object::Name(b"XObject".to_vec()));
        smask_dict.set("Subtype", Object::Name(b"Image".to_vec()));
        smask_dict.set("Width", Object::Integer(width));
        smask_dict.set("Height", Object::Integer(height));
        smask_dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
        smask_dict.set("BitsPerComponent", Object::Integer(8));
        let smask_id = doc.add_object(Object::Stream(Stream::new(
            smask_dict,
            self.image.alpha_channel(),
        )));

        let mut image_dict = Dictionary::new();
        image_dict.set("Type", Object::Name(b"XObject".to_vec()));
        image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
        image_dict.set("Width", Object::Integer(width));
        image_dict.set("Height", Object::Integer(height));
        image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
        image_dict.set("BitsPerComponent", Object::Integer(8));
        image_dict.set("SMask", Object::Reference(smask_id));
        let image_id = doc.add_object(Object::Stream(Stream::new(
            image_dict,
            self.image.rgb_channel(),
        )));

        // The image is the entire appearance: no border stroke, no fill
        let content = format!(
            "q\n{w} 0 0 {h} 0 0 cm\n/Im0 Do\nQ",
            w = self.rect.width,
            h = self.rect.height,
        );

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut form_dict = Dictionary::new();
        form_dict.set("Type", Object::Name(b"XObject".to_vec()));
        form_dict.set("Subtype", Object::Name(b"Form".to_vec()));
        form_dict.set("FormType", Object::Integer(1));
        form_dict.set(
            "BBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.rect.width as f32),
                Object::Real(self.rect.height as f32),
            ]),
        );
        form_dict.set(
            "Matrix",
            Object::Array(
                rotation
                    .matrix()
                    .iter()
                    .map(|v| Object::Real(*v as f32))
                    .collect(),
            ),
        );
        form_dict.set("Resources", Object::Dictionary(resources));
        let form_id = doc.add_object(Object::Stream(Stream::new(form_dict, content.into_bytes())));

        let mut ap_dict = Dictionary::new();
        ap_dict.set("N", Object::Reference(form_id));

        let mut annot = Dictionary::new();
        annot.set("Type", Object::Name(b"Annot".to_vec()));
        annot.set("Subtype", Object::Name(b"Stamp".to_vec()));
        annot.set(
            "Rect",
            Object::Array(vec![
                Object::Real(self.rect.x as f32),
                Object::Real(self.rect.y as f32),
                Object::Real(self.rect.max_x() as f32),
                Object::Real(self.rect.max_y() as f32),
            ]),
        );
        annot.set("F", Object::Integer(4)); // Print flag
        annot.set("AP", Object::Dictionary(ap_dict));

        Ok(doc.add_object(Object::Dictionary(annot)))
    }
}

impl Renderable for HighlightAnnotation {
    fn render(&self, doc: &mut Document, _rotation: PageRotation) -> Result<ObjectId, MarkupError> {
        let mut annot = Dictionary::new();
        annot.set("Type", Object::Name(b"Annot".to_vec()));
        annot.set("Subtype", Object::Name(b"Highlight".to_vec()));
        annot.set(
            "Rect",
            Object::Array(vec![
                Object::Real(self.rect.x as f32),
                Object::Real(self.rect.y as f32),
                Object::Real(self.rect.max_x() as f32),
                Object::Real(self.rect.max_y() as f32),
            ]),
        );
        // QuadPoints: top-left, top-right, bottom-left, bottom-right
        annot.set(
            "QuadPoints",
            Object::Array(vec![
                Object::Real(self.rect.x as f32),
                Object::Real(self.rect.max_y() as f32),
                Object::Real(self.rect.max_x() as f32),
                Object::Real(self.rect.max_y() as f32),
                Object::Real(self.rect.x as f32),
                Object::Real(self.rect.y as f32),
                Object::Real(self.rect.max_x() as f32),
                Object::Real(self.rect.y as f32),
            ]),
        );
        annot.set("CA", Object::Real(self.color.opacity));
        annot.set(
            "C",
            Object::Array(vec![
                Object::Real(self.color.r),
                Object::Real(self.color.g),
                Object::Real(self.color.b),
            ]),
        );
        annot.set("F", Object::Integer(4));

        Ok(doc.add_object(Object::Dictionary(annot)))
    }
}

/// Render `annotation` under the page's own transform and append it to the
/// page's annotation collection.
pub fn append_annotation(
    doc: &mut Document,
    page_id: ObjectId,
    annotation: &PageAnnotation,
) -> Result<ObjectId, MarkupError> {
    let rotation = page_rotation(doc, page_id);
    let annot_id = match annotation {
        PageAnnotation::Stamp(stamp) => stamp.render(doc, rotation)?,
        PageAnnotation::Highlight(highlight) => highlight.render(doc, rotation)?,
    };
    push_page_annot(doc, page_id, annot_id)?;
    Ok(annot_id)
}

fn page_rotation(doc: &Document, page_id: ObjectId) -> PageRotation {
    doc.get_object(page_id)
        .ok()
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|dict| dict.get(b"Rotate").ok())
        .and_then(|obj| obj.as_i64().ok())
        .map(PageRotation::from_degrees)
        .unwrap_or_default()
}

fn push_page_annot(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), MarkupError> {
    // Annots may be an inline array or a reference to a shared one
    let annots_ref = doc
        .get_object(page_id)
        .ok()
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|dict| dict.get(b"Annots").ok())
        .and_then(|obj| obj.as_reference().ok());

    if let Some(array_id) = annots_ref {
        let array = doc
            .get_object_mut(array_id)
            .map_err(|e| MarkupError::OperationError(e.to_string()))?;
        if let Object::Array(ref mut arr) = array {
            arr.push(Object::Reference(annot_id));
            return Ok(());
        }
        return Err(MarkupError::OperationError(
            "Annots reference is not an array".to_string(),
        ));
    }

    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| MarkupError::OperationError(e.to_string()))?;
    let page_dict = page
        .as_dict_mut()
        .map_err(|_| MarkupError::OperationError("page is not a dictionary".to_string()))?;
    if let Ok(Object::Array(ref mut arr)) = page_dict.get_mut(b"Annots") {
        arr.push(Object::Reference(annot_id));
    } else {
        page_dict.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::HighlightColor;
    use crate::geom::Rect;
    use crate::image::SourceImage;

    fn create_test_pdf(rotate: Option<i64>) -> Vec<u8> {
        use lopdf::{dictionary, Document, Object};

        let mut doc = Document::with_version("1.7");
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        if let Some(degrees) = rotate {
            page_dict.set("Rotate", Object::Integer(degrees));
        }
        let page_id = doc.add_object(page_dict);
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn test_image(width: u32, height: u32) -> SourceImage {
        SourceImage::from_rgba8(vec![128u8; (width * height * 4) as usize], width, height).unwrap()
    }

    fn object_as_f32(obj: &Object) -> f32 {
        match obj {
            Object::Real(v) => *v,
            Object::Integer(v) => *v as f32,
            other => panic!("not a number: {:?}", other),
        }
    }

    fn first_page_annots(doc: &Document) -> Vec<ObjectId> {
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        match page.get(b"Annots") {
            Ok(Object::Array(arr)) => arr
                .iter()
                .filter_map(|obj| obj.as_reference().ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_stamp_produces_valid_pdf() {
        let pdf = create_test_pdf(None);
        let mut doc = Document::load_mem(&pdf).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        let stamp = PageAnnotation::Stamp(StampAnnotation {
            rect: Rect::new(100.0, 200.0, 150.0, 75.0),
            image: test_image(4, 2),
        });
        append_annotation(&mut doc, page_id, &stamp).unwrap();

        let mut output = Vec::new();
        doc.save_to(&mut output).unwrap();
        assert!(output.starts_with(b"%PDF-"));

        let reloaded = Document::load_mem(&output).unwrap();
        let annots = first_page_annots(&reloaded);
        assert_eq!(annots.len(), 1);

        let annot = reloaded.get_object(annots[0]).unwrap().as_dict().unwrap();
        assert_eq!(
            annot.get(b"Subtype").unwrap().as_name().unwrap(),
            b"Stamp"
        );
        // Appearance stream must be present: built-in stamp rendering would
        // draw a bordered placeholder otherwise
        assert!(annot.get(b"AP").is_ok());
    }

    #[test]
    fn test_stamp_appearance_is_borderless_image() {
        let pdf = create_test_pdf(None);
        let mut doc = Document::load_mem(&pdf).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        let stamp = PageAnnotation::Stamp(StampAnnotation {
            rect: Rect::new(0.0, 0.0, 100.0, 50.0),
            image: test_image(2, 2),
        });
        let annot_id = append_annotation(&mut doc, page_id, &stamp).unwrap();

        let annot = doc.get_object(annot_id).unwrap().as_dict().unwrap();
        let ap = annot.get(b"AP").unwrap().as_dict().unwrap();
        let form_id = ap.get(b"N").unwrap().as_reference().unwrap();
        let form = match doc.get_object(form_id).unwrap() {
            Object::Stream(stream) => stream,
            other => panic!("appearance is not a stream: {:?}", other),
        };

        let content = String::from_utf8_lossy(&form.content);
        assert!(content.contains("/Im0 Do"), "content: {}", content);
        // No stroke or fill operators
        assert!(!content.contains(" re S"));
        assert!(!content.contains(" re f"));
    }

    #[test]
    fn test_stamp_embeds_alpha_as_smask() {
        let pdf = create_test_pdf(None);
        let mut doc = Document::load_mem(&pdf).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        let stamp = PageAnnotation::Stamp(StampAnnotation {
            rect: Rect::new(0.0, 0.0, 100.0, 50.0),
            image: test_image(3, 3),
        });
        let annot_id = append_annotation(&mut doc, page_id, &stamp).unwrap();

        let annot = doc.get_object(annot_id).unwrap().as_dict().unwrap();
        let ap = annot.get(b"AP").unwrap().as_dict().unwrap();
        let form_id = ap.get(b"N").unwrap().as_reference().unwrap();
        let form = match doc.get_object(form_id).unwrap() {
            Object::Stream(stream) => stream,
            other => panic!("appearance is not a stream: {:?}", other),
        };
        let resources = form.dict.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
        let image = match doc.get_object(image_id).unwrap() {
            Object::Stream(stream) => stream,
            other => panic!("image is not a stream: {:?}", other),
        };

        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 3);
        assert!(image.dict.get(b"SMask").is_ok());
        // 3x3 RGB payload
        assert_eq!(image.content.len(), 27);
    }

    #[test]
    fn test_stamp_rejects_empty_image() {
        let pdf = create_test_pdf(None);
        let mut doc = Document::load_mem(&pdf).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        let stamp = PageAnnotation::Stamp(StampAnnotation {
            rect: Rect::new(0.0, 0.0, 100.0, 50.0),
            image: SourceImage::from_rgba8(Vec::new(), 0, 0).unwrap(),
        });
        assert!(append_annotation(&mut doc, page_id, &stamp).is_err());
        assert!(first_page_annots(&doc).is_empty());
    }

    #[test]
    fn test_rotated_page_sets_appearance_matrix() {
        let pdf = create_test_pdf(Some(90));
        let mut doc = Document::load_mem(&pdf).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        let stamp = PageAnnotation::Stamp(StampAnnotation {
            rect: Rect::new(0.0, 0.0, 100.0, 50.0),
            image: test_image(2, 2),
        });
        let annot_id = append_annotation(&mut doc, page_id, &stamp).unwrap();

        let annot = doc.get_object(annot_id).unwrap().as_dict().unwrap();
        let ap = annot.get(b"AP").unwrap().as_dict().unwrap();
        let form_id = ap.get(b"N").unwrap().as_reference().unwrap();
        let form = match doc.get_object(form_id).unwrap() {
            Object::Stream(stream) => stream,
            other => panic!("appearance is not a stream: {:?}", other),
        };
        let matrix = form.dict.get(b"Matrix").unwrap().as_array().unwrap();
        let values: Vec<f32> = matrix.iter().map(object_as_f32).collect();
        assert_eq!(values, vec![0.0, 1.0, -1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_highlight_produces_quad_points_and_color() {
        let pdf = create_test_pdf(None);
        let mut doc = Document::load_mem(&pdf).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        let highlight = PageAnnotation::Highlight(HighlightAnnotation {
            rect: Rect::new(50.0, 600.0, 300.0, 20.0),
            color: HighlightColor::new(0.0, 1.0, 0.0, 0.5),
        });
        append_annotation(&mut doc, page_id, &highlight).unwrap();

        let annots = first_page_annots(&doc);
        assert_eq!(annots.len(), 1);
        let annot = doc.get_object(annots[0]).unwrap().as_dict().unwrap();
        assert_eq!(
            annot.get(b"Subtype").unwrap().as_name().unwrap(),
            b"Highlight"
        );
        let quads = annot.get(b"QuadPoints").unwrap().as_array().unwrap();
        assert_eq!(quads.len(), 8);
        let color = annot.get(b"C").unwrap().as_array().unwrap();
        assert_eq!(object_as_f32(&color[1]), 1.0);
        assert_eq!(object_as_f32(annot.get(b"CA").unwrap()), 0.5);
    }

    #[test]
    fn test_multiple_annotations_accumulate() {
        let pdf = create_test_pdf(None);
        let mut doc = Document::load_mem(&pdf).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        for i in 0..3 {
            let highlight = PageAnnotation::Highlight(HighlightAnnotation {
                rect: Rect::new(50.0, 600.0 - f64::from(i) * 25.0, 300.0, 20.0),
                color: HighlightColor::yellow(),
            });
            append_annotation(&mut doc, page_id, &highlight).unwrap();
        }

        assert_eq!(first_page_annots(&doc).len(), 3);
    }

    #[test]
    fn test_rotation_normalization() {
        assert_eq!(PageRotation::from_degrees(0), PageRotation::None);
        assert_eq!(PageRotation::from_degrees(90), PageRotation::Quarter);
        assert_eq!(PageRotation::from_degrees(450), PageRotation::Quarter);
        assert_eq!(PageRotation::from_degrees(-90), PageRotation::ThreeQuarter);
        assert_eq!(PageRotation::from_degrees(180), PageRotation::Half);
    }
}
