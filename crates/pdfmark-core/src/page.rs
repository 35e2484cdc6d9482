//! Document and page access consumed by the placement engine
//!
//! The engine itself never walks the document tree; it talks to a
//! [`RenderSurface`], which resolves the page under the viewport, supplies
//! page bounds, converts between view and page space, and owns the
//! annotation collections. [`DocumentView`] is the lopdf-backed
//! implementation.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};

use crate::annotation::PageAnnotation;
use crate::coords::{page_to_view_rect, view_to_page_rect, Viewport};
use crate::error::MarkupError;
use crate::geom::Rect;
use crate::render;
use crate::selection::TextSelection;

/// US Letter, the fallback when a page carries no usable box.
const DEFAULT_PAGE_BOUNDS: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 612.0,
    height: 792.0,
};

/// Stable reference to a page, by 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageHandle(pub u32);

impl PageHandle {
    pub fn number(&self) -> u32 {
        self.0
    }
}

/// Which page box to read bounds from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBox {
    Media,
    /// Crop region; falls back to the media box when absent.
    Crop,
}

/// The boundary between the placement engine and the hosting document view.
pub trait RenderSurface {
    /// The page currently under the viewport, if any.
    fn current_page(&self) -> Option<PageHandle>;

    /// Bounds of the given box in the page's own coordinate space.
    fn page_bounds(&self, page: PageHandle, page_box: PageBox) -> Rect;

    fn view_to_page(&self, rect: Rect, page: PageHandle) -> Rect;

    fn page_to_view(&self, rect: Rect, page: PageHandle) -> Rect;

    /// Append a permanent annotation to the page's collection.
    fn add_annotation(
        &mut self,
        page: PageHandle,
        annotation: PageAnnotation,
    ) -> Result<(), MarkupError>;

    fn current_selection(&self) -> Option<&TextSelection>;

    fn clear_selection(&mut self);
}

/// A viewed PDF document: the parsed file plus the transient view state the
/// engine reads (viewport, current page, text selection).
pub struct DocumentView {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
    viewport: Viewport,
    current_page: Option<PageHandle>,
    selection: Option<TextSelection>,
}

impl DocumentView {
    /// Parse a PDF from memory. The view starts on the first page at 1:1
    /// zoom with no selection.
    pub fn open(bytes: &[u8]) -> Result<Self, MarkupError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| MarkupError::ParseError(e.to_string()))?;
        let pages = doc.get_pages();
        let current_page = pages.keys().next().copied().map(PageHandle);
        Ok(Self {
            doc,
            pages,
            viewport: Viewport::default(),
            current_page,
            selection: None,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update scroll/zoom state. Callers must keep `zoom` positive.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Set which page sits under the viewport; `None` when no page is
    /// visible. Unknown page numbers resolve to `None`.
    pub fn set_current_page(&mut self, page: Option<u32>) {
        self.current_page = page
            .filter(|number| self.pages.contains_key(number))
            .map(PageHandle);
    }

    pub fn set_selection(&mut self, selection: Option<TextSelection>) {
        self.selection = selection;
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Serialize the document, annotations included.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, MarkupError> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| MarkupError::OperationError(e.to_string()))?;
        Ok(buffer)
    }

    fn page_dict(&self, page: PageHandle) -> Option<&lopdf::Dictionary> {
        let page_id = *self.pages.get(&page.number())?;
        self.doc.get_object(page_id).ok()?.as_dict().ok()
    }

    fn box_rect(&self, page: PageHandle, key: &[u8]) -> Option<Rect> {
        let obj = self.page_dict(page)?.get(key).ok()?;
        let arr = match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_array().ok()?,
            Object::Array(arr) => arr,
            _ => return None,
        };
        if arr.len() != 4 {
            return None;
        }
        let mut v = [0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            v[i] = match obj {
                Object::Integer(n) => *n as f64,
                Object::Real(r) => f64::from(*r),
                _ => return None,
            };
        }
        let rect = Rect::new(
            v[0].min(v[2]),
            v[1].min(v[3]),
            (v[2] - v[0]).abs(),
            (v[3] - v[1]).abs(),
        );
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }
}

impl RenderSurface for DocumentView {
    fn current_page(&self) -> Option<PageHandle> {
        self.current_page
    }

    fn page_bounds(&self, page: PageHandle, page_box: PageBox) -> Rect {
        match page_box {
            PageBox::Media => self.box_rect(page, b"MediaBox"),
            PageBox::Crop => self
                .box_rect(page, b"CropBox")
                .or_else(|| self.box_rect(page, b"MediaBox")),
        }
        .unwrap_or(DEFAULT_PAGE_BOUNDS)
    }

    fn view_to_page(&self, rect: Rect, page: PageHandle) -> Rect {
        let bounds = self.page_bounds(page, PageBox::Crop);
        view_to_page_rect(rect, &self.viewport, &bounds)
    }

    fn page_to_view(&self, rect: Rect, page: PageHandle) -> Rect {
        let bounds = self.page_bounds(page, PageBox::Crop);
        page_to_view_rect(rect, &self.viewport, &bounds)
    }

    fn add_annotation(
        &mut self,
        page: PageHandle,
        annotation: PageAnnotation,
    ) -> Result<(), MarkupError> {
        let page_id = *self
            .pages
            .get(&page.number())
            .ok_or(MarkupError::MissingPage(page.number()))?;
        render::append_annotation(&mut self.doc, page_id, &annotation)?;
        Ok(())
    }

    fn current_selection(&self) -> Option<&TextSelection> {
        self.selection.as_ref()
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }
}
