//! Text selections and highlight creation
//!
//! A selection is a list of visually-contiguous line fragments, each anchored
//! to one page. Highlighting turns every line with a renderable bounding rect
//! into one permanent highlight annotation on that line's page.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::annotation::{HighlightAnnotation, HighlightColor, PageAnnotation};
use crate::geom::Rect;
use crate::page::{PageHandle, RenderSurface};

/// One visual line of a text selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSelection {
    page: PageHandle,
    bounds: Rect,
}

impl LineSelection {
    pub fn new(page: PageHandle, bounds: Rect) -> Self {
        Self { page, bounds }
    }

    pub fn page(&self) -> PageHandle {
        self.page
    }

    /// Bounding rect of this line on `page`; empty when the line lives on a
    /// different page.
    pub fn bounds_on_page(&self, page: PageHandle) -> Rect {
        if page == self.page {
            self.bounds
        } else {
            Rect::new(0.0, 0.0, 0.0, 0.0)
        }
    }
}

/// The render surface's current text selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextSelection {
    lines: Vec<LineSelection>,
}

impl TextSelection {
    pub fn new(lines: Vec<LineSelection>) -> Self {
        Self { lines }
    }

    /// The selection decomposed into visually-contiguous rows.
    pub fn lines_by_visual_row(&self) -> &[LineSelection] {
        &self.lines
    }
}

/// Turn the surface's current text selection into permanent highlight
/// annotations, one per visual line, then clear the selection.
///
/// Returns `false` when there is nothing to highlight: no selection, a
/// selection with no lines, or only lines outside any renderable text.
pub fn highlight_selection<S: RenderSurface>(surface: &mut S, color: HighlightColor) -> bool {
    let lines: Vec<LineSelection> = match surface.current_selection() {
        Some(selection) => selection.lines_by_visual_row().to_vec(),
        None => return false,
    };
    if lines.is_empty() {
        return false;
    }

    let mut added = 0usize;
    for line in &lines {
        let rect = line.bounds_on_page(line.page());
        if rect.is_empty() {
            continue;
        }
        let annotation = PageAnnotation::Highlight(HighlightAnnotation { rect, color });
        match surface.add_annotation(line.page(), annotation) {
            Ok(()) => added += 1,
            Err(err) => warn!(%err, page = line.page().number(), "highlight line skipped"),
        }
    }

    if added == 0 {
        return false;
    }
    // Drop the live selection so it doesn't linger next to the new marks
    surface.clear_selection();
    debug!(lines = added, "selection highlighted");
    true
}
