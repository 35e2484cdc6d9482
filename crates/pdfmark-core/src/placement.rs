//! In-flight stamp placement: state and controller
//!
//! A placement session starts when the host hands over a raster image, lives
//! through any number of gesture-driven rect updates, and ends when the user
//! confirms (the rect and image become a permanent stamp annotation) or
//! cancels. The controller owns the session state exclusively; the UI reads
//! the current rect through it and subscribes to a change callback instead of
//! sharing a mutable reference.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::annotation::{PageAnnotation, StampAnnotation};
use crate::geom::Rect;
use crate::image::SourceImage;
use crate::page::{PageBox, PageHandle, RenderSurface};

/// Floor for the initial rect's dimensions, in page units.
pub const MIN_INITIAL_DIM: f64 = 10.0;

/// Floor maintained by the clamp policy on every update, in page units.
pub const MIN_PLACEMENT_DIM: f64 = 20.0;

/// The single in-flight placement. Created by `begin_placement`, consumed by
/// `confirm_placement`, dropped by `cancel_placement`. Only the rect changes
/// during the session; the image and target page are fixed.
#[derive(Debug, Clone)]
struct PlacementState {
    image: SourceImage,
    page: PageHandle,
    rect: Rect,
}

type ChangeCallback = Box<dyn FnMut(Rect)>;

/// Owns the placement lifecycle: begin, update, confirm, cancel.
///
/// All entry points run on the UI thread; updates are cheap (a conversion, a
/// clamp, a callback) and safe to call once per gesture tick.
#[derive(Default)]
pub struct PlacementController {
    state: Option<PlacementState>,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for PlacementController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacementController")
            .field("state", &self.state)
            .field("has_on_change", &self.on_change.is_some())
            .finish()
    }
}

impl PlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the redraw hook. Called synchronously with the new page-space
    /// rect after every stored update.
    pub fn set_on_change(&mut self, callback: impl FnMut(Rect) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Start a placement session for `image` on the page currently under the
    /// viewport.
    ///
    /// The initial rect is centered on the page: width is the image's natural
    /// width capped at half the page width, height follows the image's aspect
    /// ratio, both floored at [`MIN_INITIAL_DIM`]. Returns `false` without
    /// creating state when no page is visible or the image is empty. An
    /// already-active session is discarded first, never merged.
    pub fn begin_placement<S: RenderSurface>(&mut self, surface: &S, image: SourceImage) -> bool {
        let Some(page) = surface.current_page() else {
            debug!("placement rejected: no page under the viewport");
            return false;
        };
        if image.is_empty() {
            debug!("placement rejected: empty source image");
            return false;
        }
        if self.state.take().is_some() {
            debug!("active placement replaced");
        }

        let bounds = surface.page_bounds(page, PageBox::Crop);
        let width = f64::from(image.width())
            .min(bounds.width * 0.5)
            .max(MIN_INITIAL_DIM);
        let height = (width * image.aspect_ratio()).max(MIN_INITIAL_DIM);
        let rect = Rect::from_center(bounds.center(), width, height);

        debug!(page = page.number(), "placement started");
        self.state = Some(PlacementState { image, page, rect });
        true
    }

    /// Feed a candidate rect in view space, usually straight from a gesture.
    ///
    /// The rect is converted to the target page's space, clamped fully inside
    /// the page bounds at no less than [`MIN_PLACEMENT_DIM`] per axis, stored,
    /// and pushed to the change callback. No-op while idle.
    pub fn update_placement<S: RenderSurface>(&mut self, surface: &S, view_rect: Rect) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let bounds = surface.page_bounds(state.page, PageBox::Crop);
        let candidate = surface.view_to_page(view_rect, state.page);
        let clamped = candidate.clamped_into(&bounds, MIN_PLACEMENT_DIM, MIN_PLACEMENT_DIM);
        state.rect = clamped;
        trace!(
            x = clamped.x,
            y = clamped.y,
            width = clamped.width,
            height = clamped.height,
            "placement rect updated"
        );
        if let Some(callback) = self.on_change.as_mut() {
            callback(clamped);
        }
    }

    /// The live rect in page space, if a session is active.
    pub fn current_rect(&self) -> Option<Rect> {
        self.state.as_ref().map(|state| state.rect)
    }

    /// The live rect converted to view space, if a session is active.
    pub fn current_view_rect<S: RenderSurface>(&self, surface: &S) -> Option<Rect> {
        self.state
            .as_ref()
            .map(|state| surface.page_to_view(state.rect, state.page))
    }

    pub fn has_active_placement(&self) -> bool {
        self.state.is_some()
    }

    /// Discard the active session, if any. Safe to call while idle.
    pub fn cancel_placement(&mut self) {
        if self.state.take().is_some() {
            debug!("placement cancelled");
        }
    }

    /// Commit the active session as a stamp annotation on its target page.
    ///
    /// With no active session this is a successful no-op. The session state
    /// is consumed either way; if the page rejects the annotation (for
    /// example a handle left dangling by host-side page edits) the call
    /// returns `false` and the engine is back in the idle state.
    pub fn confirm_placement<S: RenderSurface>(&mut self, surface: &mut S) -> bool {
        let Some(state) = self.state.take() else {
            return true;
        };
        let page = state.page;
        let annotation = PageAnnotation::Stamp(StampAnnotation {
            rect: state.rect,
            image: state.image,
        });
        match surface.add_annotation(page, annotation) {
            Ok(()) => {
                debug!(page = page.number(), "placement committed");
                true
            }
            Err(err) => {
                warn!(%err, page = page.number(), "placement commit failed");
                false
            }
        }
    }
}
