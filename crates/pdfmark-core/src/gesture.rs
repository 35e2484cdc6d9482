//! Gesture sessions driving live placement updates
//!
//! Gesture frameworks report cumulative deltas since the gesture began, so
//! feeding them straight into a rect that is itself being mutated compounds
//! the delta every frame. Each gesture therefore snapshots a base rect on its
//! first event and recomputes the candidate from that snapshot on every tick.
//! Translate and scale keep independent snapshots: when both run at once,
//! each applies its own delta to its own base rather than to the other
//! gesture's in-progress output, so the two do not compose within a frame.

use tracing::trace;

use crate::geom::{Point, Rect};
use crate::page::RenderSurface;
use crate::placement::PlacementController;

/// Scale factors below this are floored before resizing.
pub const MIN_SCALE_FACTOR: f64 = 0.2;

/// Floor applied to scaled dimensions, in view units.
pub const MIN_SCALED_DIM: f64 = 20.0;

#[derive(Debug, Clone, Copy)]
struct DragSession {
    base: Rect,
}

#[derive(Debug, Clone, Copy)]
struct ScaleSession {
    base: Rect,
    center: Point,
}

/// Bridges translate and scale gesture streams onto the controller's update
/// entry point. All rects here are in view space.
#[derive(Debug, Default)]
pub struct GestureAdapter {
    drag: Option<DragSession>,
    scale: Option<ScaleSession>,
}

impl GestureAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one tick of a translate gesture. `translation` is the cumulative
    /// offset since the gesture began.
    ///
    /// The first tick of a gesture snapshots the controller's current view
    /// rect as the drag base; every tick offsets that base, never the live
    /// rect. Ignored while no placement is active.
    pub fn drag_changed<S: RenderSurface>(
        &mut self,
        controller: &mut PlacementController,
        surface: &S,
        translation: (f64, f64),
    ) {
        let base = match self.drag {
            Some(session) => session.base,
            None => {
                let Some(rect) = controller.current_view_rect(surface) else {
                    return;
                };
                trace!("drag session started");
                self.drag = Some(DragSession { base: rect });
                rect
            }
        };
        let candidate = base.offset_by(translation.0, translation.1);
        controller.update_placement(surface, candidate);
    }

    /// End the translate gesture, dropping its base snapshot.
    pub fn drag_ended(&mut self) {
        self.drag = None;
    }

    /// Feed one tick of a scale gesture. `factor` is the cumulative scale
    /// since the gesture began.
    ///
    /// The first tick snapshots its own base rect and the base's center; the
    /// rect is resized about that fixed center. The factor is floored at
    /// [`MIN_SCALE_FACTOR`] and each dimension at [`MIN_SCALED_DIM`], in that
    /// order. Ignored while no placement is active.
    pub fn scale_changed<S: RenderSurface>(
        &mut self,
        controller: &mut PlacementController,
        surface: &S,
        factor: f64,
    ) {
        let session = match self.scale {
            Some(session) => session,
            None => {
                let Some(rect) = controller.current_view_rect(surface) else {
                    return;
                };
                trace!("scale session started");
                let session = ScaleSession {
                    base: rect,
                    center: rect.center(),
                };
                self.scale = Some(session);
                session
            }
        };
        let factor = factor.max(MIN_SCALE_FACTOR);
        let width = (session.base.width * factor).max(MIN_SCALED_DIM);
        let height = (session.base.height * factor).max(MIN_SCALED_DIM);
        let candidate = Rect::from_center(session.center, width, height);
        controller.update_placement(surface, candidate);
    }

    /// End the scale gesture, dropping its base snapshot.
    pub fn scale_ended(&mut self) {
        self.scale = None;
    }

    /// True while either gesture holds a live snapshot.
    pub fn has_active_gesture(&self) -> bool {
        self.drag.is_some() || self.scale.is_some()
    }
}
