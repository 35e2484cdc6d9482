//! Interactive placement of stamp and highlight annotations on PDF pages
//!
//! This crate is the core of a document markup tool: the host hands over a
//! pre-rendered raster (a drawn signature, an imported graphic) and the
//! engine runs the live placement session - an initial centered rect,
//! drag/resize updates clamped inside the page, and a final commit that
//! writes a borderless image stamp into the page's annotation collection.
//! Text selections turn into per-line highlight annotations the same way.
//!
//! The host UI talks to two objects:
//! - [`PlacementController`] owns the session lifecycle
//!   (begin/update/confirm/cancel) and pushes rect changes to a redraw
//!   callback.
//! - [`GestureAdapter`] converts cumulative translate/scale gesture deltas
//!   into controller updates without compounding drift.
//!
//! Document access goes through the [`RenderSurface`] boundary;
//! [`DocumentView`] implements it on top of lopdf.

pub mod annotation;
pub mod coords;
pub mod error;
pub mod geom;
pub mod gesture;
pub mod image;
pub mod page;
pub mod placement;
pub mod render;
pub mod selection;

pub use annotation::{HighlightAnnotation, HighlightColor, PageAnnotation, StampAnnotation};
pub use coords::Viewport;
pub use error::MarkupError;
pub use geom::{Point, Rect};
pub use gesture::GestureAdapter;
pub use image::SourceImage;
pub use page::{DocumentView, PageBox, PageHandle, RenderSurface};
pub use placement::PlacementController;
pub use render::Renderable;
pub use selection::{highlight_selection, LineSelection, TextSelection};
