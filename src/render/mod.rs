//! Render planning: which objects to paint for a view, and in what order.

mod cull;
mod draw;

pub use cull::{render_list, DrawItem};
pub use draw::{draw_plan, TileDrawer};

#[cfg(feature = "macroquad")]
pub use draw::MacroquadDrawer;
