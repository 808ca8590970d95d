use crate::render::cull::DrawItem;

/// Backend that paints one tile. `x`/`y` is the top-left corner and `size`
/// the edge length, all in world pixels.
pub trait TileDrawer {
    /// Paints `tile` over the square at `(x, y)`.
    fn draw(&mut self, tile: &str, x: f32, y: f32, size: f32);
}

/// Feeds a sorted render list to `drawer`, in order.
pub fn draw_plan<D: TileDrawer + ?Sized>(items: &[DrawItem], drawer: &mut D) {
    for item in items {
        drawer.draw(&item.tile, item.x, item.y, item.extent);
    }
}

#[cfg(feature = "macroquad")]
pub use mq::MacroquadDrawer;

#[cfg(feature = "macroquad")]
mod mq {
    use super::TileDrawer;
    use crate::camera::Camera;
    use crate::tileset::{GeneratedTile, Pattern, Rgb, TileCatalog};
    use macroquad::prelude::*;

    fn color(c: Rgb) -> Color {
        Color::from_rgba(c.0, c.1, c.2, 255)
    }

    // Seeded by world position so stippling stays put across frames.
    fn hash(x: i32, y: i32, i: u32) -> u32 {
        let mut h = (x as u32).wrapping_mul(0x9e37_79b1) ^ (y as u32).wrapping_mul(0x85eb_ca6b) ^ i;
        h ^= h >> 15;
        h = h.wrapping_mul(0x2c1b_3c6d);
        h ^ (h >> 12)
    }

    /// Immediate-mode macroquad painter: flat fills and strokes for generated
    /// tiles, text glyphs for everything else.
    pub struct MacroquadDrawer<'a> {
        catalog: &'a TileCatalog,
        camera: Camera,
        font: Option<Font>,
    }

    impl<'a> MacroquadDrawer<'a> {
        /// Drawer for one frame seen through `camera`.
        pub fn new(catalog: &'a TileCatalog, camera: Camera) -> Self {
            MacroquadDrawer {
                catalog,
                camera,
                font: None,
            }
        }

        /// Uses `font` for glyph tiles instead of the built-in one.
        pub fn with_font(mut self, font: Font) -> Self {
            self.font = Some(font);
            self
        }

        fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
            (
                (x - self.camera.x) * self.camera.zoom,
                (y - self.camera.y) * self.camera.zoom,
            )
        }

        fn draw_generated(&self, def: &GeneratedTile, sx: f32, sy: f32, side: f32, seed: (i32, i32)) {
            draw_rectangle(sx, sy, side, side, color(def.base_color()));
            match *def {
                GeneratedTile::Color(_) => {}
                GeneratedTile::Noise { dots, density, .. } => {
                    let n = ((side * side * density) / 16.0).clamp(1.0, 256.0) as u32;
                    let dot = (side / 24.0).max(1.0);
                    for i in 0..n {
                        let h = hash(seed.0, seed.1, i);
                        let dx = (h & 0xffff) as f32 / 65535.0 * (side - dot);
                        let dy = (h >> 16) as f32 / 65535.0 * (side - dot);
                        draw_rectangle(sx + dx, sy + dy, dot, dot, color(dots));
                    }
                }
                GeneratedTile::Pattern { stroke, pattern, .. } => {
                    let c = color(stroke);
                    let t = (side / 16.0).max(1.0);
                    match pattern {
                        Pattern::Waves => {
                            for row in 1..4 {
                                let y = sy + side * row as f32 / 4.0;
                                let w = side / 4.0;
                                for k in 0..4 {
                                    let x0 = sx + w * k as f32;
                                    let lift = if k % 2 == 0 { -t } else { t };
                                    draw_line(x0, y, x0 + w, y + lift, t, c);
                                }
                            }
                        }
                        Pattern::Bricks => {
                            for row in 0..4 {
                                let y = sy + side * row as f32 / 4.0;
                                draw_line(sx, y, sx + side, y, t, c);
                                let shift = if row % 2 == 0 { 0.0 } else { side / 4.0 };
                                for k in 0..2 {
                                    let x = sx + shift + side * k as f32 / 2.0;
                                    draw_line(x, y, x, y + side / 4.0, t, c);
                                }
                            }
                        }
                        Pattern::Rails => {
                            draw_line(sx + side * 0.3, sy, sx + side * 0.3, sy + side, t, c);
                            draw_line(sx + side * 0.7, sy, sx + side * 0.7, sy + side, t, c);
                            for k in 0..4 {
                                let y = sy + side * (k as f32 + 0.5) / 4.0;
                                draw_line(sx + side * 0.2, y, sx + side * 0.8, y, t, c);
                            }
                        }
                        Pattern::Planks => {
                            for k in 1..4 {
                                let y = sy + side * k as f32 / 4.0;
                                draw_line(sx, y, sx + side, y, t, c);
                            }
                        }
                        Pattern::Stripes => {
                            let y = sy + side / 2.0;
                            draw_line(sx + side * 0.1, y, sx + side * 0.4, y, t, c);
                            draw_line(sx + side * 0.6, y, sx + side * 0.9, y, t, c);
                        }
                    }
                }
            }
        }
    }

    impl TileDrawer for MacroquadDrawer<'_> {
        fn draw(&mut self, tile: &str, x: f32, y: f32, size: f32) {
            let (sx, sy) = self.to_screen(x, y);
            let side = size * self.camera.zoom;
            if let Some(def) = self.catalog.generated_def(tile) {
                self.draw_generated(def, sx, sy, side, (x as i32, y as i32));
                return;
            }
            let font_size = (side * 0.8).clamp(1.0, u16::MAX as f32) as u16;
            let dims = measure_text(tile, self.font.as_ref(), font_size, 1.0);
            draw_text_ex(
                tile,
                sx + (side - dims.width) / 2.0,
                sy + (side + dims.offset_y) / 2.0,
                TextParams {
                    font: self.font.as_ref(),
                    font_size,
                    color: WHITE,
                    ..Default::default()
                },
            );
        }
    }
}
