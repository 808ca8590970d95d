use crate::cell::{CellCoord, WorldSize};
use crate::spatial::CellRect;

/// Top-left world-pixel position and zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World x of the screen's left edge.
    pub x: f32,
    /// World y of the screen's top edge.
    pub y: f32,
    /// Screen pixels per world pixel.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Moves the camera.
    pub fn set_pos(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Sets zoom, clamped to `[min, max]`.
    pub fn set_zoom(&mut self, zoom: f32, min: f32, max: f32) {
        self.zoom = zoom.clamp(min, max);
    }

    /// Multiplies zoom by `factor`, keeping the world point under screen
    /// position `(px, py)` fixed.
    pub fn zoom_at(&mut self, factor: f32, px: f32, py: f32, min: f32, max: f32) {
        let wx = self.x + px / self.zoom;
        let wy = self.y + py / self.zoom;
        self.set_zoom(self.zoom * factor, min, max);
        self.x = wx - px / self.zoom;
        self.y = wy - py / self.zoom;
    }

    /// Keeps the view over the world; a world smaller than the screen pins to 0.
    pub fn clamp_to_world(&mut self, world: WorldSize, cell_px: f32, screen_w: f32, screen_h: f32) {
        let max_x = (world.width as f32 * cell_px - screen_w / self.zoom).max(0.0);
        let max_y = (world.height as f32 * cell_px - screen_h / self.zoom).max(0.0);
        self.x = self.x.clamp(0.0, max_x);
        self.y = self.y.clamp(0.0, max_y);
    }

    /// Screen pixel to world pixel.
    pub fn screen_to_world(&self, sx: f32, sy: f32) -> (f32, f32) {
        (self.x + sx / self.zoom, self.y + sy / self.zoom)
    }

    /// Screen pixel to grid cell.
    pub fn screen_to_cell(&self, sx: f32, sy: f32, cell_px: f32) -> CellCoord {
        let (wx, wy) = self.screen_to_world(sx, sy);
        CellCoord::new((wx / cell_px).floor() as i32, (wy / cell_px).floor() as i32)
    }

    /// Cells on screen, padded by one cell each side.
    pub fn visible_cells(&self, cell_px: f32, screen_w: f32, screen_h: f32) -> CellRect {
        let (right, bottom) = self.screen_to_world(screen_w, screen_h);
        CellRect::new(
            CellCoord::new(
                (self.x / cell_px).floor() as i32 - 1,
                (self.y / cell_px).floor() as i32 - 1,
            ),
            CellCoord::new(
                (right / cell_px).ceil() as i32 + 1,
                (bottom / cell_px).ceil() as i32 + 1,
            ),
        )
    }
}
