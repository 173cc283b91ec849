//! Displayed page space to PDF user space
//!
//! Displayed space has its origin at the top-left of the visible (crop) box
//! with y growing downward and `/Rotate` applied, which is how MuPDF reports
//! search hits. Content streams are written in user space, origin bottom-left
//! of the unrotated page.

use crate::document::{Point, Rect};

/// Crop box and rotation of one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Visible box in user space, normalized so `x0 <= x1` and `y0 <= y1`
    pub bbox: [f32; 4],
    /// Clockwise rotation, one of 0, 90, 180, 270
    pub rotation: u16,
}

/// Normalize a `/Rotate` value to 0, 90, 180 or 270
pub fn normalize_rotation(rotate: i64) -> u16 {
    let snapped = (rotate.rem_euclid(360) / 90) * 90;
    snapped as u16
}

impl PageFrame {
    pub fn new(bbox: [f32; 4], rotate: i64) -> Self {
        let [x0, y0, x1, y1] = bbox;
        Self {
            bbox: [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)],
            rotation: normalize_rotation(rotate),
        }
    }

    fn unrotated_size(&self) -> (f32, f32) {
        (self.bbox[2] - self.bbox[0], self.bbox[3] - self.bbox[1])
    }

    /// Width and height as displayed
    pub fn displayed_size(&self) -> (f32, f32) {
        let (w, h) = self.unrotated_size();
        match self.rotation {
            90 | 270 => (h, w),
            _ => (w, h),
        }
    }

    /// Map a displayed point to user space
    pub fn to_user(&self, point: Point) -> (f32, f32) {
        let (w, h) = self.unrotated_size();
        let (u, v) = (point.x, point.y);
        // Top-left based coordinates on the unrotated page
        let (x, y) = match self.rotation {
            90 => (v, h - u),
            180 => (w - u, h - v),
            270 => (w - v, u),
            _ => (u, v),
        };
        (x + self.bbox[0], self.bbox[3] - y)
    }

    /// Map a displayed rect to a normalized user space rect `[x0, y0, x1, y1]`
    pub fn rect_to_user(&self, rect: Rect) -> [f32; 4] {
        let (ax, ay) = self.to_user(Point::new(rect.x0, rect.y0));
        let (bx, by) = self.to_user(Point::new(rect.x1, rect.y1));
        [ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)]
    }

    /// Text matrix drawing upright text with its baseline starting at `origin`
    pub fn text_matrix(&self, origin: Point) -> [f32; 6] {
        let (ox, oy) = self.to_user(origin);
        let (rx, ry) = self.to_user(Point::new(origin.x + 1.0, origin.y));
        let (ux, uy) = self.to_user(Point::new(origin.x, origin.y - 1.0));
        [rx - ox, ry - oy, ux - ox, uy - oy, ox, oy]
    }

    /// `cm` matrix mapping the unit square of an image onto a displayed rect
    pub fn image_matrix(&self, rect: Rect) -> [f32; 6] {
        let rect = rect.normalized();
        let (blx, bly) = self.to_user(Point::new(rect.x0, rect.y1));
        let (brx, bry) = self.to_user(Point::new(rect.x1, rect.y1));
        let (tlx, tly) = self.to_user(Point::new(rect.x0, rect.y0));
        [brx - blx, bry - bly, tlx - blx, tly - bly, blx, bly]
    }
}
