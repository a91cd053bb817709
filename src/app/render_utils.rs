use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// Screen rectangle plus the pan/zoom that maps world coordinates into it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub rect: Rect,
    pub pan: Vec2,
    pub zoom: f32,
}

impl Viewport {
    pub fn to_screen(&self, world: Vec2) -> Pos2 {
        self.rect.center() + self.pan + world * self.zoom
    }

    pub fn to_world(&self, screen: Pos2) -> Vec2 {
        (screen - self.rect.center() - self.pan) / self.zoom
    }

    /// Zooms by `factor` while keeping the world point under `anchor` fixed.
    pub fn zoom_around(&mut self, anchor: Pos2, factor: f32) {
        let world_before = self.to_world(anchor);
        self.zoom = (self.zoom * factor).clamp(0.02, 6.0);
        self.pan = anchor - self.rect.center() - world_before * self.zoom;
    }

    pub fn shows_circle(&self, center: Pos2, radius: f32) -> bool {
        self.rect.expand(radius).contains(center)
    }

    pub fn shows_segment(&self, from: Pos2, to: Pos2, padding: f32) -> bool {
        Rect::from_two_pos(from, to)
            .expand(padding)
            .intersects(self.rect)
    }
}

pub(super) fn draw_background(painter: &Painter, viewport: &Viewport) {
    let rect = viewport.rect;
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * viewport.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + viewport.pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}
