use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui};

use crate::render::LABEL_SIZE;

use super::super::ConstellationApp;
use super::super::render_utils::draw_background;
use super::interaction::node_screen_radius;

/// Below this zoom labels turn into noise.
const LABEL_MIN_ZOOM: f32 = 0.45;

impl ConstellationApp {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let viewport = self.viewport(rect);
        self.handle_graph_pointer(ui, &viewport, &response);

        let running = self.view.advance();
        if running || self.dragged_node.is_some() || response.dragged() {
            ui.ctx().request_repaint();
        }

        let painter = ui.painter_at(rect);
        draw_background(&painter, &viewport);

        let scene = self.scene.borrow();
        let zoom_sqrt = viewport.zoom.sqrt();
        for segment in &scene.edges {
            let from = viewport.to_screen(segment.from);
            let to = viewport.to_screen(segment.to);
            if !viewport.shows_segment(from, to, segment.width) {
                continue;
            }
            let width = (segment.width * zoom_sqrt).clamp(0.6, 4.0);
            painter.line_segment([from, to], Stroke::new(width, segment.color));
        }

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .and_then(|pointer| self.node_at(&viewport, pointer));
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let show_labels = viewport.zoom >= LABEL_MIN_ZOOM;
        let label_font = FontId::proportional((LABEL_SIZE * viewport.zoom).clamp(8.0, 22.0));
        for (index, sprite) in scene.nodes.iter().enumerate() {
            let center = viewport.to_screen(sprite.center);
            let radius = node_screen_radius(sprite.radius, viewport.zoom);
            if !viewport.shows_circle(center, radius) {
                continue;
            }

            painter.circle_filled(center, radius, sprite.fill);
            let stroke_color = if hovered == Some(index) {
                Color32::WHITE
            } else {
                sprite.stroke
            };
            painter.circle_stroke(center, radius, Stroke::new(1.0, stroke_color));

            if show_labels || hovered == Some(index) {
                painter.text(
                    viewport.to_screen(sprite.label_anchor()),
                    Align2::LEFT_CENTER,
                    &sprite.label,
                    label_font.clone(),
                    Color32::from_gray(215),
                );
            }
        }
    }
}
