use eframe::egui::{self, PointerButton, Rect, Ui};

use crate::interaction::PointerEvent;

use super::super::ConstellationApp;
use super::super::render_utils::Viewport;

/// Extra pick distance around a node disc, in screen points.
const PICK_SLACK: f32 = 4.0;

impl ConstellationApp {
    pub(in crate::app) fn viewport(&self, rect: Rect) -> Viewport {
        Viewport {
            rect,
            pan: self.pan,
            zoom: self.zoom,
        }
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let mut viewport = self.viewport(rect);
        viewport.zoom_around(pointer, (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15));
        self.pan = viewport.pan;
        self.zoom = viewport.zoom;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Node under `pointer`, nearest first, in screen space.
    pub(in crate::app) fn node_at(
        &self,
        viewport: &Viewport,
        pointer: egui::Pos2,
    ) -> Option<usize> {
        let scene = self.scene.borrow();
        scene
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, sprite)| {
                let distance = viewport.to_screen(sprite.center).distance(pointer);
                let radius = node_screen_radius(sprite.radius, viewport.zoom) + PICK_SLACK;
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Translates primary-button gestures into pointer events for the next tick.
    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        viewport: &Viewport,
        response: &egui::Response,
    ) {
        if response.drag_started_by(PointerButton::Primary) {
            let origin = ui.input(|input| input.pointer.press_origin());
            if let Some(node) = origin.and_then(|pointer| self.node_at(viewport, pointer)) {
                self.dragged_node = Some(node);
                self.view.dispatch(PointerEvent::DragStart { node });
            }
        }

        if let Some(node) = self.dragged_node {
            if response.dragged_by(PointerButton::Primary)
                && let Some(pointer) = response.interact_pointer_pos()
            {
                self.view.dispatch(PointerEvent::DragMove {
                    node,
                    to: viewport.to_world(pointer),
                });
            }

            if response.drag_stopped() {
                self.dragged_node = None;
                self.view.dispatch(PointerEvent::DragEnd { node });
            }
        }

        let clicked = response.clicked_by(PointerButton::Primary);
        let double_clicked = response.double_clicked_by(PointerButton::Primary);
        if !clicked && !double_clicked {
            return;
        }

        let Some(node) = response
            .interact_pointer_pos()
            .and_then(|pointer| self.node_at(viewport, pointer))
        else {
            return;
        };
        if clicked {
            self.view.dispatch(PointerEvent::Click { node });
        }
        if double_clicked {
            self.view.dispatch(PointerEvent::DoubleClick { node });
        }
    }
}

pub(in crate::app) fn node_screen_radius(world_radius: f32, zoom: f32) -> f32 {
    (world_radius * zoom).clamp(2.5, 24.0)
}
