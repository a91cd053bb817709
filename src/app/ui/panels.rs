use eframe::egui::{self, Align, Context, Layout};

use super::super::ConstellationApp;

impl ConstellationApp {
    pub(in crate::app) fn draw_top_bar(&mut self, ctx: &Context) {
        let (alpha, state, tick) = match self.scene.borrow().info {
            Some(info) => (info.alpha, Some(info.state), info.tick),
            None => (0.0, None, 0),
        };

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(self.title.as_str());
                    ui.separator();
                    ui.label(format!("bundles: {}", self.bundle_count));
                    ui.label(format!("dependencies: {}", self.edge_count));
                    ui.separator();
                    ui.label(format!("alpha: {alpha:.4}"));
                    match state {
                        Some(state) => ui.label(format!("state: {state:?}")),
                        None => ui.label("state: closed"),
                    };
                    ui.label(format!("tick: {tick}"));

                    let reheat = ui.add_enabled(!self.view.is_torn_down(), egui::Button::new("Reheat"));
                    if reheat.clicked() {
                        self.view.restart();
                        ctx.request_repaint();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label("drag: pin · click: highlight · double-click: clear · right-drag: pan");
                    });
                });
            });
    }
}
