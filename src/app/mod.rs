use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui::{self, Context, Vec2};

use crate::bundle::GroupTable;
use crate::config::LayoutConfig;
use crate::graph::Graph;
use crate::render::SceneBuffer;
use crate::visualization::Visualization;

mod graph;
mod render_utils;
mod ui;

pub use render_utils::Viewport;

const INITIAL_ZOOM: f32 = 0.35;

/// Desktop viewer: one visualization drawn into a central canvas.
pub struct ConstellationApp {
    view: Visualization<SceneBuffer>,
    scene: Rc<RefCell<SceneBuffer>>,
    title: String,
    bundle_count: usize,
    edge_count: usize,
    pan: Vec2,
    zoom: f32,
    dragged_node: Option<usize>,
}

impl ConstellationApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        title: String,
        graph: Graph,
        config: &LayoutConfig,
        groups: GroupTable,
    ) -> Self {
        let bundle_count = graph.node_count();
        let edge_count = graph.edge_count();
        let scene = Rc::new(RefCell::new(SceneBuffer::new()));
        let view = Visualization::new(graph, config, groups, Rc::clone(&scene));

        Self {
            view,
            scene,
            title,
            bundle_count,
            edge_count,
            pan: -config.center() * INITIAL_ZOOM,
            zoom: INITIAL_ZOOM,
            dragged_node: None,
        }
    }
}

impl eframe::App for ConstellationApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.draw_top_bar(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}

impl Drop for ConstellationApp {
    fn drop(&mut self) {
        self.view.teardown();
    }
}
