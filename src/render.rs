use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui::{Color32, Vec2, vec2};

use crate::bundle::GroupTable;
use crate::graph::Node;
use crate::interaction::{EdgeMark, SharedHighlights};
use crate::simulation::{Frame, RunState, Simulation, SimulationEvent};

pub const NODE_RADIUS: f32 = 5.0;
pub const NODE_OPACITY: f32 = 0.8;
pub const NODE_STROKE: Color32 = Color32::from_rgb(0xcc, 0xcc, 0xcc);
pub const LABEL_OFFSET: Vec2 = vec2(6.0, 3.0);
pub const LABEL_SIZE: f32 = 10.0;
pub const EDGE_WIDTH: f32 = 2.0;

pub fn edge_color(mark: EdgeMark) -> Color32 {
    match mark {
        EdgeMark::Neutral => Color32::from_rgb(211, 211, 211),
        EdgeMark::Outgoing => Color32::from_rgb(255, 0, 0),
        EdgeMark::Incoming => Color32::from_rgb(0, 0, 255),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInfo {
    pub alpha: f32,
    pub state: RunState,
    pub tick: u64,
    pub node_count: usize,
    pub edge_count: usize,
}

impl FrameInfo {
    fn of(frame: &Frame<'_>) -> Self {
        Self {
            alpha: frame.alpha,
            state: frame.state,
            tick: frame.tick,
            node_count: frame.nodes.len(),
            edge_count: frame.edges.len(),
        }
    }
}

/// Where the binding projects the layout. Positions are world coordinates.
pub trait RenderSurface {
    fn begin(&mut self, _info: FrameInfo) {}

    fn place_node(&mut self, index: usize, node: &Node, position: Vec2, fill: Color32);

    fn place_edge(&mut self, index: usize, from: Vec2, to: Vec2, mark: EdgeMark);

    fn finish(&mut self) {}
}

/// Projects simulation frames onto a surface. Holds no layout state of its
/// own: everything drawn comes from the frame, the highlight marks and the
/// group table.
pub struct RenderBinding<S> {
    surface: Rc<RefCell<S>>,
    highlights: SharedHighlights,
    groups: Rc<GroupTable>,
}

impl<S> Clone for RenderBinding<S> {
    fn clone(&self) -> Self {
        Self {
            surface: Rc::clone(&self.surface),
            highlights: Rc::clone(&self.highlights),
            groups: Rc::clone(&self.groups),
        }
    }
}

impl<S: RenderSurface + 'static> RenderBinding<S> {
    pub fn new(surface: Rc<RefCell<S>>, highlights: SharedHighlights, groups: Rc<GroupTable>) -> Self {
        Self {
            surface,
            highlights,
            groups,
        }
    }

    pub fn render(&self, frame: &Frame<'_>) {
        let mut surface = self.surface.borrow_mut();
        let highlights = self.highlights.borrow();

        surface.begin(FrameInfo::of(frame));
        for (index, edge) in frame.edges.iter().enumerate() {
            let (Some(source), Some(target)) = (frame.nodes.get(edge.source), frame.nodes.get(edge.target))
            else {
                continue;
            };
            surface.place_edge(
                index,
                source.display_position(),
                target.display_position(),
                highlights.mark(index),
            );
        }
        for (index, node) in frame.nodes.iter().enumerate() {
            let fill = self.groups.color_of(&node.group);
            surface.place_node(index, node, node.display_position(), fill);
        }
        surface.finish();
    }

    /// Draws the current layout right away, then again after every tick.
    pub fn attach(&self, simulation: &mut Simulation) {
        self.render(&simulation.frame());
        let binding = self.clone();
        simulation.on(SimulationEvent::Tick, move |frame| binding.render(frame));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSprite {
    pub center: Vec2,
    pub radius: f32,
    pub fill: Color32,
    pub stroke: Color32,
    pub label: String,
}

impl NodeSprite {
    pub fn label_anchor(&self) -> Vec2 {
        self.center + LABEL_OFFSET
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
    pub from: Vec2,
    pub to: Vec2,
    pub color: Color32,
    pub width: f32,
}

/// Retained scene read by the viewer between frames. Sprites are indexed
/// like the node arena.
#[derive(Clone, Debug, Default)]
pub struct SceneBuffer {
    pub info: Option<FrameInfo>,
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeSegment>,
    pub revision: u64,
}

impl SceneBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for SceneBuffer {
    fn begin(&mut self, info: FrameInfo) {
        self.info = Some(info);
        self.nodes.clear();
        self.edges.clear();
    }

    fn place_node(&mut self, _index: usize, node: &Node, position: Vec2, fill: Color32) {
        self.nodes.push(NodeSprite {
            center: position,
            radius: NODE_RADIUS,
            fill: fill.gamma_multiply(NODE_OPACITY),
            stroke: NODE_STROKE.gamma_multiply(NODE_OPACITY),
            label: node.name.clone(),
        });
    }

    fn place_edge(&mut self, _index: usize, from: Vec2, to: Vec2, mark: EdgeMark) {
        self.edges.push(EdgeSegment {
            from,
            to,
            color: edge_color(mark),
            width: EDGE_WIDTH,
        });
    }

    fn finish(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{BundleRecord, BundleSet};
    use crate::config::LayoutConfig;
    use crate::graph::Graph;
    use crate::interaction::{Highlights, InteractionController, PointerEvent};

    #[derive(Default)]
    struct Recorder {
        frames: Vec<FrameInfo>,
        nodes: Vec<(usize, Vec2, Color32)>,
        edges: Vec<(usize, Vec2, Vec2, EdgeMark)>,
    }

    impl RenderSurface for Recorder {
        fn begin(&mut self, info: FrameInfo) {
            self.frames.push(info);
            self.nodes.clear();
            self.edges.clear();
        }

        fn place_node(&mut self, index: usize, _node: &Node, position: Vec2, fill: Color32) {
            self.nodes.push((index, position, fill));
        }

        fn place_edge(&mut self, index: usize, from: Vec2, to: Vec2, mark: EdgeMark) {
            self.edges.push((index, from, to, mark));
        }
    }

    fn pair() -> (Simulation, Rc<GroupTable>) {
        let mut bundles = BundleSet::new();
        bundles.insert("a".into(), BundleRecord::new("web.portal", ["b"]).at(2400.0, 2500.0));
        bundles.insert("b".into(), BundleRecord::new("core.kernel", Vec::<String>::new()).at(2600.0, 2500.0));
        let groups = GroupTable::new()
            .with_group("core", &["core.kernel"])
            .with_color("core", Color32::from_rgb(255, 0, 0))
            .with_color("none", Color32::from_rgb(128, 128, 128));
        let graph = Graph::build(&bundles, &groups, &LayoutConfig::default()).unwrap();
        (Simulation::from_config(graph, &LayoutConfig::default()), Rc::new(groups))
    }

    #[test]
    fn attach_renders_before_the_first_tick() {
        let (mut simulation, groups) = pair();
        let surface = Rc::new(RefCell::new(Recorder::default()));
        let binding = RenderBinding::new(Rc::clone(&surface), Highlights::shared(1), groups);

        binding.attach(&mut simulation);

        let recorded = surface.borrow();
        assert_eq!(recorded.frames.len(), 1);
        assert_eq!(recorded.frames[0].tick, 0);
        assert_eq!(recorded.frames[0].state, RunState::Idle);
        assert_eq!(recorded.nodes.len(), 2);
        assert_eq!(recorded.edges, vec![(0, vec2(2400.0, 2500.0), vec2(2600.0, 2500.0), EdgeMark::Neutral)]);
    }

    #[test]
    fn every_tick_projects_current_positions_and_colors() {
        let (mut simulation, groups) = pair();
        let surface = Rc::new(RefCell::new(Recorder::default()));
        RenderBinding::new(Rc::clone(&surface), Highlights::shared(1), groups).attach(&mut simulation);

        simulation.start();
        simulation.step();
        simulation.step();

        let recorded = surface.borrow();
        assert_eq!(recorded.frames.len(), 3);
        assert_eq!(recorded.frames[2].tick, 2);
        for &(index, position, _) in &recorded.nodes {
            assert_eq!(position, simulation.nodes()[index].position);
        }
        let kernel = simulation.graph().index_of("b").unwrap();
        let fill = recorded
            .nodes
            .iter()
            .find(|(index, _, _)| *index == kernel)
            .map(|(_, _, fill)| *fill);
        assert_eq!(fill, Some(Color32::from_rgb(255, 0, 0)));
    }

    #[test]
    fn highlight_marks_reach_the_surface() {
        let (mut simulation, groups) = pair();
        let highlights = Highlights::shared(1);
        let surface = Rc::new(RefCell::new(SceneBuffer::new()));
        let binding = RenderBinding::new(Rc::clone(&surface), Rc::clone(&highlights), groups);
        let mut controller = InteractionController::new(highlights, 0.3);

        controller.handle(&mut simulation, PointerEvent::Click { node: 0 });
        binding.render(&simulation.frame());

        let scene = surface.borrow();
        assert_eq!(scene.edges[0].color, edge_color(EdgeMark::Outgoing));
        assert_eq!(scene.edges[0].width, EDGE_WIDTH);
        assert_eq!(scene.nodes[0].label, "web.portal");
        assert_eq!(scene.revision, 1);
    }

    #[test]
    fn pinned_nodes_are_drawn_at_their_pin() {
        let (mut simulation, groups) = pair();
        let surface = Rc::new(RefCell::new(SceneBuffer::new()));
        let binding = RenderBinding::new(Rc::clone(&surface), Highlights::shared(1), groups);
        if let Some(node) = simulation.node_mut(0) {
            node.pin(vec2(10.0, 20.0));
        }

        binding.render(&simulation.frame());

        let scene = surface.borrow();
        assert_eq!(scene.nodes[0].center, vec2(10.0, 20.0));
        assert_eq!(scene.edges[0].from, vec2(10.0, 20.0));
        assert_eq!(scene.nodes[0].label_anchor(), vec2(16.0, 23.0));
    }
}
