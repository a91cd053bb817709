use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use eframe::egui::Vec2;

use crate::graph::Edge;
use crate::simulation::Simulation;

/// Rendering annotation on an edge; forces never look at it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeMark {
    #[default]
    Neutral,
    /// The clicked bundle depends on the other end.
    Outgoing,
    /// The other end depends on the clicked bundle.
    Incoming,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Highlights {
    marks: Vec<EdgeMark>,
}

pub type SharedHighlights = Rc<RefCell<Highlights>>;

impl Highlights {
    pub fn new(edge_count: usize) -> Self {
        Self {
            marks: vec![EdgeMark::Neutral; edge_count],
        }
    }

    pub fn shared(edge_count: usize) -> SharedHighlights {
        Rc::new(RefCell::new(Self::new(edge_count)))
    }

    pub fn mark(&self, edge: usize) -> EdgeMark {
        self.marks.get(edge).copied().unwrap_or_default()
    }

    pub fn marks(&self) -> &[EdgeMark] {
        &self.marks
    }

    fn set(&mut self, edge: usize, mark: EdgeMark) {
        if let Some(slot) = self.marks.get_mut(edge) {
            *slot = mark;
        }
    }
}

/// Pointer input from the host UI, already resolved to a node index and
/// world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    DragStart { node: usize },
    DragMove { node: usize, to: Vec2 },
    DragEnd { node: usize },
    Click { node: usize },
    DoubleClick { node: usize },
}

/// Turns pointer gestures into pin changes, reheats and edge highlights.
///
/// Events can be queued at any time and are applied together between ticks
/// by [`InteractionController::apply_pending`].
pub struct InteractionController {
    highlights: SharedHighlights,
    drag_target: f32,
    dragging: Vec<usize>,
    pending: VecDeque<PointerEvent>,
}

impl InteractionController {
    pub fn new(highlights: SharedHighlights, drag_target: f32) -> Self {
        Self {
            highlights,
            drag_target,
            dragging: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn highlights(&self) -> &SharedHighlights {
        &self.highlights
    }

    pub fn is_dragging(&self, node: usize) -> bool {
        self.dragging.contains(&node)
    }

    pub fn enqueue(&mut self, event: PointerEvent) {
        self.pending.push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drains the queue in arrival order. Returns how many events were applied.
    pub fn apply_pending(&mut self, simulation: &mut Simulation) -> usize {
        let mut applied = 0;
        while let Some(event) = self.pending.pop_front() {
            self.handle(simulation, event);
            applied += 1;
        }
        applied
    }

    pub fn handle(&mut self, simulation: &mut Simulation, event: PointerEvent) {
        if event_node(event) >= simulation.nodes().len() {
            tracing::trace!(?event, "pointer event for unknown node ignored");
            return;
        }

        match event {
            PointerEvent::DragStart { node } => self.drag_start(simulation, node),
            PointerEvent::DragMove { node, to } => self.drag_move(simulation, node, to),
            PointerEvent::DragEnd { node } => self.drag_end(simulation, node),
            PointerEvent::Click { node } => self.click(simulation.edges(), node),
            PointerEvent::DoubleClick { node } => self.double_click(simulation.edges(), node),
        }
    }

    fn drag_start(&mut self, simulation: &mut Simulation, node: usize) {
        if self.dragging.is_empty() {
            simulation.reheat(self.drag_target);
        }
        if !self.dragging.contains(&node) {
            self.dragging.push(node);
        }

        if let Some(entry) = simulation.node_mut(node) {
            let at = entry.position;
            entry.pin(at);
            tracing::trace!(node = %entry.key, x = at.x, y = at.y, "drag start");
        }
    }

    fn drag_move(&mut self, simulation: &mut Simulation, node: usize, to: Vec2) {
        if !self.dragging.contains(&node) {
            return;
        }
        if let Some(entry) = simulation.node_mut(node) {
            entry.pin(to);
        }
    }

    fn drag_end(&mut self, simulation: &mut Simulation, node: usize) {
        let Some(slot) = self.dragging.iter().position(|&active| active == node) else {
            return;
        };
        self.dragging.swap_remove(slot);

        if self.dragging.is_empty() {
            simulation.set_alpha_target(0.0);
        }
        // The pin stays: the bundle remains where it was dropped.
        if let Some(entry) = simulation.node_mut(node) {
            tracing::trace!(node = %entry.key, "drag end");
        }
    }

    fn click(&mut self, edges: &[Edge], node: usize) {
        let mut highlights = self.highlights.borrow_mut();
        for (index, edge) in edges.iter().enumerate() {
            if edge.source == node {
                highlights.set(index, EdgeMark::Outgoing);
            }
        }
        for (index, edge) in edges.iter().enumerate() {
            if edge.target == node {
                highlights.set(index, EdgeMark::Incoming);
            }
        }
    }

    fn double_click(&mut self, edges: &[Edge], node: usize) {
        let mut highlights = self.highlights.borrow_mut();
        for (index, edge) in edges.iter().enumerate() {
            if edge.touches(node) {
                highlights.set(index, EdgeMark::Neutral);
            }
        }
    }
}

fn event_node(event: PointerEvent) -> usize {
    match event {
        PointerEvent::DragStart { node }
        | PointerEvent::DragMove { node, .. }
        | PointerEvent::DragEnd { node }
        | PointerEvent::Click { node }
        | PointerEvent::DoubleClick { node } => node,
    }
}
