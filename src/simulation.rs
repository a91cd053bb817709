use crate::config::{AlphaConfig, LayoutConfig};
use crate::graph::{Edge, Graph, Node};
use crate::physics::{Force, ForceRegistry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Converged,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationEvent {
    /// After every tick's integration.
    Tick,
    /// Once, when alpha drops below `alpha_min` and ticking stops.
    End,
}

/// Read-only view of the simulation handed to listeners.
pub struct Frame<'a> {
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    pub alpha: f32,
    pub state: RunState,
    pub tick: u64,
}

type Listener = Box<dyn FnMut(&Frame<'_>)>;

/// Force simulation over a graph it owns for its whole lifetime.
pub struct Simulation {
    graph: Graph,
    forces: ForceRegistry,
    alpha: f32,
    alpha_min: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,
    state: RunState,
    ticks: u64,
    listeners: Vec<(SimulationEvent, Listener)>,
}

impl Simulation {
    pub fn new(graph: Graph, mut forces: ForceRegistry) -> Self {
        forces.initialize(&graph.nodes, &graph.edges);
        let alpha = AlphaConfig::default();
        Self {
            graph,
            forces,
            alpha: 1.0,
            alpha_min: alpha.min,
            alpha_decay: alpha.decay,
            alpha_target: 0.0,
            velocity_decay: alpha.velocity_decay,
            state: RunState::Idle,
            ticks: 0,
            listeners: Vec::new(),
        }
    }

    pub fn from_config(graph: Graph, config: &LayoutConfig) -> Self {
        Self::new(graph, ForceRegistry::standard(config)).with_alpha(&config.alpha)
    }

    pub fn with_alpha(mut self, alpha: &AlphaConfig) -> Self {
        self.alpha_min = alpha.min;
        self.alpha_decay = alpha.decay;
        self.velocity_decay = alpha.velocity_decay;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.graph.nodes.get_mut(index)
    }

    pub fn forces(&self) -> &ForceRegistry {
        &self.forces
    }

    /// Registers (or replaces) a force and initializes it against the graph.
    pub fn set_force(&mut self, name: &str, mut force: impl Force + 'static) {
        force.initialize(&self.graph.nodes, &self.graph.edges);
        self.forces.insert(name, Box::new(force));
    }

    pub fn remove_force(&mut self, name: &str) -> bool {
        self.forces.remove(name).is_some()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn alpha_min(&self) -> f32 {
        self.alpha_min
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            nodes: &self.graph.nodes,
            edges: &self.graph.edges,
            alpha: self.alpha,
            state: self.state,
            tick: self.ticks,
        }
    }

    pub fn on(&mut self, event: SimulationEvent, listener: impl FnMut(&Frame<'_>) + 'static) {
        self.listeners.push((event, Box::new(listener)));
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn start(&mut self) {
        self.alpha = 1.0;
        self.transition(RunState::Running);
    }

    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            self.transition(RunState::Stopped);
        }
    }

    /// Sets the energy level alpha decays toward and resumes ticking.
    ///
    /// A non-zero target keeps the layout alive (e.g. while dragging); going
    /// back to zero lets alpha decay until the simulation converges again.
    pub fn reheat(&mut self, target: f32) {
        self.set_alpha_target(target);
        tracing::trace!(target = self.alpha_target, alpha = self.alpha, "reheat");
        if self.state != RunState::Running {
            self.transition(RunState::Running);
        }
    }

    /// Runs one tick regardless of the run state.
    pub fn tick(&mut self) {
        self.forces.apply(&mut self.graph.nodes, self.alpha);
        self.integrate();
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.ticks += 1;
        self.emit(SimulationEvent::Tick);
    }

    /// Scheduler entry point: ticks once if running and detects convergence.
    /// Returns whether a tick happened.
    pub fn step(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }

        self.tick();
        if self.alpha < self.alpha_min {
            self.transition(RunState::Converged);
            self.emit(SimulationEvent::End);
        }
        true
    }

    /// Steps until the simulation leaves the running state or `max_ticks`
    /// have passed. Returns the number of ticks taken.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut taken = 0;
        while taken < max_ticks && self.step() {
            taken += 1;
        }
        taken
    }

    fn integrate(&mut self) {
        let decay = self.velocity_decay;
        for node in &mut self.graph.nodes {
            match node.fx {
                Some(fx) => {
                    node.position.x = fx;
                    node.velocity.x = 0.0;
                }
                None => {
                    node.velocity.x *= decay;
                    node.position.x += node.velocity.x;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.position.y = fy;
                    node.velocity.y = 0.0;
                }
                None => {
                    node.velocity.y *= decay;
                    node.position.y += node.velocity.y;
                }
            }
        }
    }

    fn transition(&mut self, next: RunState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, alpha = self.alpha, ticks = self.ticks, "simulation state");
            self.state = next;
        }
    }

    fn emit(&mut self, event: SimulationEvent) {
        let frame = Frame {
            nodes: &self.graph.nodes,
            edges: &self.graph.edges,
            alpha: self.alpha,
            state: self.state,
            tick: self.ticks,
        };
        for (kind, listener) in &mut self.listeners {
            if *kind == event {
                listener(&frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use eframe::egui::{Vec2, vec2};

    use super::*;
    use crate::bundle::{BundleRecord, BundleSet, GroupTable};
    use crate::physics::{CHARGE, LinkForce};

    fn chain() -> Graph {
        let mut bundles = BundleSet::new();
        bundles.insert("a".into(), BundleRecord::new("a", ["b"]).at(2400.0, 2500.0));
        bundles.insert("b".into(), BundleRecord::new("b", ["c"]).at(2500.0, 2500.0));
        bundles.insert("c".into(), BundleRecord::new("c", Vec::<String>::new()).at(2600.0, 2500.0));
        Graph::build(&bundles, &GroupTable::new(), &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn idle_simulation_does_not_step() {
        let mut simulation = Simulation::from_config(chain(), &LayoutConfig::default());
        assert_eq!(simulation.state(), RunState::Idle);
        assert!(!simulation.step());
        assert_eq!(simulation.ticks(), 0);
    }

    #[test]
    fn alpha_decays_geometrically_toward_target() {
        let mut simulation = Simulation::new(chain(), ForceRegistry::new());
        simulation.start();
        let decay = AlphaConfig::default().decay;

        simulation.step();
        assert!((simulation.alpha() - (1.0 - decay)).abs() < 1e-6);
        simulation.step();
        assert!((simulation.alpha() - (1.0 - decay).powi(2)).abs() < 1e-6);
    }

    #[test]
    fn converges_and_emits_end_once() {
        let ends = Rc::new(Cell::new(0));
        let ticks = Rc::new(Cell::new(0));
        let mut simulation = Simulation::from_config(chain(), &LayoutConfig::default());
        {
            let ends = Rc::clone(&ends);
            simulation.on(SimulationEvent::End, move |_| ends.set(ends.get() + 1));
            let ticks = Rc::clone(&ticks);
            simulation.on(SimulationEvent::Tick, move |_| ticks.set(ticks.get() + 1));
        }

        simulation.start();
        let taken = simulation.run_until_settled(10_000);

        assert_eq!(simulation.state(), RunState::Converged);
        assert!(simulation.alpha() < simulation.alpha_min());
        assert_eq!(ends.get(), 1);
        assert_eq!(ticks.get(), taken);
        assert!(!simulation.step());
    }

    #[test]
    fn pinned_axes_snap_and_drop_velocity() {
        let mut simulation = Simulation::new(chain(), ForceRegistry::new());
        if let Some(node) = simulation.node_mut(0) {
            node.velocity = vec2(4.0, 4.0);
            node.fx = Some(10.0);
        }
        simulation.start();
        simulation.step();

        let node = &simulation.nodes()[0];
        assert_eq!(node.position.x, 10.0);
        assert_eq!(node.velocity.x, 0.0);
        assert!((node.velocity.y - 4.0 * 0.6).abs() < 1e-6);
        assert!((node.position.y - (2500.0 + 2.4)).abs() < 1e-3);
    }

    #[test]
    fn reheat_resumes_a_converged_simulation() {
        let mut simulation = Simulation::from_config(chain(), &LayoutConfig::default());
        simulation.start();
        simulation.run_until_settled(10_000);
        assert_eq!(simulation.state(), RunState::Converged);

        simulation.reheat(0.3);
        assert!(simulation.is_running());
        simulation.run_until_settled(400);
        assert!(simulation.is_running(), "a raised target keeps alpha above the floor");
        assert!((simulation.alpha() - 0.3).abs() < 0.01);

        simulation.reheat(0.0);
        simulation.run_until_settled(10_000);
        assert_eq!(simulation.state(), RunState::Converged);
    }

    #[test]
    fn stop_halts_scheduling() {
        let mut simulation = Simulation::from_config(chain(), &LayoutConfig::default());
        simulation.start();
        simulation.step();
        simulation.stop();

        let before = simulation.nodes().to_vec();
        assert!(!simulation.step());
        assert_eq!(simulation.state(), RunState::Stopped);
        assert_eq!(simulation.nodes(), before.as_slice());
    }

    #[test]
    fn forces_can_be_swapped_while_running() {
        let mut simulation = Simulation::from_config(chain(), &LayoutConfig::default());
        assert!(simulation.remove_force(CHARGE));
        simulation.set_force("link", LinkForce::new(50.0, 0.5));
        assert_eq!(
            simulation.forces().names().collect::<Vec<_>>(),
            vec!["link", "center", "collide"]
        );

        simulation.start();
        simulation.step();
        let moved = simulation
            .nodes()
            .iter()
            .any(|node| node.velocity != Vec2::ZERO);
        assert!(moved);
    }
}
