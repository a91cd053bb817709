use std::cell::RefCell;
use std::rc::Rc;

use crate::bundle::GroupTable;
use crate::config::LayoutConfig;
use crate::graph::Graph;
use crate::interaction::{Highlights, InteractionController, PointerEvent, SharedHighlights};
use crate::render::{RenderBinding, RenderSurface};
use crate::simulation::Simulation;

struct Instance<S> {
    simulation: Simulation,
    controller: InteractionController,
    binding: RenderBinding<S>,
}

/// One live graph view: engine, interaction controller and render binding,
/// owned together and torn down together.
///
/// The host calls [`Visualization::advance`] once per display refresh and
/// forwards pointer input through [`Visualization::dispatch`]. After
/// [`Visualization::teardown`] every call is a no-op.
pub struct Visualization<S> {
    instance: Option<Instance<S>>,
}

impl<S: RenderSurface + 'static> Visualization<S> {
    /// Binds `surface`, renders the initial layout and starts the engine.
    pub fn new(graph: Graph, config: &LayoutConfig, groups: GroupTable, surface: Rc<RefCell<S>>) -> Self {
        let highlights = Highlights::shared(graph.edge_count());
        let mut simulation = Simulation::from_config(graph, config);
        let controller = InteractionController::new(Rc::clone(&highlights), config.alpha.drag_target);
        let binding = RenderBinding::new(surface, highlights, Rc::new(groups));

        binding.attach(&mut simulation);
        simulation.start();

        Self {
            instance: Some(Instance {
                simulation,
                controller,
                binding,
            }),
        }
    }

    /// Applies queued pointer events, then runs at most one tick. Returns
    /// whether the engine is still running afterwards.
    pub fn advance(&mut self) -> bool {
        let Some(instance) = self.instance.as_mut() else {
            return false;
        };

        let applied = instance.controller.apply_pending(&mut instance.simulation);
        let ticked = instance.simulation.step();
        if applied > 0 && !ticked {
            // Highlight changes on a settled layout still need a redraw.
            instance.binding.render(&instance.simulation.frame());
        }
        instance.simulation.is_running()
    }

    /// Queues a pointer event for the next [`Visualization::advance`].
    pub fn dispatch(&mut self, event: PointerEvent) {
        match self.instance.as_mut() {
            Some(instance) => instance.controller.enqueue(event),
            None => tracing::trace!(?event, "pointer event after teardown ignored"),
        }
    }

    /// Applies a pointer event immediately and redraws.
    pub fn handle_now(&mut self, event: PointerEvent) {
        let Some(instance) = self.instance.as_mut() else {
            tracing::trace!(?event, "pointer event after teardown ignored");
            return;
        };
        instance.controller.handle(&mut instance.simulation, event);
        instance.binding.render(&instance.simulation.frame());
    }

    /// Keeps alpha up at `target` until the next cool-down, like a drag would.
    pub fn reheat(&mut self, target: f32) {
        if let Some(instance) = self.instance.as_mut() {
            instance.simulation.reheat(target);
        }
    }

    /// Resets alpha to 1 and restarts the schedule.
    pub fn restart(&mut self) {
        if let Some(instance) = self.instance.as_mut() {
            instance.simulation.set_alpha_target(0.0);
            instance.simulation.start();
        }
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.instance.as_ref().map(|instance| &instance.simulation)
    }

    pub fn highlights(&self) -> Option<&SharedHighlights> {
        self.instance
            .as_ref()
            .map(|instance| instance.controller.highlights())
    }

    pub fn is_dragging(&self, node: usize) -> bool {
        self.instance
            .as_ref()
            .is_some_and(|instance| instance.controller.is_dragging(node))
    }

    pub fn is_torn_down(&self) -> bool {
        self.instance.is_none()
    }

    /// Stops ticking, drops every listener and releases the node arena.
    pub fn teardown(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.simulation.stop();
            instance.simulation.clear_listeners();
            tracing::debug!(
                ticks = instance.simulation.ticks(),
                "visualization torn down"
            );
        }
    }
}
