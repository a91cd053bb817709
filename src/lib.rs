//! Force-directed layout for bundle dependency graphs.
//!
//! A [`graph::Graph`] is built once from a bundle mapping, handed to a
//! [`simulation::Simulation`] that ticks the registered forces, and projected
//! onto a [`render::RenderSurface`] after every tick. [`visualization`] ties
//! the pieces into one instance with pointer interaction and teardown;
//! [`app`] is the desktop viewer around it.

pub mod app;
pub mod bundle;
pub mod config;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod physics;
pub mod render;
pub mod simulation;
pub mod visualization;

pub use error::{GraphError, Result};
