//! Orchestration for the instant text extractor.
//!
//! Three kinds of context talk over channels and share no mutable state: page
//! surfaces (selection plus the on-page presenter), the orchestrator event
//! loop, and the panel.

pub mod context;
pub mod controller;
pub mod events;
pub mod panel;
pub mod registry;
pub mod runtime;
pub mod surface;

pub use controller::{AppController, Collaborators};
pub use panel::{Panel, PanelError};
pub use surface::{PageEvent, SurfaceHandle, SurfaceHost, SurfaceView};

#[cfg(test)]
mod tests;
