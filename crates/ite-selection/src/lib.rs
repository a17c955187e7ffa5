mod controller;
mod layer;

pub use controller::{PointerOutcome, SelectionController, SelectionState, to_device_space};
pub use layer::{OverlayLayer, SelectionHost};
