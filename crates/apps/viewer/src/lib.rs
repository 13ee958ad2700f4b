//! BRDF lobe viewer
//!
//! Shows the reflectance lobe of the selected BRDF over a ground plane in a
//! 3D viewport, next to a property panel for editing, saving and offline
//! rendering of the model.

pub mod config;
pub mod offline;
pub mod panel;
pub mod state;
mod viewer;

pub use config::ViewerConfig;
pub use viewer::BrdfViewer;
