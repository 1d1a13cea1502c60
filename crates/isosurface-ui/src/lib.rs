//! UI layer for isosurface-rs using egui.

pub mod integration;
pub mod panels;

pub use integration::EguiIntegration;
pub use panels::*;
