pub mod status;
pub mod viewer;

pub use status::{render, ViewerState};
pub use viewer::Viewer;
