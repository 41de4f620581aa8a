//! Display content model and renderer.

pub mod render;
pub mod screen;

pub use render::render;
pub use screen::{Notice, Screen};
