//! Terminal UI: rendering and theming

pub mod render;
pub mod theme;

pub use render::render;
pub use theme::Theme;
