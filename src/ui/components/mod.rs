pub mod grid_map;
pub mod link_toggle;
pub mod status_bar;
pub mod terminal;
pub mod visualizer;

pub use grid_map::GridMap;
pub use link_toggle::{LinkIntent, LinkToggle};
pub use status_bar::StatusBar;
pub use terminal::Terminal;
pub use visualizer::Visualizer;
