mod component;
mod layout;
mod render;
mod state;
pub mod style;
mod transform;
mod types;

pub use component::BipartiteGraph;
