pub mod commands;
pub mod render;

pub use render::Output;
