mod block;
mod catalog;
mod config;
mod document;
mod drag;
mod engine;
mod geometry;
mod palette;
mod reorder;
mod transfer;

pub use crate::block::*;
pub use crate::catalog::*;
pub use crate::config::*;
pub use crate::document::*;
pub use crate::drag::*;
pub use crate::engine::*;
pub use crate::geometry::*;
pub use crate::palette::*;
pub use crate::reorder::*;
pub use crate::transfer::*;
