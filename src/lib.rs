//! 2D guillotine cutting optimizer for rectangular sheet stock.
//!
//! Deterministic single-pass heuristic: pieces are expanded, sorted by area
//! and placed Bottom-Left Best Fit (or edge-aligned when "poignet" mode is
//! on) across as few panels as possible, back-filling earlier panels before
//! opening a new one.

pub mod free_rects;
pub mod guillotine;
pub mod render;
pub mod solver;
pub mod types;

pub use guillotine::{Panel, PlacementMode};
pub use solver::{Optimizer, Solution};
pub use types::{CutConfig, Piece, PieceType, Placement, Rect, Stats};

use log::LevelFilter;

pub fn init_logger(level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] [{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}
