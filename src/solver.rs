use log::debug;
use serde::Serialize;

use crate::guillotine::{Panel, PlacementMode};
use crate::types::{CutConfig, Piece, PieceType, Stats};

/// Safety bound on the outer loop for pathological inputs.
const MAX_PANELS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub panels: Vec<Panel>,
    pub rejected: Vec<Piece>,
    pub stats: Stats,
}

pub struct Optimizer {
    config: CutConfig,
}

impl Optimizer {
    pub fn new(config: CutConfig) -> Self {
        Self { config }
    }

    /// Runs the full packing: expansion, per-panel placement and the
    /// back-fill sweep over already-opened panels. Pure over its input; a
    /// structurally equal config always yields a structurally equal solution.
    pub fn optimize(&self) -> Solution {
        let stock_w = self.config.panel.width;
        let stock_h = self.config.panel.height;
        let settings = self.config.settings;

        let degenerate = stock_w == 0
            || stock_h == 0
            || self
                .config
                .pieces
                .iter()
                .any(|t| t.width == 0 || t.height == 0);
        if degenerate {
            return Solution {
                panels: Vec::new(),
                rejected: Vec::new(),
                stats: compute_stats(&[], stock_w, stock_h, settings.min_waste_size),
            };
        }

        let mode = if settings.poignet_enabled {
            PlacementMode::EdgeAligned
        } else {
            PlacementMode::Free
        };

        let mut remaining = expand_pieces(&self.config.pieces);
        let total = remaining.len();
        let mut panels: Vec<Panel> = Vec::new();
        let mut rejected: Vec<Piece> = Vec::new();

        while !remaining.is_empty() {
            // Back-fill: sweep every open panel in index order, repeating
            // until a full pass places nothing more.
            let mut progress = true;
            while progress && !remaining.is_empty() {
                progress = false;
                for panel in panels.iter_mut() {
                    remaining.retain(|piece| match panel.try_place(piece, mode) {
                        Some(p) => {
                            debug!(
                                "piece {} back-filled onto panel {} at ({}, {})",
                                p.piece_id, p.panel_index, p.x, p.y
                            );
                            progress = true;
                            false
                        }
                        None => true,
                    });
                }
            }
            if remaining.is_empty() {
                break;
            }
            if panels.len() >= MAX_PANELS {
                rejected.append(&mut remaining);
                break;
            }

            let mut panel = Panel::new(panels.len(), stock_w, stock_h, settings.min_waste_size);
            remaining.retain(|piece| panel.try_place(piece, mode).is_none());
            if panel.placements.is_empty() {
                // Nothing left fits even a blank panel; discard it.
                rejected.append(&mut remaining);
                break;
            }
            debug!(
                "panel {} opened: {} placed, {} remaining",
                panel.panel_index,
                panel.placements.len(),
                remaining.len()
            );
            panels.push(panel);
        }

        let stats = compute_stats(&panels, stock_w, stock_h, settings.min_waste_size);
        debug!(
            "optimize done: {}/{} pieces on {} panels, {:.1}% used",
            total - rejected.len(),
            total,
            stats.panel_count,
            stats.used_percentage
        );
        Solution {
            panels,
            rejected,
            stats,
        }
    }
}

/// Expands the demand into unit pieces, one per quantity, with a stable
/// global ordinal, then orders them largest-area first. The sort is stable,
/// so equal areas keep their expansion order.
fn expand_pieces(types: &[PieceType]) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut next_id = 0;
    for t in types {
        for _ in 0..t.quantity {
            pieces.push(Piece {
                piece_id: next_id,
                type_id: t.type_id,
                w: t.width,
                h: t.height,
                rotation_allowed: t.rotation_allowed,
            });
            next_id += 1;
        }
    }
    pieces.sort_by(|a, b| b.area().cmp(&a.area()));
    pieces
}

fn compute_stats(panels: &[Panel], stock_w: u32, stock_h: u32, min_waste_size: u32) -> Stats {
    let panel_count = panels.len();
    let total_used_area: u64 = panels.iter().map(|p| p.used_area()).sum();
    let total_panel_area = stock_w as u64 * stock_h as u64 * panel_count as u64;
    let total_waste_area = total_panel_area - total_used_area;
    let usable_waste_area: u64 = panels
        .iter()
        .flat_map(|p| &p.free_rects)
        .map(|f| f.area())
        .sum();
    let (used_percentage, waste_percentage) = if total_panel_area > 0 {
        let used = total_used_area as f64 / total_panel_area as f64 * 100.0;
        (used, 100.0 - used)
    } else {
        (0.0, 100.0)
    };
    Stats {
        panel_count,
        total_used_area,
        total_waste_area,
        total_panel_area,
        used_percentage,
        waste_percentage,
        usable_waste_area,
        min_waste_size,
    }
}
