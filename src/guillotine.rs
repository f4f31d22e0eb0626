use serde::Serialize;

use crate::free_rects;
use crate::types::{Orientation, Piece, Placement, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Bottom-Left Best Fit anywhere on the panel.
    Free,
    /// Every piece must sit in the top row (y == 0) or the bottom row
    /// (y + h == panel height).
    EdgeAligned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy)]
enum CandidateKind {
    Free { free_idx: usize },
    Edge { row: Row },
}

/// A chosen window plus the concrete oriented position inside it.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    orientation: Orientation,
    kind: CandidateKind,
}

/// State of one stock sheet: committed placements, the free-rect registry
/// and, for edge-aligned mode, the per-row fill cursors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    #[serde(rename = "placed")]
    pub placements: Vec<Placement>,
    pub free_rects: Vec<Rect>,
    pub panel_index: usize,
    #[serde(skip)]
    stock_w: u32,
    #[serde(skip)]
    stock_h: u32,
    #[serde(skip)]
    min_waste: u32,
    #[serde(skip)]
    pub top_x: u32,
    #[serde(skip)]
    pub bottom_x: u32,
}

impl Panel {
    pub fn new(panel_index: usize, stock_w: u32, stock_h: u32, min_waste: u32) -> Self {
        Self {
            placements: Vec::new(),
            free_rects: vec![Rect::new(0, 0, stock_w, stock_h)],
            panel_index,
            stock_w,
            stock_h,
            min_waste,
            top_x: 0,
            bottom_x: 0,
        }
    }

    pub fn used_area(&self) -> u64 {
        self.placements.iter().map(|p| p.area()).sum()
    }

    /// Attempts to place `piece` on this panel, committing the placement and
    /// the registry update on success.
    pub fn try_place(&mut self, piece: &Piece, mode: PlacementMode) -> Option<Placement> {
        let candidate = match mode {
            PlacementMode::Free => self.best_free_fit(piece),
            PlacementMode::EdgeAligned => self.best_edge_fit(piece),
        };
        candidate.map(|c| self.commit(piece, c))
    }

    /// Bottom-Left Best Fit: lexicographic (y, x, leftover area), ties
    /// resolved by first encounter. The non-rotated orientation is scanned
    /// first, so on equal scores it wins.
    fn best_free_fit(&self, piece: &Piece) -> Option<Candidate> {
        let mut best: Option<(Candidate, (u32, u32, u64))> = None;

        for &orientation in orientations(piece) {
            let (pw, ph) = oriented_dims(piece, orientation);
            for (idx, free) in self.free_rects.iter().enumerate() {
                if !free.contains_size(pw, ph) {
                    continue;
                }
                let leftover = free.area() - pw as u64 * ph as u64;
                let score = (free.y, free.x, leftover);
                if best.is_none() || score < best.unwrap().1 {
                    best = Some((
                        Candidate {
                            x: free.x,
                            y: free.y,
                            w: pw,
                            h: ph,
                            orientation,
                            kind: CandidateKind::Free { free_idx: idx },
                        },
                        score,
                    ));
                }
            }
        }

        best.map(|(c, _)| c)
    }

    /// Edge-aligned fit: the top row is tried first and the bottom row only
    /// when no top candidate exists. Within a row, continuing at the fill
    /// cursor is preferred over jumping past a gap.
    fn best_edge_fit(&self, piece: &Piece) -> Option<Candidate> {
        let mut best: Option<(Candidate, u64)> = None;

        for &orientation in orientations(piece) {
            let (pw, ph) = oriented_dims(piece, orientation);
            if pw > self.stock_w || ph > self.stock_h {
                continue;
            }
            let candidate = self
                .row_fit(Row::Top, pw, ph, orientation)
                .or_else(|| self.row_fit(Row::Bottom, pw, ph, orientation));
            if let Some((c, score)) = candidate
                && (best.is_none() || score < best.unwrap().1)
            {
                best = Some((c, score));
            }
        }

        best.map(|(c, _)| c)
    }

    fn row_fit(&self, row: Row, pw: u32, ph: u32, orientation: Orientation) -> Option<(Candidate, u64)> {
        let (y, cursor, sequential_base, flexible_base) = match row {
            Row::Top => (0, self.top_x, 0u64, 10_000),
            Row::Bottom => (self.stock_h - ph, self.bottom_x, 100_000, 110_000),
        };

        let mut best: Option<(Candidate, u64)> = None;
        for free in &self.free_rects {
            // The window must span the full row band and be wide enough.
            let covers_band = match row {
                Row::Top => free.y == 0 && free.h >= ph,
                Row::Bottom => free.y <= y && free.bottom() >= self.stock_h,
            };
            if !covers_band || free.w < pw {
                continue;
            }

            let sequential = free.x <= cursor
                && free.right() >= cursor + pw
                && cursor + pw <= self.stock_w;
            let (x, base) = if sequential {
                (cursor, sequential_base)
            } else {
                let x = cursor.max(free.x);
                if x + pw > free.right().min(self.stock_w) {
                    continue;
                }
                (x, flexible_base)
            };

            let leftover = free.area() - pw as u64 * ph as u64;
            let score = base + x as u64 * 100 + leftover / 1000;
            if best.is_none() || score < best.unwrap().1 {
                best = Some((
                    Candidate {
                        x,
                        y,
                        w: pw,
                        h: ph,
                        orientation,
                        kind: CandidateKind::Edge { row },
                    },
                    score,
                ));
            }
        }
        best
    }

    fn commit(&mut self, piece: &Piece, candidate: Candidate) -> Placement {
        let placement = Placement {
            x: candidate.x,
            y: candidate.y,
            w: candidate.w,
            h: candidate.h,
            piece_id: piece.piece_id,
            type_id: piece.type_id,
            orientation: candidate.orientation,
            panel_index: self.panel_index,
        };
        let placed = placement.rect();

        let mut frees = std::mem::take(&mut self.free_rects);
        match candidate.kind {
            CandidateKind::Free { free_idx } => {
                // The placement sits at the window's top-left corner, so the
                // guillotine split of the chosen window applies.
                let used = frees.remove(free_idx);
                frees.extend(free_rects::split_around(used, placed));
            }
            CandidateKind::Edge { row } => {
                // The placement is generally not at a window corner; the
                // general subtraction below handles the chosen window too.
                match row {
                    Row::Top => self.top_x = self.top_x.max(placed.right()),
                    Row::Bottom => self.bottom_x = self.bottom_x.max(placed.right()),
                }
            }
        }
        let mut frees = free_rects::subtract_placed(frees, placed);
        free_rects::merge_colinear(&mut frees);
        free_rects::filter_small(&mut frees, self.min_waste);
        self.free_rects = frees;

        self.placements.push(placement);
        placement
    }
}

fn orientations(piece: &Piece) -> &'static [Orientation] {
    if piece.rotation_allowed {
        &[Orientation::Original, Orientation::Rotated]
    } else {
        &[Orientation::Original]
    }
}

fn oriented_dims(piece: &Piece, orientation: Orientation) -> (u32, u32) {
    match orientation {
        Orientation::Original => (piece.w, piece.h),
        Orientation::Rotated => (piece.h, piece.w),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(id: usize, w: u32, h: u32, rotation_allowed: bool) -> Piece {
        Piece {
            piece_id: id,
            type_id: 0,
            w,
            h,
            rotation_allowed,
        }
    }

    #[test]
    fn test_free_place_single_piece() {
        let mut panel = Panel::new(0, 1000, 1000, 100);
        let p = panel
            .try_place(&piece(0, 200, 150, true), PlacementMode::Free)
            .unwrap();
        assert_eq!((p.x, p.y, p.w, p.h), (0, 0, 200, 150));
        assert_eq!(p.orientation, Orientation::Original);
        assert_eq!(
            panel.free_rects,
            vec![Rect::new(200, 0, 800, 1000), Rect::new(0, 150, 200, 850)]
        );
    }

    #[test]
    fn test_free_piece_too_large() {
        let mut panel = Panel::new(0, 100, 100, 0);
        assert!(panel
            .try_place(&piece(0, 200, 50, false), PlacementMode::Free)
            .is_none());
    }

    #[test]
    fn test_free_rotation_when_only_rotated_fits() {
        let mut panel = Panel::new(0, 100, 300, 0);
        assert!(panel
            .try_place(&piece(0, 200, 50, false), PlacementMode::Free)
            .is_none());
        let p = panel
            .try_place(&piece(0, 200, 50, true), PlacementMode::Free)
            .unwrap();
        assert_eq!(p.orientation, Orientation::Rotated);
        assert_eq!((p.w, p.h), (50, 200));
    }

    #[test]
    fn test_free_equal_scores_prefer_original_orientation() {
        // 250x50 and its rotation both fit the full sheet with the same
        // leftover, so the non-rotated orientation must win.
        let mut panel = Panel::new(0, 300, 300, 100);
        let p = panel
            .try_place(&piece(0, 250, 50, true), PlacementMode::Free)
            .unwrap();
        assert_eq!(p.orientation, Orientation::Original);
        assert_eq!((p.w, p.h), (250, 50));
    }

    #[test]
    fn test_free_lower_y_dominates_tighter_fit() {
        let mut panel = Panel::new(0, 1000, 1000, 10);
        panel.free_rects = vec![Rect::new(0, 500, 100, 100), Rect::new(500, 0, 400, 400)];
        // The snug 100x100 window sits lower; Bottom-Left still prefers the
        // higher (smaller y) window despite its bigger leftover.
        let p = panel
            .try_place(&piece(0, 100, 100, false), PlacementMode::Free)
            .unwrap();
        assert_eq!((p.x, p.y), (500, 0));
    }

    #[test]
    fn test_free_lower_x_breaks_y_ties() {
        let mut panel = Panel::new(0, 1000, 1000, 10);
        panel.free_rects = vec![Rect::new(600, 0, 150, 150), Rect::new(100, 0, 400, 400)];
        let p = panel
            .try_place(&piece(0, 100, 100, false), PlacementMode::Free)
            .unwrap();
        assert_eq!((p.x, p.y), (100, 0));
    }

    #[test]
    fn test_free_leftover_breaks_position_ties() {
        let mut panel = Panel::new(0, 1000, 1000, 10);
        // Same top-left corner, one window tighter than the other.
        panel.free_rects = vec![Rect::new(0, 0, 400, 400), Rect::new(0, 0, 120, 120)];
        let p = panel
            .try_place(&piece(0, 100, 100, false), PlacementMode::Free)
            .unwrap();
        assert_eq!((p.x, p.y), (0, 0));
        // The tighter window was consumed, the loose one was subtracted.
        assert!(panel.free_rects.iter().all(|f| !f.overlaps(&p.rect())));
    }

    #[test]
    fn test_free_min_waste_drops_slivers() {
        let mut panel = Panel::new(0, 300, 300, 100);
        panel
            .try_place(&piece(0, 250, 50, false), PlacementMode::Free)
            .unwrap();
        // The 50mm strip right of the piece is below the waste threshold.
        assert_eq!(panel.free_rects, vec![Rect::new(0, 50, 250, 250)]);
    }

    #[test]
    fn test_edge_fills_top_row_then_bottom() {
        let mut panel = Panel::new(0, 1000, 500, 100);
        let one = piece(0, 400, 100, false);

        let p = panel.try_place(&one, PlacementMode::EdgeAligned).unwrap();
        assert_eq!((p.x, p.y), (0, 0));
        assert_eq!(panel.top_x, 400);

        let p = panel.try_place(&one, PlacementMode::EdgeAligned).unwrap();
        assert_eq!((p.x, p.y), (400, 0));
        assert_eq!(panel.top_x, 800);

        // Only 200mm left in the top row: the third piece drops to the bottom.
        let p = panel.try_place(&one, PlacementMode::EdgeAligned).unwrap();
        assert_eq!((p.x, p.y), (0, 400));
        assert_eq!(panel.top_x, 800);
        assert_eq!(panel.bottom_x, 400);
    }

    #[test]
    fn test_edge_placements_touch_panel_edges() {
        let mut panel = Panel::new(0, 800, 600, 50);
        for _ in 0..6 {
            if panel
                .try_place(&piece(0, 300, 150, false), PlacementMode::EdgeAligned)
                .is_none()
            {
                break;
            }
        }
        assert!(!panel.placements.is_empty());
        for p in &panel.placements {
            assert!(p.y == 0 || p.y + p.h == 600, "placement {p:?} off both rows");
        }
    }

    #[test]
    fn test_edge_rejects_oversized_piece() {
        let mut panel = Panel::new(0, 500, 200, 0);
        assert!(panel
            .try_place(&piece(0, 600, 100, false), PlacementMode::EdgeAligned)
            .is_none());
        assert!(panel
            .try_place(&piece(0, 100, 300, false), PlacementMode::EdgeAligned)
            .is_none());
    }

    #[test]
    fn test_edge_interior_window_not_eligible() {
        let mut panel = Panel::new(0, 1000, 500, 0);
        // A window detached from both rows cannot host an edge placement.
        panel.free_rects = vec![Rect::new(0, 100, 1000, 300)];
        assert!(panel
            .try_place(&piece(0, 200, 100, false), PlacementMode::EdgeAligned)
            .is_none());
    }

    #[test]
    fn test_edge_full_height_piece_counts_as_top_row() {
        let mut panel = Panel::new(0, 1000, 500, 0);
        let p = panel
            .try_place(&piece(0, 300, 500, false), PlacementMode::EdgeAligned)
            .unwrap();
        assert_eq!((p.x, p.y), (0, 0));
        assert_eq!(panel.top_x, 300);
        assert_eq!(panel.bottom_x, 0);
    }

    #[test]
    fn test_edge_flexible_skips_consumed_gap() {
        let mut panel = Panel::new(0, 1000, 500, 0);
        // The leading 300mm of the top band is unavailable; the cursor is
        // still at 0, so the placement jumps to the window start.
        panel.free_rects = vec![Rect::new(300, 0, 700, 500)];
        let p = panel
            .try_place(&piece(0, 200, 100, false), PlacementMode::EdgeAligned)
            .unwrap();
        assert_eq!((p.x, p.y), (300, 0));
        assert_eq!(panel.top_x, 500);
    }

    #[test]
    fn test_exact_fill_leaves_no_free_rects() {
        let mut panel = Panel::new(0, 100, 100, 0);
        panel
            .try_place(&piece(0, 100, 100, false), PlacementMode::Free)
            .unwrap();
        assert!(panel.free_rects.is_empty());
    }
}
