//! Free-region registry: the set of still-usable rectangles on one panel.
//!
//! Free rectangles are candidate placement windows, not a partition; two
//! entries may overlap each other (MaxRects), but never a placement.

use crate::types::Rect;

/// Guillotine decomposition of `used` after `placed` was cut out of it,
/// vertical strip first. Emits up to three residuals: the strip right of the
/// placement over the full height of `used`, the strip below the placement at
/// the placement's width, and the corner below-left of the placement.
pub fn split_around(used: Rect, placed: Rect) -> Vec<Rect> {
    let mut out = Vec::with_capacity(3);

    let right_w = used.right().saturating_sub(placed.right());
    if right_w > 0 {
        out.push(Rect::new(placed.right(), used.y, right_w, used.h));
    }

    let below_h = used.bottom().saturating_sub(placed.bottom());
    if below_h > 0 {
        out.push(Rect::new(placed.x, placed.bottom(), placed.w, below_h));
    }

    let corner_w = placed.x.saturating_sub(used.x);
    if corner_w > 0 && below_h > 0 {
        out.push(Rect::new(used.x, placed.bottom(), corner_w, below_h));
    }

    out
}

/// Restores disjointness from `placed`: every free rectangle overlapping it
/// is replaced by up to four strips covering its remainder (left and right at
/// the full height of the free rect, top and bottom at its full width). The
/// strips overlap each other at the corners.
pub fn subtract_placed(frees: Vec<Rect>, placed: Rect) -> Vec<Rect> {
    let mut out = Vec::with_capacity(frees.len());
    for free in frees {
        if !free.overlaps(&placed) {
            out.push(free);
            continue;
        }
        if placed.x > free.x {
            out.push(Rect::new(free.x, free.y, placed.x - free.x, free.h));
        }
        if placed.right() < free.right() {
            out.push(Rect::new(
                placed.right(),
                free.y,
                free.right() - placed.right(),
                free.h,
            ));
        }
        if placed.y > free.y {
            out.push(Rect::new(free.x, free.y, free.w, placed.y - free.y));
        }
        if placed.bottom() < free.bottom() {
            out.push(Rect::new(
                free.x,
                placed.bottom(),
                free.w,
                free.bottom() - placed.bottom(),
            ));
        }
    }
    out
}

/// Greedy fixpoint merging of pairs that share a full edge exactly: same
/// height at the same `y` adjoining on `x`, or same width at the same `x`
/// adjoining on `y`.
pub fn merge_colinear(frees: &mut Vec<Rect>) {
    let mut merged = true;
    while merged {
        merged = false;
        'outer: for i in 0..frees.len() {
            for j in (i + 1)..frees.len() {
                if let Some(m) = try_merge(frees[i], frees[j]) {
                    frees[i] = m;
                    frees.remove(j);
                    merged = true;
                    break 'outer;
                }
            }
        }
    }
}

fn try_merge(a: Rect, b: Rect) -> Option<Rect> {
    if a.y == b.y && a.h == b.h {
        if a.right() == b.x {
            return Some(Rect::new(a.x, a.y, a.w + b.w, a.h));
        }
        if b.right() == a.x {
            return Some(Rect::new(b.x, b.y, a.w + b.w, a.h));
        }
    }
    if a.x == b.x && a.w == b.w {
        if a.bottom() == b.y {
            return Some(Rect::new(a.x, a.y, a.w, a.h + b.h));
        }
        if b.bottom() == a.y {
            return Some(Rect::new(b.x, b.y, a.w, a.h + b.h));
        }
    }
    None
}

/// Drops residuals too small to be a usable off-cut in either dimension.
pub fn filter_small(frees: &mut Vec<Rect>, min_size: u32) {
    frees.retain(|f| f.w >= min_size && f.h >= min_size);
}
