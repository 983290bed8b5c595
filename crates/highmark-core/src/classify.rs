use std::collections::HashMap;

use crate::color::{Color, MANY_COLOR};
use crate::document::{Highlight, HighlightId, Region};

/// Visual stacking class of a region. Capped at 3: beyond three overlapping
/// highlights the rendering collapses into one generic "many" indicator and
/// individual identity is intentionally discarded.
pub const TIER_CAP: u8 = 3;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stacking {
    pub tier: u8,
    /// Full priority-ordered id list, kept even past the cap so tests and
    /// diagnostics can see what collapsed.
    pub ordered: Vec<HighlightId>,
}

/// Pure tier derivation: `min(|active|, 3)` plus the stacking order the
/// region builder already fixed.
pub fn classify(region: &Region) -> Stacking {
    Stacking {
        tier: (region.active.len().min(TIER_CAP as usize)) as u8,
        ordered: region.active.clone(),
    }
}

/// One nestable markup command, outer to inner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WrapperSpec {
    /// Tag-colored background wash.
    Fill { tag: String, color: Color },
    /// Stacked underline stroke.
    Underline {
        color: Color,
        thickness_pt: u8,
        offset_pt: u8,
    },
}

/// The fixed tier-to-style table, as a concrete wrapper stack (outermost
/// first):
///
/// - every non-zero tier: one fill per distinct tag present, ordered by the
///   priority of the tag's first highlight, in that highlight's light
///   variant;
/// - tier 1: a 1pt underline at 2pt offset in the highlight's dark variant;
/// - tier 2: a 2pt/4pt underline for the higher-priority highlight outside
///   a 1pt/2pt underline for the other, each in its own dark variant;
/// - tier 3+: a single 4pt underline in the neutral "many" color.
///
/// Every id in the region's active set must resolve through `index`; the
/// emitter checks this before calling.
pub fn wrapper_stack(
    region: &Region,
    index: &HashMap<HighlightId, &Highlight>,
) -> Vec<WrapperSpec> {
    let stacking = classify(region);
    if stacking.tier == 0 {
        return Vec::new();
    }

    let mut stack = Vec::new();
    let mut seen_tags: Vec<&str> = Vec::new();
    for id in &stacking.ordered {
        let highlight = index[id];
        if seen_tags.contains(&highlight.tag.as_str()) {
            continue;
        }
        seen_tags.push(&highlight.tag);
        stack.push(WrapperSpec::Fill {
            tag: highlight.tag.clone(),
            color: highlight.color.light(),
        });
    }

    match stacking.tier {
        1 => {
            let highlight = index[&stacking.ordered[0]];
            stack.push(WrapperSpec::Underline {
                color: highlight.color.dark(),
                thickness_pt: 1,
                offset_pt: 2,
            });
        }
        2 => {
            let outer = index[&stacking.ordered[0]];
            let inner = index[&stacking.ordered[1]];
            stack.push(WrapperSpec::Underline {
                color: outer.color.dark(),
                thickness_pt: 2,
                offset_pt: 4,
            });
            stack.push(WrapperSpec::Underline {
                color: inner.color.dark(),
                thickness_pt: 1,
                offset_pt: 2,
            });
        }
        _ => {
            stack.push(WrapperSpec::Underline {
                color: MANY_COLOR,
                thickness_pt: 4,
                offset_pt: 2,
            });
        }
    }

    stack
}
