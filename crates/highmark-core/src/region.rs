use std::collections::BTreeSet;

use crate::document::{Highlight, HighlightId, Region};
use crate::span::Span;

/// Partitions `[0, unit_len)` into maximal constant-coverage runs.
///
/// Classic boundary sweep: every highlight contributes an activation and a
/// deactivation event. Events sort by position with deactivations first, so
/// a highlight ending exactly where another begins never co-occupies a
/// region; priority then id fix the remaining order, keeping the walk fully
/// deterministic. The active set lives in a `BTreeSet` keyed by
/// `(priority, id)`, so every snapshot comes out already in stacking order.
///
/// The result covers the document exactly: uncovered text yields regions
/// with an empty active set. Zero-length regions are never produced.
/// Runs in `O((H + R) log H)` for `H` highlights and `R` regions.
pub fn build_regions(highlights: &[Highlight], unit_len: usize) -> Vec<Region> {
    if unit_len == 0 {
        return Vec::new();
    }

    let mut events: Vec<Event> = Vec::with_capacity(highlights.len() * 2);
    for highlight in highlights {
        let key = highlight.stack_key();
        events.push(Event {
            position: highlight.start,
            kind: EventKind::Activate,
            key,
        });
        events.push(Event {
            position: highlight.end,
            kind: EventKind::Deactivate,
            key,
        });
    }
    events.sort_by_key(|event| (event.position, event.kind, event.key));

    let mut regions = Vec::new();
    let mut active: BTreeSet<(u32, HighlightId)> = BTreeSet::new();
    let mut cursor = 0usize;
    let mut index = 0usize;

    while index < events.len() {
        let position = events[index].position;
        if position > cursor {
            regions.push(snapshot(cursor, position, &active));
            cursor = position;
        }
        while index < events.len() && events[index].position == position {
            let event = &events[index];
            match event.kind {
                EventKind::Deactivate => {
                    active.remove(&event.key);
                }
                EventKind::Activate => {
                    active.insert(event.key);
                }
            }
            index += 1;
        }
    }

    if cursor < unit_len {
        regions.push(snapshot(cursor, unit_len, &active));
    }

    regions
}

fn snapshot(start: usize, end: usize, active: &BTreeSet<(u32, HighlightId)>) -> Region {
    Region {
        span: Span { start, end },
        active: active.iter().map(|&(_, id)| id).collect(),
        continues_before: false,
        continues_after: false,
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Event {
    position: usize,
    kind: EventKind,
    key: (u32, HighlightId),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
enum EventKind {
    Deactivate,
    Activate,
}
