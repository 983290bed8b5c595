use crate::document::{Block, Region};
use crate::span::Span;

/// Cuts every region at the block boundaries that fall strictly inside it.
///
/// The markup grammar only nests within one structural unit, so a highlight
/// spanning a block break has to close and reopen; the cut pieces inherit
/// the active set and carry `continues_before`/`continues_after` so the
/// emitter can signal visual continuity without violating nesting. Plain
/// pieces get no flags: tier-0 text has nothing to continue.
///
/// Merge-walk over the two ordered boundary lists; both inputs are already
/// validated, so every region lands inside the block cover.
pub fn split_at_blocks(regions: Vec<Region>, blocks: &[Block]) -> Vec<Region> {
    let mut out = Vec::with_capacity(regions.len());
    let mut block_index = 0usize;

    for region in regions {
        let mut cursor = region.span.start;
        while block_index < blocks.len() && blocks[block_index].span.end <= cursor {
            block_index += 1;
        }

        let highlighted = !region.active.is_empty();
        let mut first = true;
        while cursor < region.span.end {
            let block_end = blocks
                .get(block_index)
                .map(|block| block.span.end)
                .unwrap_or(region.span.end);
            let cut = block_end.min(region.span.end);
            let last = cut == region.span.end;
            out.push(Region {
                span: Span {
                    start: cursor,
                    end: cut,
                },
                active: region.active.clone(),
                continues_before: highlighted && !first,
                continues_after: highlighted && !last,
            });
            if cut == block_end {
                block_index += 1;
            }
            cursor = cut;
            first = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::split_at_blocks;
    use crate::document::{Block, BlockKind, HighlightId, Region};
    use crate::span::Span;

    fn region(start: usize, end: usize, ids: &[u64]) -> Region {
        Region {
            span: Span { start, end },
            active: ids.iter().map(|&id| HighlightId(id)).collect(),
            continues_before: false,
            continues_after: false,
        }
    }

    fn block(start: usize, end: usize) -> Block {
        Block {
            span: Span { start, end },
            kind: BlockKind::Paragraph,
        }
    }

    #[test]
    fn cuts_exactly_at_interior_boundaries() {
        let regions = vec![region(0, 10, &[7])];
        let blocks = vec![block(0, 5), block(5, 10)];
        let split = split_at_blocks(regions, &blocks);
        assert_eq!(split.len(), 2);
        assert_eq!((split[0].span.start, split[0].span.end), (0, 5));
        assert_eq!((split[1].span.start, split[1].span.end), (5, 10));
        assert!(!split[0].continues_before && split[0].continues_after);
        assert!(split[1].continues_before && !split[1].continues_after);
        assert_eq!(split[1].active, vec![HighlightId(7)]);
    }

    #[test]
    fn plain_regions_split_without_continuation() {
        let split = split_at_blocks(vec![region(0, 10, &[])], &[block(0, 4), block(4, 10)]);
        assert_eq!(split.len(), 2);
        assert!(split.iter().all(|r| !r.continues_before && !r.continues_after));
    }

    #[test]
    fn region_inside_one_block_is_untouched() {
        let split = split_at_blocks(vec![region(1, 4, &[2])], &[block(0, 5), block(5, 8)]);
        assert_eq!(split.len(), 1);
        assert!(!split[0].continues_before && !split[0].continues_after);
    }

    #[test]
    fn region_spanning_three_blocks_yields_three_pieces() {
        let split = split_at_blocks(
            vec![region(0, 9, &[1])],
            &[block(0, 3), block(3, 6), block(6, 9)],
        );
        assert_eq!(split.len(), 3);
        assert!(split[1].continues_before && split[1].continues_after);
    }

    #[test]
    fn boundary_at_region_edge_does_not_cut() {
        let split = split_at_blocks(
            vec![region(0, 5, &[1]), region(5, 10, &[1])],
            &[block(0, 5), block(5, 10)],
        );
        assert_eq!(split.len(), 2);
        assert!(split.iter().all(|r| !r.continues_before && !r.continues_after));
    }
}
