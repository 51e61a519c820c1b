//! White-space stripping.
//!
//! A line whose only non-whitespace content is FTL tags or comments loses its
//! indentation, trailing whitespace and line break. Lines with any static
//! text, interpolation or `#noparse` block are left untouched.

use ftl_ir::Span;

use crate::scanner::Piece;

/// Remove ignorable whitespace from the text pieces of `pieces`.
///
/// `pieces` must be the in-order output of [`crate::scan`] for `source`.
pub fn strip_whitespace(source: &str, pieces: Vec<Piece>) -> Vec<Piece> {
    let removals = strippable_lines(source, &pieces);
    if removals.is_empty() {
        return pieces;
    }
    let mut out = Vec::with_capacity(pieces.len());
    let mut next = 0;
    for piece in pieces {
        let Piece::Text(span) = piece else {
            out.push(piece);
            continue;
        };
        let (start, end) = (span.start as usize, span.end as usize);
        while next < removals.len() && removals[next].1 <= start {
            next += 1;
        }
        let mut cursor = start;
        let mut i = next;
        while i < removals.len() && removals[i].0 < end {
            let (cut_start, cut_end) = removals[i];
            if cut_start > cursor {
                out.push(Piece::Text(Span::from_range(cursor..cut_start)));
            }
            cursor = cursor.max(cut_end);
            i += 1;
        }
        if cursor < end {
            out.push(Piece::Text(Span::from_range(cursor..end)));
        }
    }
    out
}

/// Byte ranges (including the line break) of lines to strip.
fn strippable_lines(source: &str, pieces: &[Piece]) -> Vec<(usize, usize)> {
    let bytes = source.as_bytes();
    let mut removals = Vec::new();
    let mut first_piece = 0;
    let mut line_start = 0;
    while line_start < bytes.len() {
        let (content_end, line_end) = match memchr::memchr(b'\n', &bytes[line_start..]) {
            Some(idx) => (line_start + idx, line_start + idx + 1),
            None => (bytes.len(), bytes.len()),
        };
        while first_piece < pieces.len() && (pieces[first_piece].span().end as usize) <= line_start
        {
            first_piece += 1;
        }

        let mut has_tag = false;
        let mut blank = true;
        for piece in &pieces[first_piece..] {
            let span = piece.span();
            if span.start as usize >= line_end {
                break;
            }
            match piece {
                Piece::Text(_) => {
                    let from = (span.start as usize).max(line_start);
                    let to = (span.end as usize).min(content_end);
                    let inline_space = |b: &u8| matches!(b, b' ' | b'\t' | b'\r');
                    if from < to && !bytes[from..to].iter().all(inline_space) {
                        blank = false;
                    }
                }
                other if other.is_tag() => has_tag = true,
                _ => blank = false,
            }
            if !blank {
                break;
            }
        }
        if blank && has_tag {
            removals.push((line_start, line_end));
        }
        line_start = line_end;
    }
    tracing::trace!(lines = removals.len(), "stripped lines");
    removals
}
