use super::*;
use pretty_assertions::assert_eq;

#[test]
fn merge_covers_both() {
    let merged = Span::new(4, 8).merge(Span::new(1, 5));
    assert_eq!(merged, Span::new(1, 8));
    assert_eq!(merged.len(), 7);
}

#[test]
fn try_from_range_rejects_large_offsets() {
    let too_big = u32::MAX as usize + 1;
    assert_eq!(
        Span::try_from_range(0..too_big),
        Err(SpanError::EndTooLarge(too_big))
    );
}

#[test]
fn offset_by_shifts() {
    assert_eq!(Span::new(1, 3).offset_by(10), Span::new(11, 13));
}

mod line_index {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_line() {
        let src = "abc\ndef";
        let index = LineIndex::new(src);
        assert_eq!(index.position(src, 0), SourcePos { line: 1, column: 1 });
        assert_eq!(index.position(src, 2), SourcePos { line: 1, column: 3 });
    }

    #[test]
    fn later_lines() {
        let src = "abc\ndef\n\nxyz";
        let index = LineIndex::new(src);
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.position(src, 4), SourcePos { line: 2, column: 1 });
        assert_eq!(index.position(src, 8), SourcePos { line: 3, column: 1 });
        assert_eq!(index.position(src, 11), SourcePos { line: 4, column: 3 });
    }

    #[test]
    fn columns_count_chars() {
        let src = "é<#if>";
        let index = LineIndex::new(src);
        assert_eq!(index.position(src, 2), SourcePos { line: 1, column: 2 });
    }

    #[test]
    fn trailing_newline() {
        let src = "a\n";
        let index = LineIndex::new(src);
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.position(src, 2), SourcePos { line: 2, column: 1 });
    }
}
