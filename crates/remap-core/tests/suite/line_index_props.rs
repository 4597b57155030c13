use proptest::prelude::*;
use remap_core::{LineIndex, TextSize};

const PROPTEST_CASES: u32 = 256;

fn arb_char() -> impl Strategy<Value = char> {
    prop_oneof![
        12 => prop::sample::select(vec!['a', 'b', 'x', '0', ' ', '\t', '{', ';']),
        3 => Just('\n'),
        2 => Just('\r'),
        2 => Just('é'),
        2 => Just('中'),
        1 => Just('😀'),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_char(), 0..=64).prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn char_boundaries_round_trip(text in arb_text()) {
        let index = LineIndex::new(&text);
        for (offset, ch) in text.char_indices() {
            // Offsets inside a line terminator are not addressable by a column.
            if ch == '\n' || ch == '\r' {
                continue;
            }
            let offset = TextSize::from(offset as u32);
            let position = index.position(&text, offset);
            prop_assert!(position.line >= 1);
            prop_assert!(position.column >= 1);
            prop_assert_eq!(index.offset(&text, position), Some(offset));
        }
    }

    #[test]
    fn line_of_is_monotonic(text in arb_text()) {
        let index = LineIndex::new(&text);
        let mut previous = 0;
        for (offset, _) in text.char_indices() {
            let line = index.line_of(TextSize::from(offset as u32));
            prop_assert!(line >= previous);
            prop_assert!(line < index.line_count());
            previous = line;
        }
    }
}
