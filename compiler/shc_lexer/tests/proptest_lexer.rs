//! Property-based tests for the lexer.
//!
//! The lexer must never panic: any input either tokenizes or yields a
//! lex error, and successful token spans tile the input in order.

use proptest::prelude::*;
use shc_ir::TokenKind;
use shc_lexer::tokenize;

fn shaderish_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("float4".to_string()),
            Just("x".to_string()),
            Just(" ".to_string()),
            Just("\n".to_string()),
            Just("+=".to_string()),
            Just("<<".to_string()),
            Just("(".to_string()),
            Just(")".to_string()),
            Just(";".to_string()),
            Just(".".to_string()),
            Just("/* c */".to_string()),
            Just("// c\n".to_string()),
            "[0-9]{1,4}".prop_map(|s| s),
            "[0-9]{1,3}\\.[0-9]{0,3}f?".prop_map(|s| s),
            "[a-z_]{1,6}".prop_map(|s| s),
        ],
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lexer_never_panics(input in "\\PC{0,80}") {
        let _ = tokenize(&input);
    }

    #[test]
    fn spans_are_ordered(input in shaderish_text()) {
        if let Ok(tokens) = tokenize(&input) {
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
            let mut previous_end = 0;
            for token in &tokens {
                prop_assert!(token.span.start >= previous_end);
                prop_assert!(token.span.end as usize <= input.len());
                previous_end = token.span.end;
            }
        }
    }

    #[test]
    fn lines_never_decrease(input in shaderish_text()) {
        if let Ok(tokens) = tokenize(&input) {
            let lines: Vec<u32> = tokens.iter().map(|t| t.line).collect();
            prop_assert!(lines.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
