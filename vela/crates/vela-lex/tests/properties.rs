use proptest::prelude::*;
use vela_lex::tokenize;
use vela_util::Handler;

fn arb_program() -> impl Strategy<Value = String> {
    let ident = "[a-z][a-z0-9]{0,4}";
    let number = "[0-9]{1,4}";
    prop::collection::vec(
        prop_oneof![
            ident.prop_map(|n| format!("{n} = {n};\n")),
            (ident, number).prop_map(|(n, v)| format!("{n} = {v};\n")),
            Just("if (1) { } else { }\n".to_string()),
            Just("while (0) { }\n".to_string()),
        ],
        0..10,
    )
    .prop_map(|lines| lines.concat())
}

proptest! {
    #[test]
    fn token_lines_never_decrease(src in arb_program()) {
        let handler = Handler::new();
        let tokens = tokenize(&src, &handler);
        for w in tokens.windows(2) {
            prop_assert!(w[1].line >= w[0].line);
        }
    }

    #[test]
    fn tokenizing_never_panics_on_arbitrary_text(src in ".{0,200}") {
        let handler = Handler::new();
        let _ = tokenize(&src, &handler);
    }
}
