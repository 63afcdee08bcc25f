pub mod error;
pub mod value;
pub mod vm;

pub use error::VmError;
pub use value::RtValue;
pub use vm::StackMachine;

#[cfg(test)]
mod tests {
    use super::*;
    use vela_gen::CodeGenerator;
    use vela_util::Handler;

    fn run(source: &str) -> rustc_hash::FxHashMap<String, RtValue> {
        let handler = Handler::new();
        let tokens = vela_lex::tokenize(source, &handler);
        let program = vela_par::parse(tokens, &handler);
        assert!(!handler.has_errors(), "source should parse cleanly: {source}");
        let code = CodeGenerator::generate(&program).expect("codegen should succeed");
        StackMachine::new(code).run().expect("vm should run to completion")
    }

    #[test]
    fn arithmetic_and_assignment() {
        let vars = run("x = 2 + 3 * 4;");
        assert_eq!(vars.get("x"), Some(&RtValue::Int(14)));
    }

    #[test]
    fn conditional_branch() {
        let vars = run("x = 10; if (x > 5) { y = 1; } else { y = 0; }");
        assert_eq!(vars.get("x"), Some(&RtValue::Int(10)));
        assert_eq!(vars.get("y"), Some(&RtValue::Int(1)));
    }

    #[test]
    fn while_loop_summing_one_to_five() {
        let vars = run("s = 0; i = 1; while (i <= 5) { s = s + i; i = i + 1; }");
        assert_eq!(vars.get("s"), Some(&RtValue::Int(15)));
        assert_eq!(vars.get("i"), Some(&RtValue::Int(6)));
    }

    #[test]
    fn for_loop_with_break() {
        let vars = run("for (i = 0; i < 10; i = i + 1) { if (i == 3) { break; } } r = i;");
        assert_eq!(vars.get("r"), Some(&RtValue::Int(3)));
    }

    #[test]
    fn function_with_parameters() {
        let vars = run("func add(a, b) { return a + b; } z = add(7, 35);");
        assert_eq!(vars.get("z"), Some(&RtValue::Int(42)));
    }

    #[test]
    fn division_is_always_true_division() {
        let vars = run("x = 7 / 2;");
        assert_eq!(vars.get("x"), Some(&RtValue::Float(3.5)));
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        let vars = run("x = -7 % 3;");
        assert_eq!(vars.get("x"), Some(&RtValue::Int(2)));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let handler = Handler::new();
        let tokens = vela_lex::tokenize("x = 1 / 0;", &handler);
        let program = vela_par::parse(tokens, &handler);
        let code = CodeGenerator::generate(&program).unwrap();
        let result = StackMachine::new(code).run();
        assert_eq!(result, Err(VmError::DivisionByZero));
    }

    #[test]
    fn and_or_return_operands_not_coerced_booleans() {
        // flagged explicitly per the design notes: `&&`/`||` propagate an
        // operand's identity rather than returning a plain boolean.
        let vars = run(r#"x = "" && "fallback"; y = "first" || "second";"#);
        assert_eq!(vars.get("x"), Some(&RtValue::Str("".to_string())));
        assert_eq!(vars.get("y"), Some(&RtValue::Str("first".to_string())));
    }

    #[test]
    fn string_concatenation_type_checks_but_fails_at_runtime() {
        // the analyzer permits `+` between strings (static layer), but
        // the VM only accepts numeric operands for ADD/SUB — a deliberate
        // divergence between the two layers, preserved as specified.
        let handler = Handler::new();
        let tokens = vela_lex::tokenize(r#"x = "a" + "b";"#, &handler);
        let program = vela_par::parse(tokens, &handler);
        let code = CodeGenerator::generate(&program).unwrap();
        let result = StackMachine::new(code).run();
        assert!(matches!(result, Err(VmError::TypeMismatch { op: "add", .. })));
    }
}
