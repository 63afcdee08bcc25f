pub mod analyzer;
pub mod error;
pub mod symbol_table;
pub mod types;

pub use analyzer::SemanticAnalyzer;
pub use error::SemanticError;
pub use symbol_table::{Symbol, SymbolTable};
pub use types::Type;

#[cfg(test)]
mod tests {
    use vela_util::Handler;

    use super::*;

    fn analyze(source: &str) -> Result<(), SemanticError> {
        let handler = Handler::new();
        let tokens = vela_lex::tokenize(source, &handler);
        let program = vela_par::parse(tokens, &handler);
        assert!(!handler.has_errors(), "source should parse cleanly: {source}");
        let mut analyzer = SemanticAnalyzer::new(&handler);
        analyzer.analyze(&program)
    }

    #[test]
    fn simple_assignment_and_arithmetic_is_accepted() {
        let result = analyze("x = 1; y = x + 2;");
        assert!(result.is_ok());
    }

    #[test]
    fn string_concatenation_with_plus_is_accepted() {
        let result = analyze(r#"greeting = "hello" + " world";"#);
        assert!(result.is_ok());
    }

    #[test]
    fn for_loop_with_assignment_update_is_accepted() {
        let result = analyze("for (i = 0; i < 10; i = i + 1) { total = total + i; }");
        assert!(result.is_ok());
    }

    #[test]
    fn function_call_with_wrong_arity_is_rejected() {
        let result = analyze("func add(a, b) { return a + b; } add(1);");
        assert!(matches!(result, Err(SemanticError::ArityMismatch { .. })));
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        let result = analyze("break;");
        assert!(matches!(result, Err(SemanticError::ControlFlowOutsideLoop { .. })));
    }

    #[test]
    fn return_outside_function_is_rejected() {
        let result = analyze("return 1;");
        assert!(matches!(result, Err(SemanticError::ReturnOutsideFunction { .. })));
    }

    #[test]
    fn undefined_variable_is_rejected() {
        let result = analyze("y = x + 1;");
        assert!(matches!(result, Err(SemanticError::UndefinedVariable { .. })));
    }

    #[test]
    fn modulo_on_non_integer_operand_is_rejected() {
        let result = analyze(r#"x = "foo"; y = x % 2;"#);
        assert!(matches!(result, Err(SemanticError::NonIntegerModulo { .. })));
    }

    #[test]
    fn reassignment_retypes_a_symbol_dynamically() {
        // x starts int, then is retyped to string by a later assignment;
        // subsequent uses should see the new type, not the original one.
        let result = analyze(r#"x = 1; x = "now a string"; y = x + "!";"#);
        assert!(result.is_ok());
    }

    #[test]
    fn calling_a_non_function_is_rejected() {
        let result = analyze("x = 1; x();");
        assert!(matches!(result, Err(SemanticError::NotAFunction { .. })));
    }
}
