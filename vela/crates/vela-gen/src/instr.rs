//! The structured bytecode representation and its textual serialization.
//!
//! Per the design notes: `Instr` is a tagged union, not a raw string.
//! [`Instr::to_text`] lowers a single instruction to the wire line form;
//! [`parse_text`] parses a full program back. The two are inverses for
//! any sequence this generator can produce.

use std::fmt;

/// A literal value fixed at code-generation time. Carried directly on
/// `Instr::Push` so the VM never has to re-derive a type from text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"), // Debug always prints a decimal point
            Value::Str(s) => write!(f, "\"{}\"", escape(s)),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    Push(Value),
    Load(String),
    Store(String),
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Neg,
    Label(String),
    Jz(String),
    JmpIfFalse(String),
    Jmp(String),
    Call { label: String, argc: usize },
    Ret,
    Pop,
    Halt,
}

impl Instr {
    pub fn to_text(&self) -> String {
        match self {
            Instr::Push(v) => format!("PUSH {v}"),
            Instr::Load(name) => format!("LOAD {name}"),
            Instr::Store(name) => format!("STORE {name}"),
            Instr::Add => "ADD".to_string(),
            Instr::Sub => "SUB".to_string(),
            Instr::Mul => "MUL".to_string(),
            Instr::Div => "DIV".to_string(),
            Instr::Mod => "MOD".to_string(),
            Instr::Lt => "LT".to_string(),
            Instr::Le => "LE".to_string(),
            Instr::Gt => "GT".to_string(),
            Instr::Ge => "GE".to_string(),
            Instr::Eq => "EQ".to_string(),
            Instr::Ne => "NE".to_string(),
            Instr::And => "AND".to_string(),
            Instr::Or => "OR".to_string(),
            Instr::Neg => "NEG".to_string(),
            Instr::Label(name) => format!("{name}:"),
            Instr::Jz(label) => format!("JZ {label}"),
            Instr::JmpIfFalse(label) => format!("JMP_IF_FALSE {label}"),
            Instr::Jmp(label) => format!("JMP {label}"),
            Instr::Call { label, argc } => format!("CALL {label} {argc}"),
            Instr::Ret => "RET".to_string(),
            Instr::Pop => "POP".to_string(),
            Instr::Halt => "HALT".to_string(),
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Instr::Label(_))
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BytecodeParseError {
    #[error("empty instruction line")]
    EmptyLine,
    #[error("unknown opcode '{0}'")]
    UnknownOpcode(String),
    #[error("malformed operand for '{0}'")]
    MalformedOperand(String),
}

/// Parses the textual bytecode form back into a `Vec<Instr>`. Inverse of
/// joining each instruction's [`Instr::to_text`] with newlines.
pub fn parse_text(text: &str) -> Result<Vec<Instr>, BytecodeParseError> {
    text.lines().filter(|l| !l.trim().is_empty()).map(parse_line).collect()
}

fn parse_line(line: &str) -> Result<Instr, BytecodeParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(BytecodeParseError::EmptyLine);
    }
    if let Some(name) = line.strip_suffix(':') {
        return Ok(Instr::Label(name.to_string()));
    }

    let (opcode, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    Ok(match opcode {
        "PUSH" => Instr::Push(parse_value(rest)?),
        "LOAD" => Instr::Load(rest.to_string()),
        "STORE" => Instr::Store(rest.to_string()),
        "ADD" => Instr::Add,
        "SUB" => Instr::Sub,
        "MUL" => Instr::Mul,
        "DIV" => Instr::Div,
        "MOD" => Instr::Mod,
        "LT" => Instr::Lt,
        "LE" => Instr::Le,
        "GT" => Instr::Gt,
        "GE" => Instr::Ge,
        "EQ" => Instr::Eq,
        "NE" => Instr::Ne,
        "AND" => Instr::And,
        "OR" => Instr::Or,
        "NEG" => Instr::Neg,
        "JZ" => Instr::Jz(rest.to_string()),
        "JMP_IF_FALSE" => Instr::JmpIfFalse(rest.to_string()),
        "JMP" => Instr::Jmp(rest.to_string()),
        "CALL" => {
            let (label, argc) = rest
                .split_once(' ')
                .ok_or_else(|| BytecodeParseError::MalformedOperand("CALL".to_string()))?;
            let argc = argc
                .trim()
                .parse::<usize>()
                .map_err(|_| BytecodeParseError::MalformedOperand("CALL".to_string()))?;
            Instr::Call { label: label.to_string(), argc }
        }
        "RET" => Instr::Ret,
        "POP" => Instr::Pop,
        "HALT" => Instr::Halt,
        other => return Err(BytecodeParseError::UnknownOpcode(other.to_string())),
    })
}

fn parse_value(text: &str) -> Result<Value, BytecodeParseError> {
    if let Some(inner) = text.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Ok(Value::Str(unescape(inner)));
    }
    match text {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }
    if text.contains('.') || text.contains('e') || text.contains('E') {
        text.parse::<f64>().map(Value::Float).map_err(|_| BytecodeParseError::MalformedOperand("PUSH".to_string()))
    } else {
        text.parse::<i64>().map(Value::Int).map_err(|_| BytecodeParseError::MalformedOperand("PUSH".to_string()))
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_and_float_round_trip_distinctly() {
        let instrs = vec![Instr::Push(Value::Int(5)), Instr::Push(Value::Float(5.0))];
        let text: Vec<String> = instrs.iter().map(Instr::to_text).collect();
        assert_eq!(text, vec!["PUSH 5", "PUSH 5.0"]);
        let parsed = parse_text(&text.join("\n")).unwrap();
        assert_eq!(parsed, instrs);
    }

    #[test]
    fn string_with_embedded_quote_and_whitespace_round_trips() {
        let original = Instr::Push(Value::Str("say \"hi\"\tthere".to_string()));
        let text = original.to_text();
        let parsed = parse_text(&text).unwrap();
        assert_eq!(parsed, vec![original]);
    }

    #[test]
    fn label_round_trips() {
        let original = Instr::Label("WHILE_START1".to_string());
        let parsed = parse_text(&original.to_text()).unwrap();
        assert_eq!(parsed, vec![original]);
    }

    #[test]
    fn call_round_trips_with_argc() {
        let original = Instr::Call { label: "FUNC_add".to_string(), argc: 2 };
        let parsed = parse_text(&original.to_text()).unwrap();
        assert_eq!(parsed, vec![original]);
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let result = parse_text("BOGUS 1 2");
        assert!(matches!(result, Err(BytecodeParseError::UnknownOpcode(_))));
    }
}
