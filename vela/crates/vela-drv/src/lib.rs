//! Driver: wires the five pipeline stages together behind one
//! entry point, per the driver contract. Each stage shares the
//! [`Handler`] a source file was lexed with, so diagnostics from the
//! lexer and the parser both land in the same place.

pub mod config;

use anyhow::{bail, Context};
use std::io::Read as _;

pub use config::{Config, EmitStage};

use vela_gen::CodeGenerator;
use vela_sem::SemanticAnalyzer;
use vela_util::{Handler, SourceFile};
use vela_vm::StackMachine;

/// Runs one compile-and-execute cycle per `config`, printing to stdout
/// whatever the requested `EmitStage` calls for.
pub fn run(config: Config) -> anyhow::Result<()> {
    let _span = tracing::debug_span!("drv::run").entered();

    let (name, source) = read_source(&config)?;
    let file = SourceFile::new(name, source.clone());
    let handler = Handler::new();

    let tokens = vela_lex::tokenize(&source, &handler);
    if config.emit == EmitStage::Tokens {
        for token in &tokens {
            println!("{:?}", token.kind);
        }
        return Ok(());
    }

    let program = vela_par::parse(tokens, &handler);
    if handler.has_errors() {
        bail!(handler.render(&file));
    }
    if config.emit == EmitStage::Ast {
        println!("{program:#?}");
        return Ok(());
    }

    let mut analyzer = SemanticAnalyzer::new(&handler);
    analyzer.analyze(&program).context("semantic analysis failed")?;

    let code = CodeGenerator::generate(&program).context("code generation failed")?;
    if config.emit == EmitStage::Bytecode {
        for instr in &code {
            println!("{}", instr.to_text());
        }
        return Ok(());
    }

    let mut vars = StackMachine::new(code).run().context("execution failed")?.into_iter().collect::<Vec<_>>();
    vars.sort_by(|a, b| a.0.cmp(&b.0));
    println!("-- final state --");
    for (name, value) in vars {
        println!("{name} = {value}");
    }
    Ok(())
}

fn read_source(config: &Config) -> anyhow::Result<(String, String)> {
    match &config.input {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            Ok((path.display().to_string(), contents))
        }
        None => {
            let mut contents = String::new();
            std::io::stdin()
                .read_to_string(&mut contents)
                .context("failed to read source from stdin")?;
            Ok(("<stdin>".to_string(), contents))
        }
    }
}
