use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;

use pseudolang::CompileError;
use pseudolang::ast::printer;
use pseudolang::codegen;
use pseudolang::interpreter::Interpreter;
use pseudolang::scanner;

#[derive(Parser, Debug)]
#[command(
    name = "pseudolang",
    about = "Interpreter and Python translator for Spanish pseudocode"
)]
struct Cli {
    /// Pseudocode source file to run (omit for REPL)
    file: Option<PathBuf>,

    /// Translate to Python instead of running
    #[arg(long)]
    translate: bool,

    /// Where to write the translation (default: FILE with a .py extension)
    #[arg(short, long, value_name = "PATH", requires = "translate")]
    output: Option<PathBuf>,

    /// Print the translation to stdout instead of writing a file
    #[arg(long, requires = "translate", conflicts_with = "output")]
    stdout: bool,

    /// Dump tokens and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// AST output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,

    /// Print the global variables after a successful run
    #[arg(long)]
    dump_symbols: bool,
}

/// Exit status for programs that fail to compile.
const EXIT_COMPILE_ERROR: u8 = 65;
/// Exit status for programs that fail while running.
const EXIT_RUNTIME_ERROR: u8 = 70;

fn read_source(cli: &Cli) -> Result<(PathBuf, String)> {
    match &cli.file {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("read source file '{}'", path.display()))?;
            Ok((path.clone(), source))
        }
        None => bail!("source file required for this operation"),
    }
}

fn report_compile_error(error: CompileError, path: &Path, source: &str) {
    let report =
        miette::Report::new(error.with_source_code(path.display().to_string(), source));
    eprintln!("{report:?}");
}

fn translation_path(cli: &Cli, source_path: &Path) -> PathBuf {
    cli.output
        .clone()
        .unwrap_or_else(|| source_path.with_extension("py"))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.file.is_none() && !(cli.dump_tokens || cli.dump_ast || cli.translate) {
        pseudolang::repl::run_repl().context("run REPL")?;
        return Ok(ExitCode::SUCCESS);
    }

    let (path, source) = read_source(&cli)?;

    if cli.dump_tokens {
        for token in scanner::scan(&source) {
            println!("{token}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let program = match pseudolang::compile(&source) {
        Ok(program) => program,
        Err(e) => {
            report_compile_error(e, &path, &source);
            return Ok(ExitCode::from(EXIT_COMPILE_ERROR));
        }
    };

    if cli.dump_ast {
        match cli.ast_format.as_str() {
            "json" => println!("{}", printer::to_json(&program)),
            _ => print!("{}", printer::to_sexp(&program)),
        }
        return Ok(ExitCode::SUCCESS);
    }

    if cli.translate {
        let python = codegen::render(&program);
        if cli.stdout {
            print!("{python}");
        } else {
            let target = translation_path(&cli, &path);
            std::fs::write(&target, python)
                .with_context(|| format!("write translation to '{}'", target.display()))?;
            eprintln!("translation written to '{}'", target.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut interpreter = Interpreter::new();
    if let Err(e) = interpreter.run(&program) {
        eprintln!("{}", e.display_with_line(&source));
        return Ok(ExitCode::from(EXIT_RUNTIME_ERROR));
    }

    if cli.dump_symbols {
        for symbol in interpreter.scopes().globals() {
            println!("{symbol}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
