//! Command-line driver.
//!
//! `nanojs run` executes a script, `nanojs check` stops after parsing, and
//! `nanojs tokens` dumps the token stream. Every command reads the script
//! from a file path, or from stdin when the path is omitted or `-`.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::arena::AstArena;
use crate::builtins::StdoutSink;
use crate::error::Error;
use crate::intern::Interner;
use crate::interpreter::Interpreter;
use crate::lexer::Lexer;

#[derive(Parser)]
#[command(name = "nanojs")]
#[command(about = "Interpreter for the NanoJS scripting language", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a script
    Run {
        /// Script path (stdin when omitted or "-")
        file: Option<PathBuf>,

        /// Report wall-clock run time on stderr
        #[arg(long)]
        time: bool,
    },
    /// Lex and parse without evaluating
    Check {
        /// Script path (stdin when omitted or "-")
        file: Option<PathBuf>,
    },
    /// Dump the token stream
    Tokens {
        /// Script path (stdin when omitted or "-")
        file: Option<PathBuf>,
    },
}

/// Entry point for the CLI.
pub fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, time } => cmd_run(file.as_deref(), time),
        Commands::Check { file } => cmd_check(file.as_deref()),
        Commands::Tokens { file } => cmd_tokens(file.as_deref()),
    }
}

fn read_source(file: Option<&Path>) -> Result<String, Box<dyn std::error::Error>> {
    match file {
        Some(path) if path != Path::new("-") => Ok(fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Print the one-line diagnostic, then the rendering with source context,
/// and exit nonzero.
fn fail(err: &Error, source: &str) -> ! {
    eprintln!("{}", err);
    eprintln!("{}", err.display_with_source(source));
    std::process::exit(1);
}

fn cmd_run(file: Option<&Path>, time: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(file)?;

    let arena = AstArena::with_capacity(source.len());
    let mut interner = Interner::new();

    let started = Instant::now();
    let program = match crate::parse(&source, &mut interner, &arena) {
        Ok(p) => p,
        Err(e) => fail(&e, &source),
    };

    let mut interp = Interpreter::new(&interner, StdoutSink);
    if let Err(e) = interp.run(&program) {
        fail(&Error::Eval(e), &source);
    }

    if time {
        eprintln!("Time : {:.4}s", started.elapsed().as_secs_f64());
    }
    Ok(())
}

fn cmd_check(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(file)?;

    let arena = AstArena::with_capacity(source.len());
    let mut interner = Interner::new();

    match crate::parse(&source, &mut interner, &arena) {
        Ok(_) => {
            println!("Check passed");
            Ok(())
        }
        Err(e) => fail(&e, &source),
    }
}

fn cmd_tokens(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(file)?;

    let mut interner = Interner::new();
    let mut lexer = Lexer::new(&source, &mut interner);
    loop {
        let token = match lexer.next_token() {
            Ok(t) => t,
            Err(e) => fail(&Error::Lex(e), &source),
        };
        if token.is_eof() {
            break;
        }
        println!(
            "{:>4}  {:<12} {}",
            token.line,
            format!("{:?}", token.kind),
            lexer.resolve(token.lexeme)
        );
    }
    Ok(())
}
