pub mod error_handling;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::{fs, process::ExitCode};

use braceimp::{Environment, RunOptions, apply_initializer, lexer::scan, run_program_with_options};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error_handling::output_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum Emit {
    /// Lines printed by the program
    #[default]
    Output,
    /// Scanned token sequence, one token per line
    Tokens,
    /// Printed lines followed by the final variable bindings
    Env,
}

#[derive(Debug, Parser)]
#[command(name = "braceimp", about = "Run a braceimp program")]
struct Cli {
    /// Source file, or `-` to read standard input
    file: PathBuf,

    /// Stop with an error after this many statements and loop checks
    #[arg(long)]
    max_steps: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = Emit::Output)]
    emit: Emit,

    /// Raise log verbosity (repeatable); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// `name=expression` bindings applied before the program starts
    initializers: Vec<String>,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn read_source(file: &Path) -> io::Result<String> {
    if file.as_os_str() == "-" {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        Ok(src)
    } else {
        fs::read_to_string(file)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let src = match read_source(&cli.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file {}: {}", cli.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let file_name = match cli.file.as_os_str() == "-" {
        true => "<stdin>".to_string(),
        false => cli.file.to_string_lossy().into_owned(),
    };

    if cli.emit == Emit::Tokens {
        return match scan(&src) {
            Ok(tokens) => {
                for token in tokens {
                    println!("{}\t{}\t{}", token.line(), token.kind, token.lexeme);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                output_error(&src, file_name, &e.into());
                ExitCode::FAILURE
            }
        };
    }

    let mut environment = Environment::default();
    for (i, initializer) in cli.initializers.iter().enumerate() {
        environment = match apply_initializer(initializer, environment) {
            Ok(environment) => environment,
            Err(e) => {
                output_error(initializer, format!("initializer {}", i + 1), &e);
                return ExitCode::FAILURE;
            }
        };
    }

    tracing::info!(
        file = %file_name,
        initial_bindings = environment.len(),
        max_steps = ?cli.max_steps,
        "running program"
    );

    let options = RunOptions {
        step_limit: cli.max_steps,
        environment,
    };

    match run_program_with_options(&src, options) {
        Ok(result) => {
            print!("{}", result.output);
            if cli.emit == Emit::Env {
                for (name, value) in result.environment.sorted() {
                    println!("{} = {}", name, value);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            output_error(&src, file_name, &e);
            ExitCode::FAILURE
        }
    }
}
