pub mod error;
pub mod expr;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod util;
pub mod value;

pub use error::Error;
pub use interpreter::{
    Environment, Output, ProgramResult, RunOptions, apply_initializer, run, run_program,
    run_program_with_options,
};
