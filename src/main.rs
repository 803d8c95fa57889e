//! Main entry point for the satchel CLI app

use std::io;
use std::process::ExitCode;

use satchel::{cli, commands, exit, logging};

fn main() -> ExitCode {
    logging::init_diagnostics();
    let args: Vec<String> = std::env::args().skip(1).collect();
    ExitCode::from(exit::to_process_code(run_app(&args)))
}

fn run_app(args: &[String]) -> i32 {
    let Some((first, rest)) = args.split_first() else {
        let _ = cli::print_usage(io::stderr());
        return exit::ERROR;
    };
    match first.as_str() {
        "help" | "--help" | "-h" => {
            let _ = cli::print_usage(io::stdout());
            exit::SUCCESS
        }
        "--version" | "-V" => {
            println!("satchel {}", env!("CARGO_PKG_VERSION"));
            exit::SUCCESS
        }
        name => match commands::find(name) {
            Some(command) => command.main(rest),
            None => {
                eprintln!("Error: unknown command '{name}'");
                let _ = cli::print_usage(io::stderr());
                exit::ERROR
            }
        },
    }
}
