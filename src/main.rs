use clap::{App, Arg};
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use treelox::ast::AstPrinter;
use treelox::{Interpreter, Outcome};

const EX_USAGE: i32 = 64;
const EX_IOERR: i32 = 74;

fn main() {
    let matches = App::new("treelox")
        .about("Tree-walking interpreter for a small scripting language")
        .arg(
            Arg::with_name("print-ast")
                .long("print-ast")
                .help("Print each parsed statement to stderr before running it"),
        )
        .arg(
            Arg::with_name("SCRIPT")
                .help("Script to run; starts a prompt when omitted")
                .index(1),
        )
        .get_matches_safe()
        .unwrap_or_else(|e| match e.kind {
            clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => e.exit(),
            _ => {
                eprintln!("{}", e.message);
                process::exit(EX_USAGE);
            }
        });

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let print_ast = matches.is_present("print-ast");
    match matches.value_of("SCRIPT") {
        Some(path) => run_file(path, print_ast),
        None => run_prompt(print_ast),
    }
}

fn run_file(path: &str, print_ast: bool) {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Could not read {}: {}", path, e);
            process::exit(EX_IOERR);
        }
    };
    let mut interpreter = Interpreter::new();
    let outcome = run(&contents, &mut interpreter, print_ast);
    if outcome != Outcome::Ok {
        process::exit(outcome.into());
    }
}

fn run_prompt(print_ast: bool) {
    // Globals outlive each line; syntax errors do not.
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            return;
        }
        match lines.next() {
            Some(Ok(line)) => {
                run(&line, &mut interpreter, print_ast);
            }
            Some(Err(e)) => {
                eprintln!("{}", e);
                process::exit(EX_IOERR);
            }
            None => return,
        }
    }
}

fn run(source: &str, interpreter: &mut Interpreter, print_ast: bool) -> Outcome {
    let mut printer = AstPrinter::new();
    let result = treelox::run_with_ast(source, interpreter, |stmt| {
        if print_ast {
            eprintln!("{}", printer.print_statement(stmt));
        }
    });
    match result {
        Ok(()) => Outcome::Ok,
        Err(e) => {
            eprintln!("{}", e);
            e.outcome()
        }
    }
}
