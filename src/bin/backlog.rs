//! backlog CLI: consult files, then answer queries interactively.
//!
//! Usage: `backlog [--no-library] [--flame <folded-stacks>] [file.pl ...]`

use std::io::{stdin, stdout, BufReader};
use std::process::ExitCode;

use backlog::api::EngineConfig;
use backlog::repl::Repl;
use backlog::trace::{init_flamegraph, init_subscriber};

/// Deep recursion in user programs runs on the Rust stack.
const STACK_SIZE: usize = 256 * 1024 * 1024;

struct Options {
    load_library: bool,
    flame: Option<String>,
    files: Vec<String>,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        load_library: true,
        flame: None,
        files: Vec::new(),
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-library" => options.load_library = false,
            "--flame" => {
                options.flame = Some(args.next().ok_or("--flame needs a path")?);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ => options.files.push(arg),
        }
    }
    Ok(options)
}

fn run(options: Options) -> Result<(), String> {
    let _flame = match &options.flame {
        Some(path) => Some(init_flamegraph(path).map_err(|e| format!("--flame {path}: {e}"))?),
        None => {
            init_subscriber();
            None
        }
    };

    let mut repl = Repl::with_config(EngineConfig::default().with_library(options.load_library));
    for file in &options.files {
        repl.engine()
            .consult_file(file)
            .map_err(|e| format!("{file}: {e}"))?;
    }

    let mut input = BufReader::new(stdin().lock());
    let mut output = stdout().lock();
    repl.run(&mut input, &mut output).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };
    let worker = std::thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(move || run(options));
    let result = match worker {
        Ok(handle) => handle
            .join()
            .unwrap_or_else(|_| Err("interpreter thread panicked".to_string())),
        Err(e) => Err(e.to_string()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
