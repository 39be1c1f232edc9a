use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use dfa_minimizer::catalog::{self, Catalog};
use dfa_minimizer::config::Configuration;
use dfa_minimizer::service::DfaService;
use dfa_minimizer::table::TransitionTable;
use dfa_minimizer::telemetry;
use dfa_minimizer::wire::{DfaDefinition, MinimizeRequest, Reply, SimulateRequest};
use dfa_minimizer::{Error, Result};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Arguments {
    /// Set a configuration file to use.
    #[arg(
        short,
        long = "config-file",
        env = "DFA_CONFIG",
        value_name = "FILE",
        global = true
    )]
    config_file: Option<PathBuf>,

    /// Print the effective configuration and exit.
    #[arg(long)]
    dump_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run an automaton over an input string.
    Simulate {
        #[command(flatten)]
        source: Source,
        #[arg(short, long, default_value = "")]
        input: String,
    },
    /// Compute the minimal equivalent automaton.
    Minimize {
        #[command(flatten)]
        source: Source,
    },
    /// Print the transition table of an automaton.
    Table {
        #[command(flatten)]
        source: Source,
    },
    /// List the predefined automata, or print one of them.
    Examples { name: Option<String> },
    /// Answer a raw JSON request read from FILE, or from stdin.
    Request {
        #[arg(value_enum)]
        operation: Operation,
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Definition file.
    #[arg(long, value_name = "FILE")]
    dfa: Option<PathBuf>,
    /// Name of a predefined automaton.
    #[arg(long, value_name = "NAME")]
    example: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Operation {
    Simulate,
    Minimize,
}

fn main() -> ExitCode {
    let cli_args = Arguments::parse();

    let config = match Configuration::load(cli_args.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error when loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli_args.dump_config {
        return match config.dump() {
            Ok(dumped) => {
                print!("{dumped}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let Some(command) = cli_args.command else {
        // help goes to stdout, a failed write there is not worth reporting
        let _ = Arguments::command().print_help();
        return ExitCode::FAILURE;
    };

    if let Err(e) = telemetry::init_logging(&config) {
        eprintln!("Failed to instrument logging: {e}");
        return ExitCode::FAILURE;
    }
    debug!(?command, ?config, "running");

    match run(command, &config) {
        Ok(code) => code,
        Err(e) => {
            print_reply(&Reply::<()>::failure(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &Configuration) -> Result<ExitCode> {
    let catalog = Catalog::new(&config.catalog_dir);
    let service = DfaService::new(config.limits.clone());

    match command {
        Command::Simulate { source, input } => {
            let request = SimulateRequest {
                dfa: Some(source.load(&catalog)?),
                input_string: input,
            };
            print_reply(&Reply::success(service.simulate(&request)?));
        }
        Command::Minimize { source } => {
            let request = MinimizeRequest {
                dfa: Some(source.load(&catalog)?),
            };
            print_reply(&Reply::success(service.minimize(&request)?));
        }
        Command::Table { source } => {
            let automaton = service.build(&source.load(&catalog)?)?;
            print!("{}", TransitionTable::from_automaton(&automaton));
        }
        Command::Examples { name: None } => {
            let examples = catalog.list()?;
            info!(dir = %catalog.dir().display(), count = examples.len(), "listed examples");
            print_json(&json!({ "examples": examples }))?;
        }
        Command::Examples { name: Some(name) } => {
            let dfa = catalog.load(&name)?;
            print_json(&json!({ "success": true, "dfa": dfa }))?;
        }
        Command::Request { operation, file } => {
            let body = read_body(file.as_deref())?;
            // the reply envelope carries request errors, only I/O fails the process
            let succeeded = match operation {
                Operation::Simulate => respond(service.handle_simulate(&body)),
                Operation::Minimize => respond(service.handle_minimize(&body)),
            };
            if !succeeded {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

impl Source {
    fn load(&self, catalog: &Catalog) -> Result<DfaDefinition> {
        match (&self.dfa, &self.example) {
            (Some(path), _) => catalog::load_definition(path),
            (None, Some(name)) => catalog.load(name),
            (None, None) => Err(Error::MissingDfa),
        }
    }
}

fn read_body(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| Error::io(path, e)),
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .map_err(|e| Error::io("<stdin>", e))?;
            Ok(body)
        }
    }
}

fn respond<T: Serialize>(result: Result<T>) -> bool {
    let reply = Reply::from(result);
    print_reply(&reply);
    reply.success
}

fn print_reply<T: Serialize>(reply: &Reply<T>) {
    match reply.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to render reply: {e}"),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
