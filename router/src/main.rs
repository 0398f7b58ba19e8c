//! Operator CLI for a persisted router.
//!
//! Reads `.router/config.toml` and the snapshot it names from the current
//! directory. Read commands never write; `cut` and `transfer-owner` persist
//! only when the router accepts the change.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use router::core::loupe::Loupe;
use router::core::signature::{is_canonical_signature, parse_function_ref};
use router::core::types::{FunctionId, ModuleAddress, ModuleRoutes, RouterEvent};
use router::error::RouterError;
use router::exit_codes;
use router::session::{Session, apply_cut_file};

#[derive(Parser)]
#[command(
    name = "router",
    version,
    about = "Inspect and reconfigure a persisted call-dispatch router"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the snapshot against the schema and route-table invariants.
    Validate,
    /// Print every module with its function ids.
    Loupe {
        /// Only print this module's function ids.
        #[arg(long)]
        module: Option<ModuleAddress>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print module addresses in order.
    Modules,
    /// Print the module a function id (or signature) routes to.
    Resolve { function: String },
    /// Print the current owner.
    Owner,
    /// Print the function id derived from a canonical signature.
    Selector { signature: String },
    /// Apply a cut file as `caller`.
    Cut {
        #[arg(long)]
        caller: ModuleAddress,
        path: PathBuf,
    },
    /// Transfer ownership as `caller`.
    TransferOwner {
        #[arg(long)]
        caller: ModuleAddress,
        new_owner: ModuleAddress,
    },
}

fn main() {
    router::logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("read current directory")?;
    match cli.command {
        Command::Validate => cmd_validate(&root),
        Command::Loupe { module, json } => cmd_loupe(&root, module, json),
        Command::Modules => cmd_modules(&root),
        Command::Resolve { function } => cmd_resolve(&root, &function),
        Command::Owner => cmd_owner(&root),
        Command::Selector { signature } => cmd_selector(&signature),
        Command::Cut { caller, path } => cmd_cut(&root, caller, &path),
        Command::TransferOwner { caller, new_owner } => {
            cmd_transfer_owner(&root, caller, new_owner)
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RouterError>() {
        Some(router_err) if router_err.is_authorization() => exit_codes::UNAUTHORIZED,
        _ => exit_codes::INVALID,
    }
}

fn cmd_validate(root: &Path) -> Result<i32> {
    let session = Session::open(root)?;
    println!(
        "ok: {} modules, {} routes",
        session.router.all_modules().len(),
        session.router.route_index().len()
    );
    Ok(exit_codes::OK)
}

fn cmd_loupe(root: &Path, module: Option<ModuleAddress>, json: bool) -> Result<i32> {
    let session = Session::open(root)?;
    let groups = match module {
        Some(module) => vec![ModuleRoutes::new(module, session.router.routes_of(&module))],
        None => session.router.all_routes_by_module(),
    };
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&groups).context("serialize loupe output")?
        );
        return Ok(exit_codes::OK);
    }
    for group in groups {
        println!("{}", group.module);
        for id in group.functions {
            println!("  {id}");
        }
    }
    Ok(exit_codes::OK)
}

fn cmd_modules(root: &Path) -> Result<i32> {
    let session = Session::open(root)?;
    for module in session.router.all_modules() {
        println!("{module}");
    }
    Ok(exit_codes::OK)
}

fn cmd_resolve(root: &Path, function: &str) -> Result<i32> {
    let id = parse_function_ref(function).map_err(|err| anyhow!(err))?;
    let session = Session::open(root)?;
    match session.router.module_of(&id) {
        Ok(module) => {
            println!("{module}");
            Ok(exit_codes::OK)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(exit_codes::NOT_FOUND)
        }
    }
}

fn cmd_owner(root: &Path) -> Result<i32> {
    let session = Session::open(root)?;
    println!("{}", session.router.owner());
    Ok(exit_codes::OK)
}

fn cmd_selector(signature: &str) -> Result<i32> {
    if !is_canonical_signature(signature) {
        return Err(anyhow!(
            "'{signature}' is not a canonical signature like name(type,...)"
        ));
    }
    println!("{}", FunctionId::from_signature(signature));
    Ok(exit_codes::OK)
}

fn cmd_cut(root: &Path, caller: ModuleAddress, path: &Path) -> Result<i32> {
    let events = apply_cut_file(root, caller, path)?;
    print_events(&events)?;
    Ok(exit_codes::OK)
}

fn cmd_transfer_owner(root: &Path, caller: ModuleAddress, new_owner: ModuleAddress) -> Result<i32> {
    let mut session = Session::open(root)?;
    let events = session.transfer_ownership(caller, new_owner)?;
    print_events(&events)?;
    Ok(exit_codes::OK)
}

fn print_events(events: &[RouterEvent]) -> Result<()> {
    for event in events {
        println!(
            "{}",
            serde_json::to_string(event).context("serialize router event")?
        );
    }
    Ok(())
}
