//! autogit: stage, commit, push and pull every repository you own
//!
//! Scans the configured roots for git repositories, checks them all
//! concurrently and walks the operator through the ones needing attention.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use autogit::commands::{
    handle_clone_command, handle_hooks_command, handle_hooks_install, handle_install_command,
    handle_pull_command, handle_refresh_command, handle_vpn_command, VpnAction,
};
use autogit::core::config::{CONFIG_ENV, LOG_ENV};
use autogit::core::{resolve_jobs, set_terminal_title, set_terminal_title_and_flush, Settings};
use autogit::git::{CommandRunner, CredentialInjector, SystemRunner};
use autogit::prompt::{Prompt, TerminalPrompt};
use autogit::RepoContext;

fn roots_arg() -> Arg {
    Arg::new("roots")
        .value_name("ROOT")
        .num_args(0..)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Directories to scan instead of the configured roots")
}

fn names_arg() -> Arg {
    Arg::new("names")
        .value_name("NAME")
        .num_args(0..)
        .help("Repository names")
}

fn build_cli() -> ClapCommand {
    ClapCommand::new("autogit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Automate common git workflows across all your repositories")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .env(CONFIG_ENV)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Read settings from FILE"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug diagnostics to stderr"),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_name("N")
                .global(true)
                .value_parser(clap::value_parser!(usize))
                .help("Maximum repositories checked or pulled at once"),
        )
        .subcommand(
            ClapCommand::new("refresh")
                .about("Stage, review, commit and push every repository with changes (default)")
                .arg(roots_arg()),
        )
        .subcommand(
            ClapCommand::new("pull")
                .about("Pull every repository and show what came in")
                .arg(roots_arg()),
        )
        .subcommand(
            ClapCommand::new("hooks")
                .about("Stage changes and run pre-commit hooks without committing")
                .arg(roots_arg())
                .arg(
                    Arg::new("install")
                        .long("install")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("roots")
                        .help("Install the pre-commit hook into the current repository"),
                ),
        )
        .subcommand(
            ClapCommand::new("clone")
                .about("Clone your GitHub repositories into the first root")
                .arg(names_arg()),
        )
        .subcommand(
            ClapCommand::new("install")
                .about("pip install your repositories straight from GitHub")
                .arg(names_arg()),
        )
        .subcommand(
            ClapCommand::new("vpn")
                .about("Connect, disconnect or toggle the VPN")
                .arg(
                    Arg::new("action")
                        .value_parser(["connect", "disconnect"])
                        .help("Leave out to toggle"),
                ),
        )
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn roots(matches: &ArgMatches) -> Vec<PathBuf> {
    matches
        .get_many::<PathBuf>("roots")
        .map(|roots| roots.cloned().collect())
        .unwrap_or_default()
}

fn names(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("names")
        .map(|names| names.cloned().collect())
        .unwrap_or_default()
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let jobs = resolve_jobs(matches.get_one::<usize>("jobs").copied(), &settings);

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let credentials = CredentialInjector::new(Arc::clone(&runner), &settings);
    let prompt: Arc<dyn Prompt> = Arc::new(TerminalPrompt);
    let ctx = Arc::new(RepoContext::new(runner, credentials, prompt, settings));

    match matches.subcommand() {
        Some(("pull", sub)) => handle_pull_command(ctx, &roots(sub), jobs).await,
        Some(("hooks", sub)) if sub.get_flag("install") => {
            let dir = std::env::current_dir().context("cannot read the current directory")?;
            handle_hooks_install(&ctx, &dir).await
        }
        Some(("hooks", sub)) => handle_hooks_command(ctx, &roots(sub), jobs).await,
        Some(("clone", sub)) => handle_clone_command(&ctx, names(sub)).await,
        Some(("install", sub)) => handle_install_command(&ctx, names(sub)).await,
        Some(("vpn", sub)) => {
            let action = VpnAction::parse(sub.get_one::<String>("action").map(String::as_str));
            handle_vpn_command(&ctx, action).await
        }
        Some(("refresh", sub)) => handle_refresh_command(ctx, &roots(sub), jobs).await,
        _ => handle_refresh_command(ctx, &[], jobs).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    // Set terminal title to indicate autogit is running
    set_terminal_title("🚀 autogit");
    let result = run(&matches).await;
    // Set terminal title to green checkbox to indicate completion
    set_terminal_title_and_flush("✅ autogit");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}
