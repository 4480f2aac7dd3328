// SPDX-License-Identifier: MIT

//! `si`: the operator-facing CLI control plane for sandboxed codex agent
//! containers.

mod color;
mod commands;
mod exit_error;
mod output;
mod settings;

use clap::{Parser, Subcommand};

use commands::Context;
use exit_error::ExitError;
use settings::CliSettings;

#[derive(Parser)]
#[command(name = "si", version, about = "Operator control plane for sandboxed codex agent containers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind a profile to a running container, creating/repairing it as needed
    Spawn {
        profile: Option<String>,
    },
    /// Remove and recreate a profile's container
    Respawn {
        profile: Option<String>,
        /// Also drop the profile's named volumes
        #[arg(long)]
        volumes: bool,
    },
    /// List codex containers
    List {
        #[arg(long)]
        json: bool,
    },
    /// Attach to (or exec into) a profile's container
    Run {
        profile: Option<String>,
        #[arg(long, conflicts_with = "no_tmux")]
        tmux: bool,
        #[arg(long)]
        no_tmux: bool,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        no_mcp: bool,
        #[arg(long)]
        output_only: bool,
        #[arg(trailing_var_arg = true)]
        command: Vec<String>,
    },
    /// Show credential status and usage
    Status {
        profile: Option<String>,
        #[arg(long)]
        profiles: bool,
        #[arg(long)]
        raw: bool,
    },
    /// Log in a profile via an ephemeral container
    Login {
        profile: Option<String>,
    },
    /// Log out a profile
    Logout {
        profile: Option<String>,
    },
    /// Re-authenticate a profile whose cached credentials have gone stale
    Swap {
        profile: Option<String>,
    },
    /// Warmup control plane
    Warmup {
        #[command(subcommand)]
        command: WarmupCommands,
    },
}

#[derive(Subcommand)]
enum WarmupCommands {
    Enable {
        #[arg(long)]
        quiet: bool,
        #[arg(long)]
        no_reconcile: bool,
    },
    Disable,
    Reconcile {
        profile: Option<String>,
        #[arg(long)]
        quiet: bool,
        #[arg(long)]
        force: bool,
    },
    Status {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        let code = e.downcast_ref::<ExitError>().map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("{} {}", color::error("error:"), msg);
        }
        std::process::exit(code);
    }
}

/// Deduplicates an anyhow error's source chain, same convention as the
/// wrapped-exit-code propagation above.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for cause in err.chain().skip(1) {
        buf.push_str(&format!("\ncaused by: {cause}"));
    }
    buf
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let home = si_core::paths::si_home();
    std::fs::create_dir_all(&home)?;
    let settings = CliSettings::load(&home)?;
    let ctx = Context::new(settings, home);

    maybe_auto_repair(&ctx, &cli.command).await;

    match cli.command {
        Commands::Spawn { profile } => commands::spawn::spawn(&ctx, profile.as_deref()).await,
        Commands::Respawn { profile, volumes } => commands::spawn::respawn(&ctx, profile.as_deref(), volumes).await,
        Commands::List { json } => commands::list::list(&ctx, json).await,
        Commands::Run { profile, tmux, no_tmux, prompt, no_mcp, output_only, command } => {
            if let Some(text) = prompt {
                commands::run::run_prompt(&ctx, profile.as_deref(), &text, no_mcp, output_only).await
            } else {
                let use_tmux = tmux || !no_tmux;
                commands::run::run(&ctx, profile.as_deref(), use_tmux, command).await
            }
        }
        Commands::Status { profile, profiles, raw } => commands::status::status(&ctx, profile.as_deref(), profiles, raw).await,
        Commands::Login { profile } => commands::login::login(&ctx, profile.as_deref()).await,
        Commands::Logout { profile } => commands::login::logout(&ctx, profile.as_deref()).await,
        Commands::Swap { profile } => commands::login::swap(&ctx, profile.as_deref()).await,
        Commands::Warmup { command } => match command {
            WarmupCommands::Enable { quiet, no_reconcile } => commands::warmup::enable(&ctx, quiet, no_reconcile).await,
            WarmupCommands::Disable => commands::warmup::disable(&ctx).await,
            WarmupCommands::Reconcile { profile, quiet, force } => commands::warmup::reconcile(&ctx, profile.as_deref(), quiet, force).await,
            WarmupCommands::Status { json } => commands::warmup::status(&ctx, json).await,
        },
    }
}

/// Every command except `warmup`/`login` runs a cheap health check and,
/// if the sidecar should be running but isn't, fires off a detached
/// `warmup enable --quiet --no-reconcile`.
async fn maybe_auto_repair(ctx: &Context, command: &Commands) {
    if matches!(command, Commands::Warmup { .. } | Commands::Login { .. }) {
        return;
    }

    let markers = si_warmup::read_markers(&ctx.home, ctx.settings.as_ref());
    let legacy = si_warmup::is_legacy_installation(&ctx.home, markers);
    let deadline = si_runtime::Deadline::from_secs(5);
    let sidecar_running = ctx
        .runtime
        .inspect_by_name(si_warmup::SIDECAR_CONTAINER_NAME, deadline)
        .await
        .ok()
        .flatten()
        .map(|info| info.running)
        .unwrap_or(false);

    if si_warmup::needs_repair(markers, legacy, sidecar_running) {
        si_warmup::spawn_auto_repair();
    }
}
