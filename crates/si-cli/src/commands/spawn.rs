// SPDX-License-Identifier: MIT

//! `spawn`/`respawn`: bind a profile to a container, or drop and rebind.

use si_identity::AttachContext;
use si_runtime::Deadline;

use crate::commands::Context;
use crate::exit_error::from_core_error;

const BIND_DEADLINE_SECS: u64 = 60;

pub async fn spawn(ctx: &Context, profile_id: Option<&str>) -> anyhow::Result<()> {
    let profile = ctx.resolve_profile(profile_id)?;
    let reconciler = ctx.identity_reconciler();

    let outcome = reconciler
        .bind(&profile, AttachContext::Background, Deadline::from_secs(BIND_DEADLINE_SECS))
        .await
        .map_err(|e| from_core_error(&e))?;

    println!(
        "{} {}",
        crate::color::success("bound"),
        crate::color::literal(&outcome.binding.container_name)
    );
    if let Some(hint) = outcome.remediation {
        println!("{}", crate::color::warn(&hint));
    }
    Ok(())
}

/// `respawn`: remove (optionally dropping the three named volumes) then
/// spawn fresh.
pub async fn respawn(ctx: &Context, profile_id: Option<&str>, drop_volumes: bool) -> anyhow::Result<()> {
    let profile = ctx.resolve_profile(profile_id)?;
    let reconciler = ctx.identity_reconciler();
    let required = reconciler.required_mounts(&profile);
    let container_name = profile.container_name();
    let deadline = Deadline::from_secs(BIND_DEADLINE_SECS);

    ctx.runtime.remove(&container_name, true, deadline).await.map_err(|e| from_core_error(&e))?;

    if drop_volumes {
        for volume in required.volumes() {
            // si-runtime's ContainerRuntime has no volume-removal
            // operation; this is a CLI-only convenience that shells
            // directly, the same way si-warmup's auto-repair
            // self-relaunch does.
            let _ = std::process::Command::new(docker_bin()).args(["volume", "rm", "-f", volume]).status();
        }
    }

    spawn(ctx, Some(&profile.id)).await
}

fn docker_bin() -> String {
    std::env::var("SI_DOCKER_BIN").unwrap_or_else(|_| "docker".to_string())
}
