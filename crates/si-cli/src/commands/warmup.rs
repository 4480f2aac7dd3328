// SPDX-License-Identifier: MIT

//! `warmup enable/disable/reconcile/status`: the warmup control plane.

use si_core::clock::SystemClock;
use si_runtime::Deadline;
use si_warmup::{
    acquire_lock, disable as sidecar_disable, enable as sidecar_enable, read_markers, read_state,
    read_transitions, reconcile_profile, write_state, ReconcileOptions, TokioSleeper,
    WarmupLaunchParams,
};

use crate::commands::Context;
use crate::exit_error::from_core_error;

const SIDECAR_DEADLINE_SECS: u64 = 30;
const SIDECAR_VOLUME_NAME: &str = "si-warmup-sidecar-config";

fn launch_params(ctx: &Context) -> WarmupLaunchParams {
    WarmupLaunchParams {
        agent_binary: "codex".to_string(),
        model: ctx.settings.model_name(),
        reasoning_effort: ctx.settings.reasoning_effort(),
    }
}

/// `warmup enable [--quiet] [--no-reconcile]`.
pub async fn enable(ctx: &Context, quiet: bool, no_reconcile: bool) -> anyhow::Result<()> {
    let deadline = Deadline::from_secs(SIDECAR_DEADLINE_SECS);
    let self_exe = std::env::current_exe().map_err(|e| anyhow::anyhow!("cannot resolve current executable: {e}"))?;
    let self_exe = self_exe.to_string_lossy().into_owned();

    sidecar_enable(&ctx.home, ctx.settings.as_ref(), ctx.runtime.as_ref(), &self_exe, SIDECAR_VOLUME_NAME, deadline)
        .await
        .map_err(|e| from_core_error(&e))?;

    if !quiet {
        println!("{}", crate::color::success("warmup sidecar enabled"));
    }

    if !no_reconcile {
        reconcile(ctx, None, quiet, false).await?;
    }
    Ok(())
}

/// `warmup disable`.
pub async fn disable(ctx: &Context) -> anyhow::Result<()> {
    let deadline = Deadline::from_secs(SIDECAR_DEADLINE_SECS);
    sidecar_disable(&ctx.home, ctx.settings.as_ref(), ctx.runtime.as_ref(), deadline).await.map_err(|e| from_core_error(&e))?;
    println!("{}", crate::color::success("warmup sidecar disabled"));
    Ok(())
}

/// `warmup reconcile [profile] [--quiet] [--force]`: runs one pass for
/// the named profile, or every configured profile when none is given
/// (the sidecar's own invocation path).
pub async fn reconcile(ctx: &Context, profile_id: Option<&str>, quiet: bool, force: bool) -> anyhow::Result<()> {
    let profiles = match profile_id {
        Some(id) => vec![ctx.resolve_profile(Some(id))?],
        None => ctx.settings.profiles(),
    };

    let lock = acquire_lock(&ctx.home).map_err(|e| from_core_error(&e))?;
    let mut doc = read_state(&ctx.home).map_err(|e| from_core_error(&e))?;
    doc.retain_profiles(&profiles.iter().map(|p| p.id.clone()).collect::<Vec<_>>());

    let manager = ctx.credential_manager();
    let clock = SystemClock;
    let sleeper = TokioSleeper;
    let launch = launch_params(ctx);
    let options = ReconcileOptions { force_bootstrap: force, explicitly_targeted: profile_id.is_some(), no_mcp: false };

    for profile in &profiles {
        let outcome = reconcile_profile(
            &manager,
            ctx.settings.as_ref(),
            ctx.runtime.as_ref(),
            &sleeper,
            &clock,
            &ctx.home,
            &mut doc,
            profile,
            &launch,
            options,
        )
        .await
        .map_err(|e| from_core_error(&e))?;

        if !quiet {
            let label = if outcome.skipped { "skipped" } else { "reconciled" };
            println!("{} {} ({:?})", crate::color::context(label), crate::color::literal(&outcome.profile_id), outcome.result);
        }
    }

    write_state(&ctx.home, &doc).map_err(|e| from_core_error(&e))?;
    drop(lock);
    Ok(())
}

/// `warmup status [--json]`: the persisted per-profile state plus marker
/// presence, with no network calls of its own.
pub async fn status(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let doc = read_state(&ctx.home).map_err(|e| from_core_error(&e))?;
    let markers = read_markers(&ctx.home, ctx.settings.as_ref());

    if json {
        let transitions = read_transitions(&ctx.home).unwrap_or_default();
        let payload = serde_json::json!({
            "profiles": doc.profiles,
            "autostart": markers.autostart_present,
            "disabled": markers.disabled_present,
            "recent_transitions": transitions,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "{} autostart={} disabled={}",
        crate::color::header("warmup sidecar"),
        markers.autostart_present,
        markers.disabled_present
    );
    for state in &doc.profiles {
        println!(
            "{:<16} result={:?} failures={} next_due={} paused={}",
            crate::color::literal(&state.profile_id),
            state.last_result,
            state.failure_count,
            state.next_due,
            state.paused
        );
    }
    Ok(())
}
