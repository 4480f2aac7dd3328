// SPDX-License-Identifier: MIT

//! Scheduler sidecar: an ofelia-style cron container running `warmup
//! reconcile --quiet` every five minutes, plus the autostart/disabled
//! marker files and the cross-cutting auto-repair hook every other
//! operator command runs.

use std::path::Path;

use si_core::{paths, Error, Settings, WarmupMarkers};
use si_identity::{LABEL_COMPONENT, LABEL_COMPONENT_VALUE};
use si_runtime::{ContainerRuntime, ContainerSpec, Deadline};

/// Fixed name of the sidecar container; there is exactly one per host.
pub const SIDECAR_CONTAINER_NAME: &str = "si-warmup-sidecar";

/// Every five minutes.
const CRON_SCHEDULE: &str = "@every 5m";

/// Renders the ofelia job config for the warmup-reconcile job. `self_exe`
/// is the path to the self-built `si` binary inside the sidecar's mounted
/// volume; `job_command` runs non-interactively and quietly.
pub fn render_ofelia_config(self_exe: &str) -> String {
    format!(
        "[job-exec \"warmup-reconcile\"]\nschedule = {CRON_SCHEDULE}\ncontainer = {SIDECAR_CONTAINER_NAME}\ncommand = {self_exe} warmup reconcile --quiet\n"
    )
}

/// Writes the rendered config to `~/.si/ofelia/warmup-reconcile.ini` via
/// temp + rename.
pub fn write_ofelia_config(home: &Path, self_exe: &str) -> Result<(), Error> {
    let path = paths::ofelia_config_path(home);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let rendered = render_ofelia_config(self_exe);
    let tmp = path.with_extension("ini.tmp");
    std::fs::write(&tmp, rendered)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

pub fn read_markers(home: &Path, settings: &impl Settings) -> WarmupMarkers {
    let autostart_path =
        settings.warmup_autostart_marker_override().unwrap_or_else(|| paths::warmup_autostart_marker(home));
    let disabled_path =
        settings.warmup_disabled_marker_override().unwrap_or_else(|| paths::warmup_disabled_marker(home));
    WarmupMarkers { autostart_present: autostart_path.exists(), disabled_present: disabled_path.exists() }
}

/// `enable`: writes the autostart marker, removes any disabled marker,
/// rewrites the sidecar config, and ensures the container.
pub async fn enable(
    home: &Path,
    settings: &impl Settings,
    runtime: &dyn ContainerRuntime,
    self_exe: &str,
    volume_name: &str,
    deadline: Deadline,
) -> Result<(), Error> {
    let autostart_path =
        settings.warmup_autostart_marker_override().unwrap_or_else(|| paths::warmup_autostart_marker(home));
    let disabled_path =
        settings.warmup_disabled_marker_override().unwrap_or_else(|| paths::warmup_disabled_marker(home));

    if let Some(parent) = autostart_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&autostart_path, b"")?;
    if disabled_path.exists() {
        std::fs::remove_file(&disabled_path)?;
    }

    write_ofelia_config(home, self_exe)?;
    ensure_sidecar(settings, runtime, volume_name, deadline).await
}

/// `disable`: writes the disabled marker and stops the sidecar, leaving
/// the autostart marker (if any) in place so re-`enable` remembers intent.
pub async fn disable(home: &Path, settings: &impl Settings, runtime: &dyn ContainerRuntime, deadline: Deadline) -> Result<(), Error> {
    let disabled_path =
        settings.warmup_disabled_marker_override().unwrap_or_else(|| paths::warmup_disabled_marker(home));
    if let Some(parent) = disabled_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&disabled_path, b"")?;

    match runtime.inspect_by_name(SIDECAR_CONTAINER_NAME, deadline).await? {
        Some(_) => runtime.remove(SIDECAR_CONTAINER_NAME, true, deadline).await,
        None => Ok(()),
    }
}

/// Creates and starts the sidecar container if it isn't already running,
/// mounting the named volume that holds the self-built binary and the
/// ofelia config directory.
pub async fn ensure_sidecar(
    settings: &impl Settings,
    runtime: &dyn ContainerRuntime,
    volume_name: &str,
    deadline: Deadline,
) -> Result<(), Error> {
    if let Some(info) = runtime.inspect_by_name(SIDECAR_CONTAINER_NAME, deadline).await? {
        if info.running {
            return Ok(());
        }
        runtime.start(SIDECAR_CONTAINER_NAME, deadline).await?;
        return Ok(());
    }

    runtime.ensure_volume(volume_name, deadline).await?;

    let mut spec = ContainerSpec::new(SIDECAR_CONTAINER_NAME, "mcuadros/ofelia:latest");
    spec.labels.insert(LABEL_COMPONENT.to_string(), LABEL_COMPONENT_VALUE.to_string());
    spec.labels.insert("si.mode".to_string(), "sidecar".to_string());
    spec.volumes.push((volume_name.to_string(), "/etc/ofelia".to_string()));
    spec.network = Some(settings.network_name());
    spec.restart_policy = Some("unless-stopped".to_string());

    runtime.create_container(&spec, deadline).await?;
    runtime.start(SIDECAR_CONTAINER_NAME, deadline).await
}

/// The cheap health check every operator command (except
/// `warmup`/`login`) runs. Returns whether a repair is needed; the
/// caller is responsible for the actual async self-relaunch so this
/// stays synchronous and side-effect-free for easy testing.
pub fn needs_repair(
    markers: WarmupMarkers,
    legacy_state_without_marker: bool,
    sidecar_running: bool,
) -> bool {
    markers.wants_sidecar(legacy_state_without_marker) && !sidecar_running
}

/// Spawns `<current_exe> warmup enable --quiet --no-reconcile` detached,
/// so the calling command's own output is unaffected. Errors are
/// swallowed into a `tracing::warn!` — auto-repair is best-effort and
/// must never fail the command that triggered it.
pub fn spawn_auto_repair() {
    let exe = match std::env::current_exe() {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(error = %e, "auto-repair: could not resolve current executable");
            return;
        }
    };

    match std::process::Command::new(exe).args(["warmup", "enable", "--quiet", "--no-reconcile"]).spawn() {
        Ok(_) => tracing::info!("auto-repair: launched warmup enable in the background"),
        Err(e) => tracing::warn!(error = %e, "auto-repair: failed to launch warmup enable"),
    }
}

/// Whether this looks like a legacy installation: warmup state already
/// exists on disk but neither marker has ever been written. Treated as
/// if autostart were requested.
pub fn is_legacy_installation(home: &Path, markers: WarmupMarkers) -> bool {
    !markers.autostart_present && !markers.disabled_present && paths::warmup_state_path(home).exists()
}

#[cfg(test)]
#[path = "sidecar_tests.rs"]
mod tests;
