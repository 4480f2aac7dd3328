// SPDX-License-Identifier: MIT

//! `login`/`logout`/`swap`: the credential lifecycle commands.

use si_core::AuthFile;
use si_identity::{LABEL_COMPONENT, LABEL_COMPONENT_VALUE, LABEL_PROFILE};
use si_runtime::{ContainerSpec, Deadline, ExecRequest};

use crate::commands::Context;
use crate::exit_error::from_core_error;

const LOGIN_DEADLINE_SECS: u64 = 300;
const CONTAINER_AUTH_PATH: &str = "/root/.si/auth.json";

fn login_container_name(profile_id: &str) -> String {
    format!("si-login-{profile_id}")
}

/// Runs `codex login` interactively inside a throwaway container, then
/// copies the resulting `auth.json` out and persists it via the
/// credential manager. Containers never write back to host-owned files
/// except through this explicit copy-out step.
pub async fn login(ctx: &Context, profile_id: Option<&str>) -> anyhow::Result<()> {
    let profile = ctx.resolve_profile(profile_id)?;
    let deadline = Deadline::from_secs(LOGIN_DEADLINE_SECS);
    let name = login_container_name(&profile.id);

    let mut spec = ContainerSpec::new(&name, ctx.settings.image_name());
    spec.labels.insert(LABEL_COMPONENT.to_string(), LABEL_COMPONENT_VALUE.to_string());
    spec.labels.insert(LABEL_PROFILE.to_string(), profile.id.clone());
    spec.labels.insert("si.mode".to_string(), "login".to_string());
    spec.labels.insert("si.exec".to_string(), "ephemeral".to_string());
    spec.network = Some(ctx.settings.network_name());

    ctx.runtime.create_container(&spec, deadline).await.map_err(|e| from_core_error(&e))?;
    ctx.runtime.start(&name, deadline).await.map_err(|e| from_core_error(&e))?;

    let login_result = run_login_exec(ctx, &name, deadline).await;
    let auth_bytes = match login_result {
        Ok(_) => ctx.runtime.read_file_out(&name, CONTAINER_AUTH_PATH, deadline).await,
        Err(e) => {
            let _ = ctx.runtime.remove(&name, true, deadline).await;
            return Err(e);
        }
    };
    let _ = ctx.runtime.remove(&name, true, deadline).await;

    let auth_bytes = auth_bytes.map_err(|e| from_core_error(&e))?;
    let auth_json = String::from_utf8(auth_bytes).map_err(|_| anyhow::anyhow!("login produced non-UTF-8 auth.json"))?;
    let auth = AuthFile::from_json(&auth_json).map_err(|e| from_core_error(&e))?;

    ctx.credential_manager().login(&profile.id, &auth).map_err(|e| from_core_error(&e))?;
    println!("{} {}", crate::color::success("logged in"), crate::color::literal(&profile.id));
    Ok(())
}

async fn run_login_exec(ctx: &Context, container: &str, deadline: Deadline) -> anyhow::Result<()> {
    let mut request = ExecRequest::new(container, vec!["codex".to_string(), "login".to_string()]);
    request.tty = true;
    let output = ctx.runtime.exec(request, deadline).await.map_err(|e| from_core_error(&e))?;
    if !output.success() {
        anyhow::bail!("codex login exited with status {}", output.exit_code);
    }
    Ok(())
}

/// `logout [profile]`: block-lists the profile and deletes its cached
/// `auth.json`. Destroyed only by this explicit logout.
pub async fn logout(ctx: &Context, profile_id: Option<&str>) -> anyhow::Result<()> {
    let profile = ctx.resolve_profile(profile_id)?;
    ctx.credential_manager().logout(&profile.id).map_err(|e| from_core_error(&e))?;
    println!("{} {}", crate::color::success("logged out"), crate::color::literal(&profile.id));
    Ok(())
}

/// `swap [profile]`: re-runs login for a profile whose cached credentials
/// have gone stale, without first requiring an explicit logout.
pub async fn swap(ctx: &Context, profile_id: Option<&str>) -> anyhow::Result<()> {
    login(ctx, profile_id).await
}
