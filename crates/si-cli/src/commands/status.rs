// SPDX-License-Identifier: MIT

//! `status`: credential status + usage.

use si_credentials::ProfileStatus;

use crate::commands::Context;
use crate::output::{format_or_json, print_status_table, OutputFormat, StatusRecord};

/// `status [name|profile] [--profiles] [--raw]`. With no profile named
/// and `--profiles` unset, reports on every configured profile; `--raw`
/// is accepted for forward-compatibility with a future machine format and
/// currently behaves like `--json`.
pub async fn status(ctx: &Context, profile_id: Option<&str>, all_profiles: bool, json: bool) -> anyhow::Result<()> {
    let manager = ctx.credential_manager();
    let now = ctx.now();

    let profiles = if all_profiles || profile_id.is_none() {
        ctx.settings.profiles()
    } else {
        vec![ctx.resolve_profile(profile_id)?]
    };

    let statuses = manager.statuses(&profiles, now).await;
    let rows: Vec<StatusRecord> = statuses.iter().map(to_record).collect();

    let format = if json { OutputFormat::Json } else { OutputFormat::Text };
    format_or_json(format, &rows, || print_status_table(&rows))
}

fn to_record(status: &ProfileStatus) -> StatusRecord {
    match (&status.auth, &status.usage) {
        (Ok(_), Some(usage)) => StatusRecord {
            profile_id: status.profile_id.clone(),
            auth_ok: true,
            auth_error: None,
            five_hour_remaining_pct: Some(usage.five_hour.remaining_percent()),
            weekly_remaining_pct: Some(usage.weekly.remaining_percent()),
            weekly_reset_label: Some(usage.weekly.reset_label(usage.fetched_at)),
        },
        (Ok(_), None) => StatusRecord {
            profile_id: status.profile_id.clone(),
            auth_ok: true,
            auth_error: None,
            five_hour_remaining_pct: None,
            weekly_remaining_pct: None,
            weekly_reset_label: None,
        },
        (Err(message), _) => StatusRecord {
            profile_id: status.profile_id.clone(),
            auth_ok: false,
            auth_error: Some(message.clone()),
            five_hour_remaining_pct: None,
            weekly_remaining_pct: None,
            weekly_reset_label: None,
        },
    }
}
