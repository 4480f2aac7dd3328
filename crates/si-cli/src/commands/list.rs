// SPDX-License-Identifier: MIT

//! `list`: label-filtered inspection; `--json` emits a stable record.

use si_identity::{LABEL_COMPONENT, LABEL_COMPONENT_VALUE, LABEL_PROFILE};
use si_runtime::{Deadline, LabelSelector};

use crate::commands::Context;
use crate::exit_error::from_core_error;
use crate::output::{handle_list, print_container_table, ContainerRecord, OutputFormat};

const LIST_DEADLINE_SECS: u64 = 20;

pub async fn list(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let selector = LabelSelector::new().with(LABEL_COMPONENT, LABEL_COMPONENT_VALUE);
    let containers = ctx.runtime.list(&selector, Deadline::from_secs(LIST_DEADLINE_SECS)).await.map_err(|e| from_core_error(&e))?;

    let mut rows: Vec<ContainerRecord> = containers
        .into_iter()
        .map(|c| ContainerRecord {
            profile_id: c.labels.get(LABEL_PROFILE).cloned().unwrap_or_default(),
            name: c.name,
            running: c.running,
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    let format = if json { OutputFormat::Json } else { OutputFormat::Text };
    handle_list(format, &rows, "No codex containers found", print_container_table)
}
