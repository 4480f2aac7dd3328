// SPDX-License-Identifier: MIT

//! Host-cwd → container-cwd mapping: a pure function over a container's
//! bind mounts, kept free of filesystem I/O so the decidability property
//! is directly testable.

use si_core::BindMount;

/// Whether `source` is a path-prefix of `cwd`: either equal, or followed
/// by a `/` separator. Plain string-prefix matching would wrongly treat
/// `/home/u/dev` as a prefix of `/home/u/dev2`.
fn is_prefix(source: &str, cwd: &str) -> bool {
    cwd == source || cwd.starts_with(&format!("{source}/"))
}

/// Rewrites `cwd` under `bind`: replaces the `source` prefix with
/// `destination`. Caller has already established `bind.source` is a
/// prefix of `cwd` via [`is_prefix`].
fn map_path(bind: &BindMount, cwd: &str) -> String {
    if cwd == bind.source {
        bind.destination.clone()
    } else {
        let suffix = &cwd[bind.source.len()..];
        format!("{}{}", bind.destination, suffix)
    }
}

/// Chooses the container-side path that best corresponds to `host_cwd`,
/// given the container's bind mounts:
///
/// 1. Only mounts whose source is a path-prefix of `host_cwd` match.
/// 2. Among matches, the longest source prefix wins.
/// 3. Tie-break: prefer the mount whose mapped path equals `host_cwd`
///    literally (the no-translation mirror mount).
/// 4. Further tie-break: prefer the mount whose destination isn't
///    `/workspace`.
/// 5. Remaining ties: destination order, for determinism.
///
/// Returns `None` if no bind mount's source is a prefix of `host_cwd`.
pub fn resolve_container_cwd(binds: &[BindMount], host_cwd: &str) -> Option<String> {
    let mut candidates: Vec<&BindMount> = binds.iter().filter(|b| is_prefix(&b.source, host_cwd)).collect();
    if candidates.is_empty() {
        return None;
    }

    let longest = candidates.iter().map(|b| b.source.len()).max().unwrap_or(0);
    candidates.retain(|b| b.source.len() == longest);

    if let Some(exact) = candidates.iter().find(|b| map_path(b, host_cwd) == host_cwd) {
        return Some(map_path(exact, host_cwd));
    }

    let non_workspace: Vec<&&BindMount> = candidates.iter().filter(|b| b.destination != "/workspace").collect();
    let chosen_pool: Vec<&BindMount> = if non_workspace.is_empty() {
        candidates.clone()
    } else {
        non_workspace.into_iter().copied().collect()
    };

    let mut sorted = chosen_pool;
    sorted.sort_by(|a, b| a.destination.cmp(&b.destination));
    sorted.first().map(|b| map_path(b, host_cwd))
}

#[cfg(test)]
#[path = "cwd_tests.rs"]
mod tests;
