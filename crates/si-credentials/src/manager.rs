// SPDX-License-Identifier: MIT

//! `CredentialManager`: the single façade `si-cli` and `si-warmup` talk
//! to — auth.json storage, status recovery, per-profile refresh, the
//! usage API, and the profile-status fanout, wired together behind one
//! `Settings`-driven type.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use si_core::{jwt, paths, AuthFile, Error, LogoutBlockList, Profile, Settings, UsageSnapshot};
use si_runtime::{ContainerRuntime, Deadline};

use crate::fanout::{fetch_statuses, ProfileStatus};
use crate::recovery::{recover_auth_file, RecoveryTracker, SecretStore};
use crate::refresh::{RefreshClient, TokenRefresher};
use crate::store::{read_auth_file, write_auth_file_atomic};
use crate::usage_client::{UsageApiClient, UsageFetchError};

pub struct CredentialManager<S: Settings, C: RefreshClient> {
    settings: Arc<S>,
    home: PathBuf,
    runtime: Arc<dyn ContainerRuntime>,
    refresher: TokenRefresher<C>,
    usage_client: UsageApiClient,
    secret_store: Option<Arc<dyn SecretStore>>,
    tracker: RecoveryTracker,
}

impl<S: Settings, C: RefreshClient> CredentialManager<S, C> {
    /// `home` is the si state root (normally `paths::si_home()` —
    /// injected rather than read internally so tests can root it at a
    /// temp directory without touching process-global environment).
    pub fn new(
        settings: Arc<S>,
        home: PathBuf,
        runtime: Arc<dyn ContainerRuntime>,
        refresh_client: C,
        secret_store: Option<Arc<dyn SecretStore>>,
    ) -> Self {
        let usage_client = UsageApiClient::new(settings.usage_api_url());
        Self {
            settings,
            home,
            runtime,
            refresher: TokenRefresher::new(refresh_client),
            usage_client,
            secret_store,
            tracker: RecoveryTracker::new(),
        }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    fn auth_path(&self, profile_id: &str) -> PathBuf {
        paths::auth_file_path(&self.home, profile_id)
    }

    fn block_list_path(&self) -> PathBuf {
        paths::logout_block_list_path(&self.home)
    }

    pub fn load_block_list(&self) -> Result<LogoutBlockList, Error> {
        let path = self.block_list_path();
        match std::fs::read_to_string(&path) {
            Ok(raw) => LogoutBlockList::from_json(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LogoutBlockList::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_block_list(&self, list: &LogoutBlockList) -> Result<(), Error> {
        let path = self.block_list_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = list.to_json_pretty()?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Explicit logout: block-lists the profile (so recovery never
    /// silently re-authenticates it) and deletes its cached `auth.json`.
    pub fn logout(&self, profile_id: &str) -> Result<(), Error> {
        let mut block_list = self.load_block_list()?;
        block_list.block(profile_id);
        self.save_block_list(&block_list)?;

        let path = self.auth_path(profile_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Explicit login clears any prior block for this one profile (scoped
    /// to the profile, not the whole block-list file) and persists the
    /// freshly obtained tokens.
    pub fn login(&self, profile_id: &str, auth: &AuthFile) -> Result<(), Error> {
        let mut block_list = self.load_block_list()?;
        block_list.unblock(profile_id);
        self.save_block_list(&block_list)?;
        write_auth_file_atomic(&self.auth_path(profile_id), auth)
    }

    /// Loads `auth.json`, recovering from the profile's container or a
    /// secret-store sidecar if the file is missing.
    pub async fn load_or_recover(&self, profile: &Profile, deadline: Deadline) -> Result<Option<AuthFile>, Error> {
        let path = self.auth_path(&profile.id);
        match read_auth_file(&path) {
            Ok(auth) => Ok(Some(auth)),
            Err(e) if e.kind() == si_core::ErrorKind::NotFound => {
                let block_list = self.load_block_list()?;
                let recovered = recover_auth_file(
                    &profile.id,
                    &profile.container_name(),
                    "/root/.si/auth.json",
                    self.runtime.as_ref(),
                    self.secret_store.as_deref(),
                    &block_list,
                    &self.tracker,
                    deadline,
                )
                .await?;
                if let Some(ref auth) = recovered {
                    write_auth_file_atomic(&path, auth)?;
                }
                Ok(recovered)
            }
            Err(e) => Err(e),
        }
    }

    /// Ensures the cached access token isn't expired, refreshing (at most
    /// one in-flight call per profile) when it is.
    pub async fn ensure_fresh(&self, profile: &Profile, now_epoch_secs: u64) -> Result<AuthFile, Error> {
        let path = self.auth_path(&profile.id);
        let current = read_auth_file(&path)?;
        if !current.is_valid(now_epoch_secs) {
            return Err(Error::auth_failure("auth.json failed validation; run `si login`"));
        }

        let access_expired = current.tokens.access_token.is_empty()
            || jwt::is_expired(&current.tokens.access_token, now_epoch_secs) == Some(true);
        if !access_expired {
            return Ok(current);
        }

        let outcome = self.refresher.refresh(&profile.id, &path, now_epoch_secs).await?;
        Ok(outcome.auth_file().clone())
    }

    /// Fetches usage, transparently refreshing once on `token_expired`.
    pub async fn usage(&self, profile: &Profile, now_epoch_secs: u64) -> Result<UsageSnapshot, Error> {
        let path = self.auth_path(&profile.id);
        let auth = read_auth_file(&path)?;

        match self.usage_client.fetch(&auth.tokens.access_token, now_epoch_secs).await {
            Ok(snapshot) => Ok(snapshot),
            Err(UsageFetchError::TokenExpired) => {
                let refreshed = self.refresher.refresh(&profile.id, &path, now_epoch_secs).await?;
                let access_token = refreshed.auth_file().tokens.access_token.clone();
                self.usage_client.fetch(&access_token, now_epoch_secs).await.map_err(Error::from)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The global profile-status fanout: auth plus usage for every
    /// profile, bounded concurrency, 25s per task.
    pub async fn statuses(&self, profiles: &[Profile], now_epoch_secs: u64) -> Vec<ProfileStatus> {
        let ids: Vec<String> = profiles.iter().map(|p| p.id.clone()).collect();
        let by_id: HashMap<String, Profile> = profiles.iter().map(|p| (p.id.clone(), p.clone())).collect();

        fetch_statuses(&ids, Duration::from_secs(25), |profile_id| {
            let profile = by_id.get(&profile_id).cloned();
            async move {
                let profile = profile.ok_or_else(|| Error::fatal("unknown profile in fanout"))?;
                let auth = self.ensure_fresh(&profile, now_epoch_secs).await?;
                let usage = self.usage(&profile, now_epoch_secs).await.ok();
                Ok((auth, usage))
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
