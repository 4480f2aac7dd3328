use super::*;
use base64::Engine;
use si_core::test_support::{self, FakeSettings};
use si_core::AuthTokens;
use si_runtime::fake::FakeRuntime;

fn fake_jwt(aud: &str, exp: Option<u64>) -> String {
    let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"{\"alg\":\"none\"}");
    let claims = match exp {
        Some(exp) => format!("{{\"aud\":\"{aud}\",\"exp\":{exp}}}"),
        None => format!("{{\"aud\":\"{aud}\"}}"),
    };
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(claims);
    format!("{header}.{payload}.sig")
}

struct NeverCalledClient;

#[async_trait::async_trait]
impl RefreshClient for NeverCalledClient {
    async fn exchange(&self, _refresh_token: &str, _client_id: &str) -> Result<AuthTokens, crate::refresh::RefreshClientError> {
        panic!("token endpoint should not have been called");
    }
}

struct AlwaysRefreshesClient;

#[async_trait::async_trait]
impl RefreshClient for AlwaysRefreshesClient {
    async fn exchange(&self, _refresh_token: &str, client_id: &str) -> Result<AuthTokens, crate::refresh::RefreshClientError> {
        Ok(AuthTokens {
            access_token: "fresh-access".to_string(),
            refresh_token: "fresh-refresh".to_string(),
            id_token: fake_jwt(client_id, None),
            account_id: "acct".to_string(),
            last_refresh_time: 0,
        })
    }
}

fn manager_with(
    dir: &std::path::Path,
    runtime: Arc<dyn ContainerRuntime>,
) -> CredentialManager<FakeSettings, NeverCalledClient> {
    let settings = Arc::new(FakeSettings::new(dir));
    CredentialManager::new(settings, dir.to_path_buf(), runtime, NeverCalledClient, None)
}

#[tokio::test]
async fn ensure_fresh_returns_cached_tokens_when_access_token_is_unexpired() {
    let dir = tempfile::tempdir().unwrap();
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(FakeRuntime::new());
    let manager = manager_with(dir.path(), runtime);

    let profile = test_support::profile("alice");
    let auth = AuthFile {
        tokens: AuthTokens {
            access_token: fake_jwt("client-123", Some(2_000_000_000)),
            refresh_token: "r".to_string(),
            id_token: fake_jwt("client-123", None),
            account_id: "acct".to_string(),
            last_refresh_time: 0,
        },
    };
    write_auth_file_atomic(&paths::auth_file_path(dir.path(), &profile.id), &auth).unwrap();

    let result = manager.ensure_fresh(&profile, 1_000).await.unwrap();
    assert_eq!(result.tokens.access_token, auth.tokens.access_token);
}

#[tokio::test]
async fn ensure_fresh_refreshes_when_access_token_expired() {
    let dir = tempfile::tempdir().unwrap();
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(FakeRuntime::new());
    let settings = Arc::new(FakeSettings::new(dir.path()));
    let manager = CredentialManager::new(settings, dir.path().to_path_buf(), runtime, AlwaysRefreshesClient, None);

    let profile = test_support::profile("alice");
    let auth = AuthFile {
        tokens: AuthTokens {
            access_token: fake_jwt("client-123", Some(1)),
            refresh_token: "old-refresh".to_string(),
            id_token: fake_jwt("client-123", None),
            account_id: "acct".to_string(),
            last_refresh_time: 0,
        },
    };
    write_auth_file_atomic(&paths::auth_file_path(dir.path(), &profile.id), &auth).unwrap();

    let result = manager.ensure_fresh(&profile, 1_000).await.unwrap();
    assert_eq!(result.tokens.access_token, "fresh-access");
}

#[tokio::test]
async fn logout_block_lists_and_deletes_cached_auth() {
    let dir = tempfile::tempdir().unwrap();
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(FakeRuntime::new());
    let manager = manager_with(dir.path(), runtime);

    let profile = test_support::profile("alice");
    let auth_path = paths::auth_file_path(dir.path(), &profile.id);
    write_auth_file_atomic(&auth_path, &test_support::auth_file("a", "r")).unwrap();

    manager.logout(&profile.id).unwrap();
    assert!(!auth_path.exists());

    let block_list = manager.load_block_list().unwrap();
    assert!(block_list.contains(&profile.id));
}

#[tokio::test]
async fn login_clears_block_for_that_profile_only() {
    let dir = tempfile::tempdir().unwrap();
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(FakeRuntime::new());
    let manager = manager_with(dir.path(), runtime);

    let mut block_list = LogoutBlockList::default();
    block_list.block("alice");
    block_list.block("bob");
    manager.save_block_list(&block_list).unwrap();

    manager.login("alice", &test_support::auth_file("a", "r")).unwrap();

    let reloaded = manager.load_block_list().unwrap();
    assert!(!reloaded.contains("alice"));
    assert!(reloaded.contains("bob"));
}

#[tokio::test]
async fn block_listed_profile_is_never_recovered() {
    let dir = tempfile::tempdir().unwrap();
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(FakeRuntime::new());
    let manager = manager_with(dir.path(), runtime);

    let mut block_list = LogoutBlockList::default();
    block_list.block("alice");
    manager.save_block_list(&block_list).unwrap();

    let profile = test_support::profile("alice");
    let recovered = manager
        .load_or_recover(&profile, si_runtime::Deadline::new(std::time::Duration::from_secs(1)))
        .await
        .unwrap();
    assert!(recovered.is_none());
}
