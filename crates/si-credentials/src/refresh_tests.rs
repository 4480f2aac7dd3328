use super::*;
use base64::Engine;
use parking_lot::Mutex as PlMutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

fn fake_jwt(aud: &str) -> String {
    let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"{\"alg\":\"none\"}");
    let payload =
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(format!("{{\"aud\":\"{aud}\"}}"));
    format!("{header}.{payload}.sig")
}

fn seed(dir: &std::path::Path, access: &str, refresh: &str, aud: &str) -> std::path::PathBuf {
    let path = dir.join("auth.json");
    let auth = AuthFile {
        tokens: AuthTokens {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            id_token: fake_jwt(aud),
            account_id: "acct".to_string(),
            last_refresh_time: 0,
        },
    };
    write_auth_file_atomic(&path, &auth).unwrap();
    path
}

struct ScriptedClient {
    responses: PlMutex<Vec<Result<AuthTokens, RefreshClientError>>>,
}

#[async_trait::async_trait]
impl RefreshClient for ScriptedClient {
    async fn exchange(&self, _refresh_token: &str, client_id: &str) -> Result<AuthTokens, RefreshClientError> {
        assert_eq!(client_id, "client-123");
        self.responses.lock().remove(0)
    }
}

#[tokio::test]
async fn successful_refresh_writes_new_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let path = seed(dir.path(), "old-access", "old-refresh", "client-123");

    let client = ScriptedClient {
        responses: PlMutex::new(vec![Ok(AuthTokens {
            access_token: "new-access".to_string(),
            refresh_token: "new-refresh".to_string(),
            id_token: fake_jwt("client-123"),
            account_id: "acct".to_string(),
            last_refresh_time: 0,
        })]),
    };
    let refresher = TokenRefresher::new(client);

    let outcome = refresher.refresh("alice", &path, 1_700_000_500).await.unwrap();
    let auth = outcome.auth_file();
    assert_eq!(auth.tokens.access_token, "new-access");
    assert_eq!(auth.tokens.last_refresh_time, 1_700_000_500);

    let on_disk = read_auth_file(&path).unwrap();
    assert_eq!(on_disk.tokens.access_token, "new-access");
}

/// Simulates another process rotating tokens between this call reading
/// its refresh token and the upstream rejecting it as already-used. The
/// rewrite happens from inside the scripted `exchange()` call, standing
/// in for the other process's write.
struct ReusingClient {
    auth_path: std::path::PathBuf,
    rotated: AuthTokens,
}

#[async_trait::async_trait]
impl RefreshClient for ReusingClient {
    async fn exchange(&self, _refresh_token: &str, _client_id: &str) -> Result<AuthTokens, RefreshClientError> {
        write_auth_file_atomic(&self.auth_path, &AuthFile { tokens: self.rotated.clone() }).unwrap();
        Err(RefreshClientError::Reused)
    }
}

#[tokio::test]
async fn refresh_token_reused_recovers_rotated_tokens_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = seed(dir.path(), "old-access", "old-refresh", "client-123");

    let rotated = AuthTokens {
        access_token: "rotated-access".to_string(),
        refresh_token: "rotated-refresh".to_string(),
        id_token: fake_jwt("client-123"),
        account_id: "acct".to_string(),
        last_refresh_time: 500,
    };
    let client = ReusingClient { auth_path: path.clone(), rotated };
    let refresher = TokenRefresher::new(client);

    let outcome = refresher.refresh("alice", &path, 1_000).await.unwrap();
    match outcome {
        RefreshOutcome::ReusedRecovered(auth) => assert_eq!(auth.tokens.access_token, "rotated-access"),
        RefreshOutcome::Refreshed(_) => panic!("expected ReusedRecovered"),
    }
}

#[tokio::test]
async fn refresh_token_reused_with_no_rotation_is_auth_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = seed(dir.path(), "old-access", "old-refresh", "client-123");

    let client = ScriptedClient { responses: PlMutex::new(vec![Err(RefreshClientError::Reused)]) };
    let refresher = TokenRefresher::new(client);

    let err = refresher.refresh("alice", &path, 1_000).await.unwrap_err();
    assert_eq!(err.kind(), si_core::ErrorKind::AuthFailure);
}

struct CoordinatedClient {
    calls: Arc<AtomicUsize>,
    started: Arc<Notify>,
    proceed: Arc<Notify>,
    response: PlMutex<Option<AuthTokens>>,
}

#[async_trait::async_trait]
impl RefreshClient for CoordinatedClient {
    async fn exchange(&self, _refresh_token: &str, _client_id: &str) -> Result<AuthTokens, RefreshClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.proceed.notified().await;
        Ok(self.response.lock().take().expect("response consumed only once"))
    }
}

#[tokio::test]
async fn concurrent_refresh_calls_exchange_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = seed(dir.path(), "old-access", "old-refresh", "client-123");

    let calls = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(Notify::new());
    let proceed = Arc::new(Notify::new());
    let client = CoordinatedClient {
        calls: calls.clone(),
        started: started.clone(),
        proceed: proceed.clone(),
        response: PlMutex::new(Some(AuthTokens {
            access_token: "new-access".to_string(),
            refresh_token: "new-refresh".to_string(),
            id_token: fake_jwt("client-123"),
            account_id: "acct".to_string(),
            last_refresh_time: 0,
        })),
    };
    let refresher = Arc::new(TokenRefresher::new(client));

    let r1 = refresher.clone();
    let p1 = path.clone();
    let task_a = tokio::spawn(async move { r1.refresh("alice", &p1, 1).await });

    // Wait until A is inside exchange() (holding the per-profile lock)
    // before starting B, so B's pre-lock snapshot is still the old tokens.
    started.notified().await;

    let r2 = refresher.clone();
    let p2 = path.clone();
    let task_b = tokio::spawn(async move { r2.refresh("alice", &p2, 2).await });

    // Let B run up to its (blocked) lock acquisition before A proceeds.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    proceed.notify_one();

    let (res_a, res_b) = tokio::join!(task_a, task_b);
    let outcome_a = res_a.unwrap().unwrap();
    let outcome_b = res_b.unwrap().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    match outcome_a {
        RefreshOutcome::Refreshed(auth) => assert_eq!(auth.tokens.access_token, "new-access"),
        RefreshOutcome::ReusedRecovered(_) => panic!("expected A to perform the refresh"),
    }
    match outcome_b {
        RefreshOutcome::ReusedRecovered(auth) => assert_eq!(auth.tokens.access_token, "new-access"),
        RefreshOutcome::Refreshed(_) => panic!("expected B to observe A's already-written tokens"),
    }
}
