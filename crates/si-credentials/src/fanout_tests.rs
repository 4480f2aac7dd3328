use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use si_core::test_support;

#[test]
fn pool_width_is_clamped_between_two_and_six() {
    assert!(pool_width(100) >= 2);
    assert!(pool_width(100) <= 6);
    assert_eq!(pool_width(1), 1);
    assert_eq!(pool_width(0), 1);
}

#[tokio::test]
async fn fetches_status_for_every_profile() {
    let ids: Vec<String> = vec!["alice".into(), "bob".into(), "carol".into()];
    let results = fetch_statuses(&ids, Duration::from_secs(1), |profile_id| async move {
        let auth = test_support::auth_file(&format!("access-{profile_id}"), "refresh");
        Ok((auth, None))
    })
    .await;

    assert_eq!(results.len(), 3);
    let mut seen: Vec<&str> = results.iter().map(|r| r.profile_id.as_str()).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec!["alice", "bob", "carol"]);
    for r in &results {
        assert!(r.auth.is_ok());
    }
}

#[tokio::test]
async fn one_failing_profile_does_not_abort_the_others() {
    let ids: Vec<String> = vec!["alice".into(), "broken".into()];
    let results = fetch_statuses(&ids, Duration::from_secs(1), |profile_id| async move {
        if profile_id == "broken" {
            Err(Error::fatal("boom"))
        } else {
            Ok((test_support::auth_file("a", "r"), None))
        }
    })
    .await;

    let broken = results.iter().find(|r| r.profile_id == "broken").unwrap();
    assert!(broken.auth.is_err());
    let alice = results.iter().find(|r| r.profile_id == "alice").unwrap();
    assert!(alice.auth.is_ok());
}

#[tokio::test]
async fn a_hanging_task_times_out_without_blocking_the_fanout() {
    let ids: Vec<String> = vec!["slow".into(), "fast".into()];
    let results = fetch_statuses(&ids, Duration::from_millis(20), |profile_id| async move {
        if profile_id == "slow" {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok((test_support::auth_file("a", "r"), None))
        } else {
            Ok((test_support::auth_file("a", "r"), None))
        }
    })
    .await;

    let slow = results.iter().find(|r| r.profile_id == "slow").unwrap();
    assert!(slow.auth.is_err());
    let fast = results.iter().find(|r| r.profile_id == "fast").unwrap();
    assert!(fast.auth.is_ok());
}

#[tokio::test]
async fn concurrency_is_bounded_by_pool_width() {
    let ids: Vec<String> = (0..20).map(|i| format!("p{i}")).collect();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    let in_flight_c = in_flight.clone();
    let max_in_flight_c = max_in_flight.clone();
    let results = fetch_statuses(&ids, Duration::from_secs(5), move |_profile_id| {
        let in_flight = in_flight_c.clone();
        let max_in_flight = max_in_flight_c.clone();
        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok((test_support::auth_file("a", "r"), None))
        }
    })
    .await;

    assert_eq!(results.len(), 20);
    assert!(max_in_flight.load(Ordering::SeqCst) <= 6);
}
