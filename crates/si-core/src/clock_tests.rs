use super::*;

#[test]
fn fake_clock_advances_monotonically() {
    let clock = FakeClock::new(100);
    assert_eq!(clock.now_epoch_secs(), 100);
    clock.advance(Duration::from_secs(50));
    assert_eq!(clock.now_epoch_secs(), 150);
}

#[test]
fn fake_clock_can_be_set_directly() {
    let clock = FakeClock::new(0);
    clock.set(9_999);
    assert_eq!(clock.now_epoch_secs(), 9_999);
}

#[test]
fn system_clock_returns_plausible_epoch() {
    let clock = SystemClock;
    assert!(clock.now_epoch_secs() > 1_700_000_000);
}
