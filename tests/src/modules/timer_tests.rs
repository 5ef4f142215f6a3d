use std::time::Duration;

use tokio::time::sleep;
use ultralive_shared::modules::timer::{Arming, RetriggerableTimer, TimerState};

fn recording_timer() -> RetriggerableTimer<Vec<Arming>> {
    RetriggerableTimer::new(vec![], |fired: &mut Vec<Arming>, arming| fired.push(arming))
}

#[tokio::test(start_paused = true)]
async fn should_fire_once_per_arming() {
    let timer = recording_timer();

    let arming = timer.lock().schedule(Duration::from_millis(100));

    sleep(Duration::from_millis(99)).await;
    assert!(timer.lock().is_empty());
    assert!(timer.lock().is_armed());

    sleep(Duration::from_millis(2)).await;
    assert_eq!(*timer.lock(), vec![arming]);
    assert_eq!(timer.lock().state(), TimerState::Idle);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(timer.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn should_restart_countdown_on_reschedule() {
    let timer = recording_timer();

    let first = timer.lock().schedule(Duration::from_millis(100));

    sleep(Duration::from_millis(60)).await;
    let second = timer.lock().reschedule(Duration::from_millis(100));
    assert_ne!(first, second);

    sleep(Duration::from_millis(99)).await;
    assert!(timer.lock().is_empty());

    sleep(Duration::from_millis(2)).await;
    assert_eq!(*timer.lock(), vec![second]);
}

#[tokio::test(start_paused = true)]
async fn should_not_fire_after_cancel() {
    let timer = recording_timer();

    timer.lock().schedule(Duration::from_millis(100));
    sleep(Duration::from_millis(50)).await;
    timer.lock().cancel();

    assert_eq!(timer.lock().state(), TimerState::Idle);

    sleep(Duration::from_secs(1)).await;
    assert!(timer.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn should_not_fire_when_cancelled_at_expiry_instant() {
    let timer = recording_timer();

    for _ in 0..50 {
        timer.lock().schedule(Duration::from_millis(10));
        sleep(Duration::from_millis(10)).await;

        let fired_before_cancel = {
            let mut fired = timer.lock();
            fired.cancel();
            fired.len()
        };

        sleep(Duration::from_millis(50)).await;

        assert_eq!(timer.lock().len(), fired_before_cancel);
        assert_eq!(timer.lock().state(), TimerState::Idle);
    }
}

#[tokio::test(start_paused = true)]
async fn should_not_fire_superseded_arming_at_expiry_instant() {
    let timer = recording_timer();

    let stale = timer.lock().schedule(Duration::from_millis(10));
    sleep(Duration::from_millis(10)).await;

    let current = timer.lock().reschedule(Duration::from_millis(10));
    let fired_before_reschedule = timer.lock().contains(&stale);

    sleep(Duration::from_millis(50)).await;

    let fired = timer.lock().to_vec();
    assert_eq!(fired.contains(&stale), fired_before_reschedule);
    assert_eq!(fired.iter().filter(|arming| **arming == current).count(), 1);
}

#[tokio::test(start_paused = true)]
async fn should_fire_again_when_scheduled_after_expiry() {
    let timer = recording_timer();

    let first = timer.lock().schedule(Duration::from_millis(10));
    sleep(Duration::from_millis(20)).await;

    let second = timer.lock().schedule(Duration::from_millis(10));
    sleep(Duration::from_millis(20)).await;

    assert_eq!(*timer.lock(), vec![first, second]);
}

#[tokio::test(start_paused = true)]
async fn should_expire_at_now_plus_duration() {
    let timer = recording_timer();

    let before = tokio::time::Instant::now();
    let arming = timer.lock().schedule(Duration::from_millis(250));

    assert_eq!(
        timer.lock().state(),
        TimerState::Armed {
            arming,
            expires_at: before + Duration::from_millis(250)
        }
    );
}

#[tokio::test(start_paused = true)]
async fn should_accept_unbounded_duration() {
    let timer = recording_timer();

    timer.lock().schedule(Duration::MAX);

    sleep(Duration::from_secs(3600)).await;

    assert!(timer.lock().is_armed());
    assert!(timer.lock().is_empty());

    timer.lock().cancel();
    assert_eq!(timer.lock().state(), TimerState::Idle);
}
