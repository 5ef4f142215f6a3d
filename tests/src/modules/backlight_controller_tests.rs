use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use ultralive_peripherals::gpio_sim::SimulatedGpio;
use ultralive_shared::{
    domain::{Level, PinId},
    error::Error,
    modules::{backlight::BacklightController, timer::TimerState},
};

const PIN: PinId = PinId(38);
const HOLD: Duration = Duration::from_millis(100);

fn controller() -> (Arc<SimulatedGpio>, BacklightController<SimulatedGpio>) {
    let gpio = Arc::new(SimulatedGpio::new());
    let controller = BacklightController::initialize(gpio.clone(), PIN, HOLD).unwrap();

    (gpio, controller)
}

#[tokio::test(start_paused = true)]
async fn should_light_at_startup_for_one_hold_window() {
    let (gpio, controller) = controller();

    assert_eq!(gpio.history(PIN), vec![Level::Low, Level::High]);
    assert!(controller.is_lit());
    assert!(gpio.is_output(PIN));
    assert_eq!(gpio.owner(PIN).as_deref(), Some("output_gpio"));

    sleep(HOLD - Duration::from_millis(1)).await;
    assert!(controller.is_lit());

    sleep(Duration::from_millis(2)).await;
    assert!(!controller.is_lit());
    assert_eq!(gpio.history(PIN), vec![Level::Low, Level::High, Level::Low]);
    assert_eq!(controller.timeouts(), 1);
    assert_eq!(controller.timer_state(), TimerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn should_stay_lit_while_activity_arrives_within_hold() {
    let (gpio, controller) = controller();

    let mut last_activity = Instant::now();

    for _ in 0..10 {
        sleep(Duration::from_millis(60)).await;

        controller.notify_activity();
        last_activity = Instant::now();

        assert!(controller.is_lit());
    }

    assert_eq!(gpio.transitions(PIN), vec![Level::Low, Level::High]);
    assert_eq!(controller.timeouts(), 0);

    sleep(HOLD - Duration::from_millis(1)).await;
    assert!(controller.is_lit());

    sleep(Duration::from_millis(2)).await;
    assert!(!controller.is_lit());
    assert_eq!(controller.timeouts(), 1);

    let (switched_off_at, level) = *gpio.timed_history(PIN).last().unwrap();
    assert_eq!(level, Level::Low);
    let held_for = switched_off_at - last_activity;
    assert!(held_for >= HOLD && held_for < HOLD + Duration::from_millis(2));
}

#[tokio::test(start_paused = true)]
async fn should_light_again_on_activity_after_timeout() {
    let (gpio, controller) = controller();

    sleep(HOLD * 2).await;
    assert!(!controller.is_lit());

    controller.notify_activity();
    assert!(controller.is_lit());
    assert!(matches!(controller.timer_state(), TimerState::Armed { .. }));

    sleep(HOLD * 2).await;

    assert_eq!(
        gpio.transitions(PIN),
        vec![Level::Low, Level::High, Level::Low, Level::High, Level::Low]
    );
    assert_eq!(controller.timeouts(), 2);
}

#[tokio::test(start_paused = true)]
async fn should_leave_line_low_and_released_after_shutdown() {
    let (gpio, controller) = controller();

    controller.notify_activity();
    controller.shutdown();

    assert_eq!(gpio.level(PIN), Some(Level::Low));
    assert!(!gpio.is_reserved(PIN));
    assert!(controller.is_released());
    assert_eq!(controller.timer_state(), TimerState::Idle);

    let history = gpio.history(PIN);

    sleep(HOLD * 3).await;
    controller.notify_activity();
    controller.shutdown();

    assert_eq!(controller.timeouts(), 0);
    assert_eq!(gpio.history(PIN), history);
}

#[tokio::test(start_paused = true)]
async fn should_release_line_when_dropped() {
    let (gpio, controller) = controller();

    drop(controller);

    assert!(!gpio.is_reserved(PIN));
    assert_eq!(gpio.level(PIN), Some(Level::Low));
}

#[tokio::test]
async fn should_fail_when_pin_is_reserved() {
    let gpio = Arc::new(SimulatedGpio::new());
    gpio.reserve(PIN, "other");

    let result = BacklightController::initialize(gpio.clone(), PIN, HOLD);

    assert_eq!(result.err(), Some(Error::PinUnavailable(PIN)));
    assert_eq!(gpio.owner(PIN).as_deref(), Some("other"));
    assert!(gpio.history(PIN).is_empty());
}

#[tokio::test]
async fn should_fail_when_platform_rejects_pin() {
    let gpio = Arc::new(SimulatedGpio::new());
    gpio.reject(PIN);

    let result = BacklightController::initialize(gpio.clone(), PIN, HOLD);

    assert_eq!(result.err(), Some(Error::PinUnavailable(PIN)));
    assert!(!gpio.is_reserved(PIN));
}

#[tokio::test]
async fn should_release_line_when_output_configuration_fails() {
    let gpio = Arc::new(SimulatedGpio::new());
    gpio.reject_output(PIN);

    let result = BacklightController::initialize(gpio.clone(), PIN, HOLD);

    assert_eq!(result.err(), Some(Error::ConfigurationError(PIN)));
    assert!(!gpio.is_reserved(PIN));
    assert!(gpio.history(PIN).is_empty());
}

#[tokio::test(start_paused = true)]
async fn should_keep_activity_that_races_expiry() {
    let (gpio, controller) = controller();

    // wakes at the very instant the hold window runs out
    sleep(HOLD).await;
    controller.notify_activity();

    assert!(controller.is_lit());
    assert!(matches!(controller.timer_state(), TimerState::Armed { .. }));

    tokio::task::yield_now().await;
    assert!(controller.is_lit());
    assert_eq!(gpio.level(PIN), Some(Level::High));

    sleep(HOLD + Duration::from_millis(1)).await;
    assert!(!controller.is_lit());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_end_lit_when_activity_is_last_under_contention() {
    let gpio = Arc::new(SimulatedGpio::new());
    let hold = Duration::from_millis(20);
    let controller = Arc::new(BacklightController::initialize(gpio.clone(), PIN, hold).unwrap());

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let controller = controller.clone();
            tokio::spawn(async move {
                for i in 0..60u64 {
                    controller.notify_activity();
                    if i % 3 == 0 {
                        sleep(Duration::from_micros(19_000 + (i % 5) * 500)).await;
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.await.unwrap();
    }

    controller.notify_activity();

    assert!(controller.is_lit());
    assert!(matches!(controller.timer_state(), TimerState::Armed { .. }));
    assert_eq!(gpio.level(PIN), Some(Level::High));

    sleep(Duration::from_millis(100)).await;

    assert!(!controller.is_lit());
    assert_eq!(gpio.level(PIN), Some(Level::Low));

    controller.shutdown();
    assert!(!gpio.is_reserved(PIN));
}
