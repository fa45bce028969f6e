#![cfg(test)]

use crate::acquisition::SimulatedSettings;
use crate::event::AppEvent;
use crate::plugin_system::{EventDisposition, EventOutcome, LifecycleState, TransitionOutcome};
use crate::ui_bridge::{ViewSlot, WidgetContent};

use super::common::{streaming_app, wait_until};

#[test]
fn test_frames_reach_the_view() {
    let (_dir, mut app, _driver) = streaming_app(SimulatedSettings::default());
    app.start().unwrap();
    assert_eq!(app.manager_mut().select_module("stream"), TransitionOutcome::Activated("stream".into()));

    assert!(wait_until(|| app.manager().context().image().sequence() >= 2));
    let dispositions = app.process_pending();
    assert!(dispositions.contains(&EventDisposition::Routed(EventOutcome::ViewChanged)));

    let live = app.manager().window().view_slot(ViewSlot::TopLeft).unwrap();
    assert!(matches!(live.content, WidgetContent::Image { width: 64, height: 48, .. }));
}

#[test]
fn test_switching_away_stops_worker_before_close() {
    let (_dir, mut app, driver) = streaming_app(SimulatedSettings::default());
    app.start().unwrap();
    app.manager_mut().select_module("stream");
    assert!(wait_until(|| app.manager().context().image().sequence() >= 1));

    app.manager_mut().select_module("default");
    assert!(app.manager().context().camera().is_none());
    let log = driver.call_log().entries();
    assert_eq!(log, vec!["open", "start_grab", "stop_grab", "close"]);

    // everything the old worker queued now belongs to a dead generation
    let dispositions = app.process_pending();
    assert!(!dispositions.is_empty());
    assert!(dispositions.iter().all(|d| *d == EventDisposition::Dropped));
}

#[test]
fn test_worker_error_detaches_camera_with_warning() {
    let (_dir, mut app, driver) = streaming_app(SimulatedSettings {
        fail_grab_after: Some(3),
        ..SimulatedSettings::default()
    });
    app.start().unwrap();
    app.manager_mut().select_module("stream");

    let mut warned = false;
    assert!(wait_until(|| {
        warned |= app
            .process_pending()
            .iter()
            .any(|d| matches!(d, EventDisposition::Routed(EventOutcome::Warning(_))));
        warned
    }));

    assert!(app.manager().context().camera().is_none());
    assert_eq!(app.manager().state(), &LifecycleState::ModuleActive("stream".into()));
    assert_eq!(driver.call_log().entries().last().map(String::as_str), Some("close"));

    // deactivation after the error has nothing left to release
    app.manager_mut().select_module("default");
    assert_eq!(driver.call_log().entries().iter().filter(|e| *e == "close").count(), 1);
}

#[test]
fn test_shutdown_event_releases_camera() {
    let (_dir, mut app, driver) = streaming_app(SimulatedSettings::default());
    app.start().unwrap();
    app.events().send(AppEvent::MenuChanged("stream".into())).unwrap();
    app.process_pending();
    app.events().send(AppEvent::Shutdown).unwrap();
    app.process_pending();

    assert_eq!(app.manager().state(), &LifecycleState::ShutDown);
    assert_eq!(driver.call_log().entries().last().map(String::as_str), Some("close"));
}
