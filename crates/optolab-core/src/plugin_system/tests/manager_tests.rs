use crate::event::{AcquisitionEvent, AppEvent, EventBus, UserInput};
use crate::plugin_system::tests::support::Fixture;
use crate::plugin_system::{
    EventDisposition, EventOutcome, LifecycleState, LoadPolicy, TransitionOutcome,
};
use crate::ui_bridge::{MessageSeverity, ViewSlot};

fn drain_clicks(manager: &mut crate::plugin_system::ModuleManager, bus: &mut EventBus) {
    for event in bus.drain() {
        manager.handle_event(event);
    }
}

#[test]
fn test_start_builds_menu_and_activates_default() {
    let fixture = Fixture::new();
    let bus = EventBus::new();
    let (mut manager, memory) = fixture.manager(&bus, LoadPolicy::Lazy);
    assert_eq!(manager.state(), &LifecycleState::NoModuleActive);

    assert_eq!(manager.start(), TransitionOutcome::Activated("default".into()));
    assert_eq!(manager.state(), &LifecycleState::DefaultActive);
    assert_eq!(manager.window().title(), "Machine Vision / LEnsE - 2025");

    let buttons = manager.window().menu_buttons();
    let names: Vec<&str> = buttons.iter().map(|b| b.name()).collect();
    assert_eq!(names, vec!["default", "camera_demo", "images_demo", "broken_demo"]);
    assert!(manager.window().button("default").unwrap().is_active());
    assert!(!manager.window().button("broken_demo").unwrap().is_enabled());
    assert!(manager.unavailable().contains_key("broken_demo"));
    assert_eq!(manager.view_slot_title(ViewSlot::TopLeft), Some("Welcome"));

    // lazy: nothing loaded yet
    assert_eq!(fixture.camera_counters.loads(), 0);
    assert!(!memory.messages().is_empty());

    assert_eq!(manager.start(), TransitionOutcome::Unchanged);
}

#[test]
fn test_eager_policy_loads_at_start() {
    let fixture = Fixture::new();
    let bus = EventBus::new();
    let (mut manager, _memory) = fixture.manager(&bus, LoadPolicy::Eager);

    manager.start();
    assert_eq!(fixture.camera_counters.loads(), 1);
    assert_eq!(fixture.images_counters.loads(), 1);
    assert_eq!(fixture.camera_counters.constructions(), 0);
    assert!(manager.loader().is_loaded("camera_demo"));
}

#[test]
fn test_menu_scenario_counts_constructions() {
    let fixture = Fixture::new();
    let mut bus = EventBus::new();
    let (mut manager, _memory) = fixture.manager(&bus, LoadPolicy::Lazy);
    manager.start();

    manager.window().click("camera_demo").unwrap();
    manager.window().click("default").unwrap();
    manager.window().click("camera_demo").unwrap();
    assert!(manager.window().click("broken_demo").is_err());
    drain_clicks(&mut manager, &mut bus);

    assert_eq!(fixture.camera_counters.constructions(), 2);
    assert_eq!(fixture.camera_counters.deactivations(), 1);
    assert_eq!(manager.state(), &LifecycleState::ModuleActive("camera_demo".into()));
    assert!(manager.window().button("camera_demo").unwrap().is_active());
    assert!(!manager.window().button("default").unwrap().is_active());
}

#[test]
fn test_reselect_is_noop() {
    let fixture = Fixture::new();
    let bus = EventBus::new();
    let (mut manager, _memory) = fixture.manager(&bus, LoadPolicy::Lazy);
    manager.start();

    assert_eq!(manager.select_module("images_demo"), TransitionOutcome::Activated("images_demo".into()));
    let generation = manager.generation();
    assert_eq!(manager.select_module("images_demo"), TransitionOutcome::Unchanged);
    assert_eq!(manager.select_module("images_demo"), TransitionOutcome::Unchanged);

    assert_eq!(fixture.images_counters.constructions(), 1);
    assert_eq!(fixture.images_counters.deactivations(), 0);
    assert_eq!(manager.generation(), generation);
    assert_eq!(manager.select_module("default"), TransitionOutcome::Activated("default".into()));
    assert_eq!(manager.select_module("default"), TransitionOutcome::Unchanged);
}

#[test]
fn test_camera_closed_before_next_controller_constructed() {
    let fixture = Fixture::new();
    let bus = EventBus::new();
    let (mut manager, _memory) = fixture.manager(&bus, LoadPolicy::Lazy);
    manager.start();

    manager.select_module("camera_demo");
    assert!(manager.context().camera().is_some());
    fixture.log.clear();

    manager.select_module("images_demo");
    assert!(manager.context().camera().is_none());
    assert_eq!(
        fixture.log.entries(),
        vec!["deactivate:camera_demo", "close", "construct:images_demo"]
    );
}

#[test]
fn test_unavailable_module_rejected_without_state_change() {
    let fixture = Fixture::new();
    let bus = EventBus::new();
    let (mut manager, memory) = fixture.manager(&bus, LoadPolicy::Lazy);
    manager.start();
    manager.select_module("images_demo");

    let outcome = manager.select_module("broken_demo");
    assert!(matches!(outcome, TransitionOutcome::Rejected { ref module, .. } if module == "broken_demo"));
    assert_eq!(manager.state(), &LifecycleState::ModuleActive("images_demo".into()));
    assert_eq!(fixture.images_counters.deactivations(), 0);
    assert_eq!(memory.dialogs(MessageSeverity::Error).len(), 1);

    let unknown = manager.select_module("not_declared");
    assert!(matches!(unknown, TransitionOutcome::Rejected { .. }));
    assert_eq!(manager.state(), &LifecycleState::ModuleActive("images_demo".into()));
}

#[test]
fn test_construction_failure_falls_back_to_default() {
    let fixture = Fixture::with(|_, images| images.fail_create = true);
    let bus = EventBus::new();
    let (mut manager, memory) = fixture.manager(&bus, LoadPolicy::Lazy);
    manager.start();
    manager.select_module("camera_demo");

    let outcome = manager.select_module("images_demo");
    assert!(matches!(outcome, TransitionOutcome::FellBack { ref module, .. } if module == "images_demo"));
    assert_eq!(manager.state(), &LifecycleState::DefaultActive);
    assert_eq!(manager.active_module(), Some("default"));
    assert_eq!(manager.view_slot_title(ViewSlot::TopLeft), Some("Welcome"));
    assert!(manager.context().camera().is_none(), "previous controller was torn down");
    assert_eq!(memory.dialogs(MessageSeverity::Error).len(), 1);

    // constructor failures keep the entry usable; the menu still responds
    assert!(manager.window().button("images_demo").unwrap().is_enabled());
    assert_eq!(manager.select_module("camera_demo"), TransitionOutcome::Activated("camera_demo".into()));
}

#[test]
fn test_stale_generation_events_dropped() {
    let fixture = Fixture::new();
    let bus = EventBus::new();
    let (mut manager, _memory) = fixture.manager(&bus, LoadPolicy::Lazy);
    manager.start();
    manager.select_module("camera_demo");
    let old = manager.generation();
    manager.select_module("images_demo");

    let stale = AppEvent::Acquisition { generation: old, event: AcquisitionEvent::FrameReady { sequence: 1 } };
    assert_eq!(manager.handle_event(stale), EventDisposition::Dropped);

    let current = AppEvent::Acquisition {
        generation: manager.generation(),
        event: AcquisitionEvent::FrameReady { sequence: 2 },
    };
    assert_eq!(manager.handle_event(current), EventDisposition::Routed(EventOutcome::ViewChanged));
}

#[test]
fn test_controller_errors_become_warnings() {
    let fixture = Fixture::new();
    let bus = EventBus::new();
    let (mut manager, memory) = fixture.manager(&bus, LoadPolicy::Lazy);
    manager.start();
    manager.select_module("images_demo");

    let ok = manager.handle_event(AppEvent::UserInput(UserInput::new("noop", "")));
    assert_eq!(ok, EventDisposition::Routed(EventOutcome::Handled));

    let failed = manager.handle_event(AppEvent::UserInput(UserInput::new("fail", "file unreadable")));
    assert!(matches!(failed, EventDisposition::Routed(EventOutcome::Warning(_))));
    assert_eq!(memory.dialogs(MessageSeverity::Warning).len(), 1);
    assert_eq!(manager.state(), &LifecycleState::ModuleActive("images_demo".into()));
}

#[test]
fn test_shutdown_is_idempotent() {
    let fixture = Fixture::new();
    let bus = EventBus::new();
    let (mut manager, _memory) = fixture.manager(&bus, LoadPolicy::Lazy);
    manager.start();
    manager.select_module("camera_demo");

    assert_eq!(manager.handle_event(AppEvent::Shutdown), EventDisposition::ShutDown);
    manager.shutdown();
    assert_eq!(manager.state(), &LifecycleState::ShutDown);
    assert_eq!(fixture.camera_counters.deactivations(), 1);
    assert!(manager.context().camera().is_none());
    assert!(matches!(manager.select_module("default"), TransitionOutcome::Rejected { .. }));
    drop(manager);
    assert_eq!(fixture.camera_counters.deactivations(), 1);
}
