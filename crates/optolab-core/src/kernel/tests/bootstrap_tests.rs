use std::sync::Arc;

use crate::event::AppEvent;
use crate::kernel::bootstrap::{AppOptions, Application};
use crate::kernel::constants::API_VERSION;
use crate::kernel::error::{Error, KernelLifecyclePhase};
use crate::plugin_system::tests::support::Fixture;
use crate::plugin_system::{
    EventDisposition, LifecycleState, LoadPolicy, PluginRegistry, PluginSystemError, TransitionOutcome,
};
use crate::ui_bridge::MemoryUiProvider;

fn app_for(fixture: &Fixture, load_policy: Option<LoadPolicy>) -> Application {
    let options = AppOptions {
        load_policy,
        camera_driver: Arc::new(fixture.driver.clone()),
        ui_provider: Some(Box::new(MemoryUiProvider::new())),
    };
    Application::from_manifest((*fixture.manifest).clone(), Arc::clone(&fixture.registry), options)
        .expect("application should build")
}

#[test]
fn test_missing_manifest_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let registry = PluginRegistry::new(API_VERSION).unwrap();
    let err = Application::new(&dir.path().join("appli.toml"), registry, AppOptions::default()).unwrap_err();
    assert!(matches!(err, Error::PluginSystem(PluginSystemError::ManifestError { .. })));
}

#[test]
fn test_start_twice_fails() {
    let fixture = Fixture::new();
    let mut app = app_for(&fixture, None);
    assert!(!app.is_initialized());

    assert_eq!(app.start().unwrap(), TransitionOutcome::Activated("default".into()));
    assert!(app.is_initialized());
    assert!(matches!(
        app.start(),
        Err(Error::KernelLifecycleError { phase: KernelLifecyclePhase::Start, .. })
    ));
}

#[test]
fn test_cli_policy_overrides_manifest() {
    let fixture = Fixture::new();
    let mut app = app_for(&fixture, Some(LoadPolicy::Eager));
    app.start().unwrap();
    assert_eq!(app.manager().load_policy(), LoadPolicy::Eager);
    assert_eq!(fixture.camera_counters.loads(), 1);
}

#[test]
fn test_process_pending_in_order() {
    let fixture = Fixture::new();
    let mut app = app_for(&fixture, None);
    app.start().unwrap();

    let events = app.events();
    events.send(AppEvent::MenuChanged("images_demo".into())).unwrap();
    events.send(AppEvent::MenuChanged("images_demo".into())).unwrap();

    let dispositions = app.process_pending();
    assert_eq!(
        dispositions,
        vec![
            EventDisposition::Transition(TransitionOutcome::Activated("images_demo".into())),
            EventDisposition::Transition(TransitionOutcome::Unchanged),
        ]
    );
}

#[tokio::test]
async fn test_run_until_shutdown() {
    let fixture = Fixture::new();
    let mut app = app_for(&fixture, None);
    let events = app.events();
    events.send(AppEvent::MenuChanged("camera_demo".into())).unwrap();
    events.send(AppEvent::Shutdown).unwrap();

    app.run().await.unwrap();

    assert_eq!(app.manager().state(), &LifecycleState::ShutDown);
    assert_eq!(fixture.camera_counters.constructions(), 1);
    assert_eq!(fixture.camera_counters.deactivations(), 1);
    assert!(events.send(AppEvent::Shutdown).is_err(), "bus closed after run");
}
