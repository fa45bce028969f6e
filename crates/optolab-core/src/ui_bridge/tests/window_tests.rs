use crate::acquisition::FrameSummary;
use crate::event::{AppEvent, EventBus};
use crate::ui_bridge::{
    MainWindow, MemoryUiProvider, MessageSeverity, UiBridgeError, UiUpdateType, ViewSlot,
    ViewWidget, ViewWidgets, WidgetContent,
};

fn window_with_memory(bus: &EventBus) -> (MainWindow, MemoryUiProvider) {
    let memory = MemoryUiProvider::new();
    let window = MainWindow::new(bus.sender())
        .with_provider(Box::new(memory.clone()))
        .unwrap();
    (window, memory)
}

#[test]
fn test_menu_rebuild_keeps_declaration_order() {
    let bus = EventBus::new();
    let (mut window, memory) = window_with_memory(&bus);

    window.set_menu_elements(&["default", "camera_demo", "broken_demo"]);
    window.set_menu_elements(&["default", "images"]);

    let names: Vec<&str> = window.menu_buttons().iter().map(|b| b.name()).collect();
    assert_eq!(names, vec!["default", "images"]);
    assert!(window.menu_buttons().iter().all(|b| b.is_enabled() && !b.is_active()));
    assert_eq!(
        memory.updates().last(),
        Some(&UiUpdateType::MenuRebuilt(vec!["default".into(), "images".into()]))
    );
}

#[test]
fn test_click_emits_menu_changed() {
    let mut bus = EventBus::new();
    let (mut window, _memory) = window_with_memory(&bus);
    window.set_menu_elements(&["default", "camera_demo"]);

    window.click("camera_demo").unwrap();
    window.button("default").unwrap().click().unwrap();

    assert_eq!(
        bus.drain(),
        vec![
            AppEvent::MenuChanged("camera_demo".into()),
            AppEvent::MenuChanged("default".into()),
        ]
    );
}

#[test]
fn test_disabled_entry_does_not_emit() {
    let mut bus = EventBus::new();
    let (mut window, memory) = window_with_memory(&bus);
    window.set_menu_elements(&["default", "broken_demo"]);
    window.set_menu_entry_state("broken_demo", false, false).unwrap();

    let err = window.click("broken_demo").unwrap_err();
    assert!(matches!(err, UiBridgeError::EntryDisabled(ref name) if name == "broken_demo"));
    assert!(bus.drain().is_empty());
    assert!(memory.updates().contains(&UiUpdateType::MenuEntry {
        name: "broken_demo".into(),
        enabled: false,
        active: false,
    }));

    assert!(matches!(
        window.set_menu_entry_state("missing", true, false),
        Err(UiBridgeError::EntryNotFound(_))
    ));
}

#[test]
fn test_view_slot_replacement() {
    let bus = EventBus::new();
    let (mut window, memory) = window_with_memory(&bus);

    window.set_view_slot(ViewSlot::TopLeft, Some(ViewWidget::text("Camera", "first")));
    window.set_view_slot(ViewSlot::TopLeft, Some(ViewWidget::text("Camera", "second")));
    assert_eq!(window.view_slot(ViewSlot::TopLeft), Some(&ViewWidget::text("Camera", "second")));

    window.clear_view_slots();
    assert!(ViewSlot::ALL.iter().all(|s| window.view_slot(*s).is_none()));
    assert_eq!(
        memory.updates().last(),
        Some(&UiUpdateType::SlotChanged { slot: ViewSlot::TopLeft, title: None })
    );
}

#[test]
fn test_view_widgets_slots() {
    let widgets = ViewWidgets::new()
        .with(ViewSlot::TopLeft, ViewWidget::text("a", "a"))
        .with(ViewSlot::BotRight, ViewWidget::empty("d"));
    assert_eq!(widgets.top_left().map(|w| w.title.as_str()), Some("a"));
    assert!(widgets.top_right().is_none());

    let slots: Vec<_> = widgets.into_slots().collect();
    assert_eq!(slots.len(), 4);
    assert_eq!(slots[3].0, ViewSlot::BotRight);
    assert!(slots[1].1.is_none());
}

#[test]
fn test_show_message_routes_by_severity() {
    let bus = EventBus::new();
    let (mut window, memory) = window_with_memory(&bus);

    window.set_title("Machine Vision / LEnsE - 2025");
    window.show_message(MessageSeverity::Info, "ready");
    window.show_message(MessageSeverity::Error, "No camera detected");

    assert_eq!(window.title(), "Machine Vision / LEnsE - 2025");
    assert_eq!(memory.dialogs(MessageSeverity::Error), vec!["No camera detected".to_string()]);
    assert_eq!(
        window.last_message(),
        Some(&(MessageSeverity::Error, "No camera detected".to_string()))
    );
}

#[test]
fn test_histogram_widget_labels_bins() {
    let summary = FrameSummary { sequence: 3, width: 2, height: 2, bits_depth: 12, histogram: vec![1, 0, 0, 3] };
    let widget = ViewWidget::histogram("Histogram", &summary);
    assert_eq!(
        widget.content,
        WidgetContent::Table(vec![
            ("0..".into(), "1".into()),
            ("1024..".into(), "0".into()),
            ("2048..".into(), "0".into()),
            ("3072..".into(), "3".into()),
        ])
    );
}
