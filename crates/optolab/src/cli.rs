use optolab_core::event::{AppEvent, EventSender, UserInput};
use optolab_core::ui_bridge::{MessageSeverity, UiBridgeError, UiMessage, UiProvider, UiUpdateType, ViewSlot};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Renders the main window as plain lines on stdout.
///
/// Slot updates are only printed when a slot's title changes, so a live
/// stream does not flood the console.
#[derive(Debug, Default)]
pub struct ConsoleUiProvider {
    slot_titles: [Option<String>; 4],
}

impl ConsoleUiProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn severity_tag(severity: MessageSeverity) -> &'static str {
    match severity {
        MessageSeverity::Info => "info",
        MessageSeverity::Warning => "warning",
        MessageSeverity::Error => "error",
    }
}

impl UiProvider for ConsoleUiProvider {
    fn name(&self) -> &str {
        "console"
    }

    fn handle_message(&mut self, message: &UiMessage) -> Result<(), UiBridgeError> {
        match &message.update_type {
            UiUpdateType::Title(title) => println!("== {} ==", title),
            UiUpdateType::Status(text) => println!("[info] {}", text),
            UiUpdateType::Dialog(text, severity) => println!("[{}] {}", severity_tag(*severity), text),
            UiUpdateType::MenuRebuilt(names) => println!("menu: {}", names.join(" | ")),
            UiUpdateType::MenuEntry { name, enabled, active } => {
                log::debug!("menu entry {} enabled={} active={}", name, enabled, active);
                if *active {
                    println!("active: {}", name);
                }
            }
            UiUpdateType::SlotChanged { slot, title } => print_slot(&mut self.slot_titles, *slot, title.clone()),
        }
        Ok(())
    }
}

fn print_slot(titles: &mut [Option<String>; 4], slot: ViewSlot, title: Option<String>) {
    let previous = &mut titles[slot.index()];
    if *previous == title {
        return;
    }
    match &title {
        Some(t) => println!("  {}: {}", slot, t),
        None => log::trace!("{} cleared", slot),
    }
    *previous = title;
}

/// A line typed in the console session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Select(String),
    Input(UserInput),
    Quit,
    Help,
}

pub const USAGE: &str = "commands: select <module> | input <command> <value> | quit";

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    match verb {
        "select" => match parts.next().filter(|s| !s.is_empty()) {
            Some(name) => Ok(ConsoleCommand::Select(name.to_string())),
            None => Err("select needs a module name".to_string()),
        },
        "input" => {
            let command = parts.next().filter(|s| !s.is_empty());
            let value = parts.next().map(str::trim).unwrap_or_default();
            match command {
                Some(command) => Ok(ConsoleCommand::Input(UserInput::new(command, value))),
                None => Err("input needs a command".to_string()),
            }
        }
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        "help" | "?" => Ok(ConsoleCommand::Help),
        other => Err(format!("unknown command '{}'", other)),
    }
}

/// Forward stdin commands to the UI loop until `quit` or end of input
pub async fn read_commands(events: EventSender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let event = match parse_command(&line) {
            Ok(ConsoleCommand::Select(name)) => AppEvent::MenuChanged(name),
            Ok(ConsoleCommand::Input(input)) => AppEvent::UserInput(input),
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Help) => {
                println!("{}", USAGE);
                continue;
            }
            Err(e) => {
                eprintln!("{}. {}", e, USAGE);
                continue;
            }
        };
        if events.send(event).is_err() {
            return;
        }
    }
    if let Err(e) = events.send(AppEvent::Shutdown) {
        log::debug!("Shutdown request not delivered: {}", e);
    }
}
