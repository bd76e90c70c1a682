use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the watch session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    /// Toggle the first dark indicator class on the root element
    ToggleDarkClass,
    /// Flip the OS colour-scheme preference
    TogglePreference,
    Rerun,
    ShowTheme,
    /// Copy the first rendered block
    CopyFirst,
    Quit,
}

pub fn handle_event(event: &Event) -> Option<WatchCommand> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(key),
        _ => None,
    }
}

fn handle_key(key: &KeyEvent) -> Option<WatchCommand> {
    // Ctrl-C quits as in any terminal program
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(WatchCommand::Quit);
    }

    match key.code {
        KeyCode::Char('t') => Some(WatchCommand::ToggleDarkClass),
        KeyCode::Char('p') => Some(WatchCommand::TogglePreference),
        KeyCode::Char('r') => Some(WatchCommand::Rerun),
        KeyCode::Char('i') => Some(WatchCommand::ShowTheme),
        KeyCode::Char('c') => Some(WatchCommand::CopyFirst),
        KeyCode::Char('q') | KeyCode::Esc => Some(WatchCommand::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_key_bindings() {
        let none = KeyModifiers::NONE;
        assert_eq!(
            handle_event(&press(KeyCode::Char('t'), none)),
            Some(WatchCommand::ToggleDarkClass)
        );
        assert_eq!(
            handle_event(&press(KeyCode::Char('p'), none)),
            Some(WatchCommand::TogglePreference)
        );
        assert_eq!(handle_event(&press(KeyCode::Char('r'), none)), Some(WatchCommand::Rerun));
        assert_eq!(handle_event(&press(KeyCode::Char('i'), none)), Some(WatchCommand::ShowTheme));
        assert_eq!(handle_event(&press(KeyCode::Char('c'), none)), Some(WatchCommand::CopyFirst));
        assert_eq!(handle_event(&press(KeyCode::Esc, none)), Some(WatchCommand::Quit));
        assert_eq!(
            handle_event(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(WatchCommand::Quit)
        );
        assert_eq!(handle_event(&press(KeyCode::Char('x'), none)), None);
        assert_eq!(handle_event(&Event::Resize(80, 24)), None);
    }
}
