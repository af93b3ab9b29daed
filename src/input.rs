//! Key mapping from terminal events to game commands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    TogglePause,
    Start,
    Quit,
}

/// Map keyboard input to a command. The bindings are fixed.
pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::Left => Some(Command::MoveLeft),
        KeyCode::Right => Some(Command::MoveRight),
        KeyCode::Down => Some(Command::SoftDrop),
        KeyCode::Up => Some(Command::Rotate),
        KeyCode::Char(' ') => Some(Command::HardDrop),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::TogglePause),
        KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Start),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        assert_eq!(map_key(KeyEvent::from(KeyCode::Left)), Some(Command::MoveLeft));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Right)), Some(Command::MoveRight));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Down)), Some(Command::SoftDrop));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Up)), Some(Command::Rotate));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char(' '))), Some(Command::HardDrop));
    }

    #[test]
    fn test_session_keys() {
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('p'))), Some(Command::TogglePause));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('P'))), Some(Command::TogglePause));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Enter)), Some(Command::Start));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('r'))), Some(Command::Start));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Esc)), Some(Command::Quit));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), Some(Command::Quit));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('x'))), None);
        assert_eq!(map_key(KeyEvent::from(KeyCode::Tab)), None);
    }
}
