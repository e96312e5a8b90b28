//! Keyboard mapping for the control loop.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tune_player::TransportCommand;

#[derive(Clone, Copy, Debug)]
pub struct KeyBindings {
    pub seek_step: f64,
    pub volume_step: f32,
}

/// Translate a key press into a transport command. Releases and repeats are ignored.
pub fn command_for_key(key: &KeyEvent, bindings: &KeyBindings) -> Option<TransportCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(TransportCommand::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') => Some(TransportCommand::Quit),
        KeyCode::Char('p') => Some(TransportCommand::TogglePause),
        KeyCode::Right => Some(TransportCommand::Seek(bindings.seek_step)),
        KeyCode::Left => Some(TransportCommand::Seek(-bindings.seek_step)),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            Some(TransportCommand::AdjustVolume(bindings.volume_step))
        }
        KeyCode::Char('-') => Some(TransportCommand::AdjustVolume(-bindings.volume_step)),
        _ => None,
    }
}
