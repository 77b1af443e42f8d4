use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    Quit,
    MoveUp,
    MoveDown,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    ScrollLogUp,
    ScrollLogDown,
    InputChar(char),
    Backspace,
    ClearInput,
    Submit,
    Escape,
    MouseScrollUp,
    MouseScrollDown,
    MouseLeftClick(u16, u16),
    MouseMoved(u16, u16),
    FocusLost,
}

fn map_key_event(key_event: KeyEvent) -> AppEvent {
    if key_event.kind != KeyEventKind::Press {
        return AppEvent::Tick;
    }

    if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return AppEvent::Quit;
    }
    if key_event.code == KeyCode::Char('u') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return AppEvent::ClearInput;
    }

    match key_event.code {
        KeyCode::Up
            if key_event.modifiers.contains(KeyModifiers::SHIFT)
                || key_event.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            AppEvent::ScrollLogUp
        }
        KeyCode::Down
            if key_event.modifiers.contains(KeyModifiers::SHIFT)
                || key_event.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            AppEvent::ScrollLogDown
        }
        KeyCode::PageUp => AppEvent::ScrollLogUp,
        KeyCode::PageDown => AppEvent::ScrollLogDown,
        KeyCode::Up => AppEvent::MoveUp,
        KeyCode::Down => AppEvent::MoveDown,
        KeyCode::Left => AppEvent::CursorLeft,
        KeyCode::Right => AppEvent::CursorRight,
        KeyCode::Home => AppEvent::CursorHome,
        KeyCode::End => AppEvent::CursorEnd,
        KeyCode::Backspace => AppEvent::Backspace,
        KeyCode::Enter => AppEvent::Submit,
        KeyCode::Esc => AppEvent::Escape,
        KeyCode::Char(c) => AppEvent::InputChar(c),
        _ => AppEvent::Tick,
    }
}

fn map_mouse_event(mouse_event: MouseEvent) -> AppEvent {
    match mouse_event.kind {
        MouseEventKind::ScrollUp => AppEvent::MouseScrollUp,
        MouseEventKind::ScrollDown => AppEvent::MouseScrollDown,
        MouseEventKind::Down(MouseButton::Left) => {
            AppEvent::MouseLeftClick(mouse_event.column, mouse_event.row)
        }
        MouseEventKind::Moved => AppEvent::MouseMoved(mouse_event.column, mouse_event.row),
        _ => AppEvent::Tick,
    }
}

pub fn next_event() -> io::Result<AppEvent> {
    if event::poll(Duration::from_millis(16))? {
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                return Ok(map_key_event(key_event));
            }
            Event::Mouse(mouse_event) => return Ok(map_mouse_event(mouse_event)),
            Event::FocusLost => return Ok(AppEvent::FocusLost),
            _ => {}
        }
    }

    Ok(AppEvent::Tick)
}
