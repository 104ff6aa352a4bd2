use crate::render::Viewport;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Tap,
    Quit,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<Event>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        out.push(event::read()?);
        if out.len() >= 32 {
            break;
        }
    }
    Ok(out)
}

/// `cat` is the cell rectangle the cat currently occupies; clicks elsewhere
/// are ignored.
pub(crate) fn map_event(ev: &Event, cat: Option<Viewport>) -> Option<Action> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press => {
            if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
                return Some(Action::Quit);
            }
            match k.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
                KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Tap),
                _ => None,
            }
        }
        Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
            let hit = cat.map_or(false, |r| r.contains(m.column as i32, m.row as i32));
            hit.then_some(Action::Tap)
        }
        _ => None,
    }
}
