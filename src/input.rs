use crate::app::Scene;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;
use termipet::{ActionKind, Species};

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Command {
    Quit,
    Act(ActionKind),
    RenameOpen,
    ResetOpen,
    Confirm(bool),
    PickSpecies(usize),
    Char(char),
    Backspace,
    Submit,
    Cancel,
    Space,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

fn text_entry(ev: &InputEvent) -> Option<Command> {
    match ev.key {
        KeyCode::Enter => Some(Command::Submit),
        KeyCode::Esc => Some(Command::Cancel),
        KeyCode::Backspace => Some(Command::Backspace),
        KeyCode::Char(ch) if !ch.is_control() => Some(Command::Char(ch)),
        _ => None,
    }
}

pub(crate) fn map_event_to_command(scene: &Scene, ev: InputEvent) -> Option<Command> {
    if matches!(ev.key, KeyCode::Char('c')) && ev.mods.contains(KeyModifiers::CONTROL) {
        return Some(Command::Quit);
    }

    match scene {
        // Digits pick a species until typing starts; arrows work any time.
        Scene::Onboarding { species, name } => match ev.key {
            KeyCode::Char(d @ '1'..='3') if name.is_empty() => {
                Some(Command::PickSpecies(d as usize - '1' as usize))
            }
            KeyCode::Up => Some(Command::PickSpecies(
                (species + Species::ALL.len() - 1) % Species::ALL.len(),
            )),
            KeyCode::Down => Some(Command::PickSpecies((species + 1) % Species::ALL.len())),
            _ => text_entry(&ev),
        },
        Scene::Rename(_) => text_entry(&ev),
        Scene::Main => match ev.key {
            KeyCode::Char('f') | KeyCode::Char('F') => Some(Command::Act(ActionKind::Feed)),
            KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::Act(ActionKind::Drink)),
            KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::Act(ActionKind::Pet)),
            KeyCode::Char('w') | KeyCode::Char('W') => Some(Command::Act(ActionKind::Walk)),
            KeyCode::Char('g') | KeyCode::Char('G') => Some(Command::Act(ActionKind::Play)),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::RenameOpen),
            KeyCode::Char('x') | KeyCode::Char('X') => Some(Command::ResetOpen),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        },
        Scene::Walk(_) => match ev.key {
            KeyCode::Char(' ') => Some(Command::Space),
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::Esc => Some(Command::Cancel),
            _ => None,
        },
        Scene::MiniGame(_) => match ev.key {
            KeyCode::Char(' ') => Some(Command::Space),
            KeyCode::Esc => Some(Command::Cancel),
            _ => None,
        },
        Scene::ConfirmReset => match ev.key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Command::Confirm(true)),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Command::Confirm(false)),
            _ => None,
        },
        Scene::Recap(_) => None,
    }
}
