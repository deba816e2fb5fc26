use crate::app::{GameRun, Scene, WalkRun};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};
use termipet::{ActionKind, Animation, EvolutionStage, Pet, SessionSnapshot, Species};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

pub(crate) struct Terminal {
    out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Writes only the cells that changed since the last frame.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

// Emoji are two cells wide and would shift the grid.
fn narrow(ch: char) -> bool {
    let c = ch as u32;
    c < 0x2600 || (0x27C0..0x1F000).contains(&c) && c != 0xFE0F
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().filter(|c| narrow(*c)).enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(
            xx,
            y,
            Cell {
                ch,
                fg,
                bg: Color::Black,
            },
        );
    }
}

fn bar(value: f64, width: usize) -> String {
    let v = (value / 100.0).clamp(0.0, 1.0);
    let fill = (v * width as f64 + 0.5) as usize;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

fn gauge_color(value: f64, color: bool) -> Color {
    if !color {
        return Color::White;
    }
    if value < 20.0 {
        Color::Red
    } else if value < 50.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn sprite(species: Species, stage: EvolutionStage, anim: Animation) -> [&'static str; 4] {
    let face = match anim {
        Animation::Eating | Animation::Drinking => "(^o^)",
        Animation::Loved => "(^3^)",
        Animation::Sad => "(;_;)",
        Animation::Celebrate | Animation::Evolving => "\\(^v^)/",
        Animation::Walking | Animation::Playing => "(>_<)",
        Animation::Idle => "(o.o)",
    };
    let body = match species {
        Species::Pig => " @(    )@ ",
        Species::Dog => " U(    )U ",
        Species::Frog => " ~(    )~ ",
    };
    let feet = match stage {
        EvolutionStage::Baby => "   \" \"   ",
        EvolutionStage::Child => "   /  \\   ",
        EvolutionStage::Adult => "  _/  \\_  ",
        EvolutionStage::Senior => "  _/||\\_  ",
    };
    let ears = match species {
        Species::Pig => "  ^    ^  ",
        Species::Dog => "  /\\  /\\  ",
        Species::Frog => "  o    o  ",
    };
    [ears, face, body, feet]
}

pub(crate) fn draw_pet(buf: &mut CellBuffer, pet: &Pet, anim: Animation, x: u16, y: u16, color: bool) {
    let fg = if color { Color::Cyan } else { Color::White };
    for (i, line) in sprite(pet.species, pet.stage, anim).iter().enumerate() {
        let xx = if i == 1 { x + 2 } else { x };
        draw_text(buf, xx, y + i as u16, line, fg);
    }
}

pub(crate) fn draw_main(buf: &mut CellBuffer, snap: &SessionSnapshot, now: chrono::DateTime<chrono::Utc>, color: bool) {
    let fg = Color::White;
    let Some(pet) = &snap.pet else {
        return;
    };

    let mood = snap.mood.map(|m| m.label()).unwrap_or("-");
    let title = format!(
        "{} the {}  |  {} lv {}  |  day {}  |  mood: {}",
        pet.name,
        pet.species.display_name(),
        pet.stage.label(),
        pet.level,
        pet.days_since_creation(now),
        mood
    );
    draw_text(buf, 1, 0, &title, fg);

    let lines = [
        ("Hunger   ", pet.hunger),
        ("Thirst   ", pet.thirst),
        ("Affection", pet.affection),
        ("Bladder  ", pet.bladder),
    ];
    for (i, (name, val)) in lines.iter().enumerate() {
        let s = format!("{name} {} {:>5.1}", bar(*val, 20), val);
        draw_text(buf, 1, 2 + i as u16, &s, gauge_color(*val, color));
    }

    let xp = format!(
        "XP       {} {}/{}",
        bar(pet.level_progress() * 100.0, 20),
        pet.xp,
        pet.xp_for_next_level()
    );
    draw_text(buf, 1, 7, &xp, fg);
    draw_text(buf, 1, 8, &format!("Happiness {:.0}%", pet.happiness()), fg);

    let games_left = termipet::model::MAX_DAILY_MINI_GAMES.saturating_sub(pet.mini_games_today(now));
    let per_kind: Vec<String> = ActionKind::ALL
        .iter()
        .map(|&k| format!("{} {}", k.display_name().to_lowercase(), snap.counters.for_kind(k)))
        .collect();
    let totals = format!(
        "Actions {} ({})  games left today {}  best {}",
        snap.counters.total_actions,
        per_kind.join(" "),
        games_left,
        pet.high_score
    );
    draw_text(buf, 1, 9, &totals, fg);

    draw_pet(buf, pet, snap.signals.animation, buf.w / 2, 12, color);

    let status_color = if color { Color::Yellow } else { fg };
    draw_text(buf, 1, buf.h.saturating_sub(3), &snap.status, status_color);
}

pub(crate) fn draw_walk(buf: &mut CellBuffer, run: &WalkRun) {
    let fg = Color::White;
    draw_text(buf, 1, 11, "Out on a walk", fg);
    draw_text(buf, 1, 12, &format!("Time: {:>4.0}s   reliefs: {}", run.elapsed_secs(), run.reliefs), fg);
    if run.spot_available() {
        draw_text(buf, 1, 13, "Your pet found a good spot! Press space.", Color::Green);
    }
}

pub(crate) fn draw_game(buf: &mut CellBuffer, run: &GameRun, name: &str) {
    let fg = Color::White;
    draw_text(buf, 1, 11, name, fg);
    draw_text(
        buf,
        1,
        12,
        &format!("Score: {:>4}   time left: {:>2.0}s", run.score, run.secs_left()),
        fg,
    );
}

pub(crate) fn help_line(scene: &Scene) -> &'static str {
    match scene {
        Scene::Onboarding { .. } => "Pick 1 pig | 2 dog | 3 frog (or up/down), type a name, enter to adopt | esc quit",
        Scene::Main => "f feed | d drink | p cuddle | w walk | g play | r rename | x reset | q quit",
        Scene::Rename(_) => "Rename: type name | enter save | esc cancel",
        Scene::Walk(_) => "Walk: space collect | enter finish | esc abandon",
        Scene::MiniGame(_) => "Game: space as fast as you can! | esc abandon",
        Scene::ConfirmReset => "Reset everything? y yes | n no",
        Scene::Recap(_) => "Recap: any key to continue",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(50.0, 4), "[██  ]");
        assert_eq!(bar(150.0, 2), "[██]");
        assert_eq!(bar(-1.0, 2), "[  ]");
    }

    #[test]
    fn emoji_are_skipped() {
        let mut buf = CellBuffer::new(10, 1);
        draw_text(&mut buf, 0, 0, "a🍎b", Color::White);
        assert_eq!(buf.cells[0].ch, 'a');
        assert_eq!(buf.cells[1].ch, 'b');
    }
}
