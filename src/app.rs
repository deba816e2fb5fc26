use crate::input::{collect_input_nonblocking, map_event_to_command, Command};
use crate::render::{draw_game, draw_main, draw_text, draw_walk, help_line, Terminal};
use crossterm::style::Color;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use termipet::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use termipet::model::GAUGE_MAX;
use termipet::session::NAME_MAX;
use termipet::{
    CatchupReport, JsonFileStore, Outcome, Session, SessionEvent, Species, SystemClock,
};
use tracing::{debug, info};

const FPS: u32 = 30;
const RELIEF_EVERY_SECS: f64 = 12.0;
// A relief only counts while the bladder gauge is below this.
const RELIEF_BLADDER_MAX: f64 = 80.0;
const GAME_ROUND_SECS: f64 = 10.0;
const POINTS_PER_HIT: u32 = 10;
const FEEDBACK_HOLD: Duration = Duration::from_millis(1500);
const CELEBRATION_HOLD: Duration = Duration::from_secs(3);

#[derive(Clone, Debug)]
pub(crate) struct WalkRun {
    started: Instant,
    now: Instant,
    bladder: f64,
    pub(crate) reliefs: u32,
}

impl WalkRun {
    fn new(now: Instant, bladder: f64) -> Self {
        Self {
            started: now,
            now,
            bladder,
            reliefs: 0,
        }
    }

    pub(crate) fn elapsed_secs(&self) -> f64 {
        self.now.saturating_duration_since(self.started).as_secs_f64()
    }

    /// A new spot turns up every few seconds; each can be used once, and
    /// only by a pet that actually needs to go.
    pub(crate) fn spot_available(&self) -> bool {
        if self.bladder >= RELIEF_BLADDER_MAX {
            return false;
        }
        let spots = (self.elapsed_secs() / RELIEF_EVERY_SECS) as u32;
        spots > self.reliefs
    }

    fn collect(&mut self) {
        if self.spot_available() {
            self.reliefs += 1;
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct GameRun {
    started: Instant,
    now: Instant,
    pub(crate) score: u32,
}

impl GameRun {
    fn new(now: Instant) -> Self {
        Self {
            started: now,
            now,
            score: 0,
        }
    }

    pub(crate) fn secs_left(&self) -> f64 {
        let played = self.now.saturating_duration_since(self.started).as_secs_f64();
        (GAME_ROUND_SECS - played).max(0.0)
    }

    fn is_over(&self) -> bool {
        self.secs_left() <= 0.0
    }

    fn hit(&mut self) {
        if !self.is_over() {
            self.score = self.score.saturating_add(POINTS_PER_HIT);
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Scene {
    Onboarding { species: usize, name: String },
    Main,
    Rename(String),
    Walk(WalkRun),
    MiniGame(GameRun),
    ConfirmReset,
    Recap(CatchupReport),
}

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    session: Session<JsonFileStore, SystemClock>,
    events: Receiver<SessionEvent>,
    scene: Scene,
    term: Terminal,
    should_quit: bool,
    revert_at: Option<Instant>,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let settings = load_settings(&paths.settings_path);
        termipet::logging::init_file_logging(&paths.log_path, &settings.log_filter)?;
        let store = JsonFileStore::new(&paths.save_path);
        info!(save = %store.path().display(), "termipet starting");

        let mut session = Session::new(store, SystemClock, settings.rules.clone());
        let events = session.subscribe();

        let report = session.load_game();
        let scene = if session.pet().is_none() {
            Scene::Onboarding {
                species: 0,
                name: String::new(),
            }
        } else if report.elapsed_secs > 60.0 && report.has_anything() {
            Scene::Recap(report)
        } else {
            Scene::Main
        };

        let term = Terminal::begin()?;
        session.start(Instant::now());

        Ok(Self {
            settings,
            paths,
            session,
            events,
            scene,
            term,
            should_quit: false,
            revert_at: None,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / FPS as f32);

        while !self.should_quit {
            self.term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                match map_event_to_command(&self.scene, ev) {
                    Some(cmd) => self.handle(cmd, Instant::now()),
                    // For recap: any key continues
                    None if matches!(self.scene, Scene::Recap(_)) => self.scene = Scene::Main,
                    None => {}
                }
                if self.should_quit {
                    break;
                }
            }

            let now = Instant::now();
            self.advance_activity(now);
            self.session.pump(now);
            self.drain_events(now);

            if self.revert_at.is_some_and(|t| now >= t) {
                self.revert_at = None;
                self.session.take_signals();
                self.session.refresh_status();
            }

            self.render_frame()?;
            spin_sleep(frame_dt, Instant::now());
        }

        self.session.teardown();
        self.term.end()?;
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        info!("termipet stopped");
        Ok(())
    }

    fn hold_feedback(&mut self, now: Instant, hold: Duration) {
        let until = now + hold;
        self.revert_at = Some(self.revert_at.map_or(until, |t| t.max(until)));
    }

    fn handle(&mut self, cmd: Command, now: Instant) {
        if cmd == Command::Quit {
            self.should_quit = true;
            return;
        }

        let scene = std::mem::replace(&mut self.scene, Scene::Main);
        self.scene = match (scene, cmd) {
            (Scene::Onboarding { name, .. }, Command::PickSpecies(i)) => Scene::Onboarding {
                species: i.min(Species::ALL.len() - 1),
                name,
            },
            (Scene::Onboarding { species, mut name }, Command::Char(ch)) => {
                if name.chars().count() < NAME_MAX {
                    name.push(ch);
                }
                Scene::Onboarding { species, name }
            }
            (Scene::Onboarding { species, mut name }, Command::Backspace) => {
                name.pop();
                Scene::Onboarding { species, name }
            }
            (Scene::Onboarding { species, name }, Command::Submit) => {
                self.session.create_pet(Species::ALL[species], &name);
                self.hold_feedback(now, Duration::from_secs(2));
                Scene::Main
            }
            (Scene::Onboarding { .. }, Command::Cancel) => {
                self.should_quit = true;
                Scene::Main
            }

            (Scene::Main, Command::Act(kind)) => {
                let outcome = self.session.perform(kind);
                match outcome {
                    Outcome::Applied(_) | Outcome::Rejected(_) => {
                        self.hold_feedback(now, FEEDBACK_HOLD)
                    }
                    Outcome::WalkRequested | Outcome::MiniGameRequested | Outcome::NoPet => {}
                }
                // The session event picks the walk / game scene.
                Scene::Main
            }
            (Scene::Main, Command::RenameOpen) => Scene::Rename(
                self.session
                    .pet()
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
            ),
            (Scene::Main, Command::ResetOpen) => Scene::ConfirmReset,

            (Scene::Rename(mut name), Command::Char(ch)) => {
                if name.chars().count() < NAME_MAX {
                    name.push(ch);
                }
                Scene::Rename(name)
            }
            (Scene::Rename(mut name), Command::Backspace) => {
                name.pop();
                Scene::Rename(name)
            }
            (Scene::Rename(name), Command::Submit) => {
                if self.session.rename_pet(&name) {
                    self.hold_feedback(now, FEEDBACK_HOLD);
                }
                Scene::Main
            }
            (Scene::Rename(_), Command::Cancel) => Scene::Main,

            (Scene::Walk(mut run), Command::Space) => {
                run.now = now;
                run.collect();
                Scene::Walk(run)
            }
            (Scene::Walk(mut run), Command::Submit) => {
                run.now = now;
                self.session.complete_walk(run.elapsed_secs(), run.reliefs);
                self.hold_feedback(now, FEEDBACK_HOLD);
                Scene::Main
            }
            (Scene::Walk(_), Command::Cancel) | (Scene::MiniGame(_), Command::Cancel) => {
                self.session.abandon_activity();
                Scene::Main
            }

            (Scene::MiniGame(mut run), Command::Space) => {
                run.now = now;
                run.hit();
                Scene::MiniGame(run)
            }

            (Scene::ConfirmReset, Command::Confirm(true)) => {
                self.session.reset_game(now);
                Scene::Onboarding {
                    species: 0,
                    name: String::new(),
                }
            }
            (Scene::ConfirmReset, Command::Confirm(false)) => Scene::Main,

            (scene, cmd) => {
                debug!(?cmd, "command not used in this scene");
                scene
            }
        };
    }

    fn advance_activity(&mut self, now: Instant) {
        let finished = match &mut self.scene {
            Scene::Walk(run) => {
                run.now = now;
                run.bladder = self.session.pet().map_or(GAUGE_MAX, |p| p.bladder);
                None
            }
            Scene::MiniGame(run) => {
                run.now = now;
                run.is_over().then_some(run.score)
            }
            _ => None,
        };
        if let Some(score) = finished {
            self.scene = Scene::Main;
            self.session.complete_mini_game(score);
            self.hold_feedback(now, FEEDBACK_HOLD);
        }
    }

    fn drain_events(&mut self, now: Instant) {
        while let Ok(ev) = self.events.try_recv() {
            match ev {
                SessionEvent::WalkRequested => {
                    let bladder = self.session.pet().map_or(GAUGE_MAX, |p| p.bladder);
                    self.scene = Scene::Walk(WalkRun::new(now, bladder));
                }
                SessionEvent::MiniGameRequested => self.scene = Scene::MiniGame(GameRun::new(now)),
                SessionEvent::LeveledUp { .. } | SessionEvent::Evolved { .. } => {
                    self.hold_feedback(now, CELEBRATION_HOLD)
                }
                _ => {}
            }
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let color = self.settings.enable_color;
        let buf = &mut self.term.cur;
        buf.clear();

        let snap = self.session.snapshot();
        let now = self.session.now();

        match &self.scene {
            Scene::Onboarding { species, name } => {
                draw_text(buf, 1, 0, "Adopt a pet", Color::White);
                for (i, s) in Species::ALL.iter().enumerate() {
                    let marker = if i == *species { ">" } else { " " };
                    let line = format!("{marker} {} {}", i + 1, s.display_name());
                    draw_text(buf, 1, 2 + i as u16, &line, Color::White);
                }
                let shown = if name.is_empty() {
                    Species::ALL[*species].display_name()
                } else {
                    name.as_str()
                };
                draw_text(buf, 1, 6, &format!("Name: {shown}_"), Color::White);
            }
            Scene::Recap(report) => {
                draw_main(buf, &snap, now, color);
                let mins = report.elapsed_secs / 60.0;
                let lines = [
                    format!("While you were away ({mins:.0} min):"),
                    format!(
                        "hunger -{:.1}  thirst -{:.1}  affection -{:.1}  bladder -{:.1}",
                        report.hunger_lost,
                        report.thirst_lost,
                        report.affection_lost,
                        report.bladder_lost
                    ),
                ];
                for (i, line) in lines.iter().enumerate() {
                    draw_text(buf, 1, 11 + i as u16, line, Color::White);
                }
            }
            Scene::Walk(run) => {
                draw_main(buf, &snap, now, color);
                draw_walk(buf, run);
            }
            Scene::MiniGame(run) => {
                draw_main(buf, &snap, now, color);
                let game = snap
                    .pet
                    .as_ref()
                    .map(|p| p.species.mini_game_name())
                    .unwrap_or("Mini-game");
                draw_game(buf, run, game);
            }
            Scene::Rename(name) => {
                draw_main(buf, &snap, now, color);
                draw_text(buf, 1, 11, &format!("New name: {name}_"), Color::White);
            }
            Scene::ConfirmReset => {
                draw_main(buf, &snap, now, color);
                draw_text(buf, 1, 11, "This deletes your pet and all progress.", Color::Red);
            }
            Scene::Main => draw_main(buf, &snap, now, color),
        }

        let help_y = buf.h.saturating_sub(1);
        draw_text(buf, 1, help_y, help_line(&self.scene), Color::DarkGrey);

        self.term.present()?;
        Ok(())
    }
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    app.run()?;
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
