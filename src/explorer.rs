//! Terminal step viewer using ratatui
//!
//! Drives any [`StepGenerator`] interactively and redraws the grid after
//! every step. Space steps once, R toggles auto-run, +/- change the number
//! of steps per frame, F runs to completion, arrows pan, Q quits.

use std::error::Error;
use std::io::stdout;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::Paragraph,
    style::{Color, Style},
};

use crate::ascii::{cell_char, cell_color};
use crate::dungeon::{StepEvent, StepGenerator};

const MAX_STEPS_PER_TICK: usize = 1024;

/// Outcome of a key press
#[derive(Clone, Copy, Debug, PartialEq)]
enum Action {
    Continue,
    Quit,
}

/// Viewer state wrapped around a generator
struct Explorer<G: StepGenerator> {
    generator: G,
    title: String,
    steps: usize,
    last_event: Option<StepEvent>,
    auto_run: bool,
    steps_per_tick: usize,
    /// Top-left grid cell shown in the viewport
    scroll_x: usize,
    scroll_y: usize,
}

impl<G: StepGenerator> Explorer<G> {
    fn new(generator: G, title: &str) -> Self {
        Explorer {
            generator,
            title: title.to_string(),
            steps: 0,
            last_event: None,
            auto_run: false,
            steps_per_tick: 1,
            scroll_x: 0,
            scroll_y: 0,
        }
    }

    fn step_once(&mut self) {
        if self.generator.is_finished() {
            self.auto_run = false;
            return;
        }
        self.last_event = Some(self.generator.step());
        self.steps += 1;
    }

    /// Advance one frame of auto-run
    fn tick(&mut self) {
        if !self.auto_run {
            return;
        }
        for _ in 0..self.steps_per_tick {
            self.step_once();
            if self.generator.is_finished() {
                self.auto_run = false;
                break;
            }
        }
    }

    fn finish_all(&mut self) {
        while !self.generator.is_finished() {
            self.step_once();
        }
        self.auto_run = false;
    }

    fn faster(&mut self) {
        self.steps_per_tick = (self.steps_per_tick * 2).min(MAX_STEPS_PER_TICK);
    }

    fn slower(&mut self) {
        self.steps_per_tick = (self.steps_per_tick / 2).max(1);
    }

    fn scroll(&mut self, dx: i32, dy: i32) {
        let grid = self.generator.grid();
        let max_x = grid.width.saturating_sub(1) as i32;
        let max_y = grid.height.saturating_sub(1) as i32;
        self.scroll_x = (self.scroll_x as i32 + dx).clamp(0, max_x) as usize;
        self.scroll_y = (self.scroll_y as i32 + dy).clamp(0, max_y) as usize;
    }

    fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char(' ') => self.step_once(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.auto_run = !self.auto_run && !self.generator.is_finished();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.faster(),
            KeyCode::Char('-') | KeyCode::Char('_') => self.slower(),
            KeyCode::Char('f') | KeyCode::Char('F') => self.finish_all(),
            KeyCode::Up => self.scroll(0, -1),
            KeyCode::Down => self.scroll(0, 1),
            KeyCode::Left => self.scroll(-1, 0),
            KeyCode::Right => self.scroll(1, 0),
            _ => {}
        }
        Action::Continue
    }

    fn status(&self) -> String {
        let state = if self.generator.is_finished() {
            "done"
        } else if self.auto_run {
            "running"
        } else {
            "paused"
        };
        let event = self.last_event.map(describe_event).unwrap_or_default();
        format!(
            " {} | step {} | {} | x{} | {} | Space:Step  R:Run  +/-:Speed  F:Finish  Q:Quit",
            self.title, self.steps, state, self.steps_per_tick, event,
        )
    }

    fn render_grid(&self, area: Rect, buf: &mut Buffer) {
        let grid = self.generator.grid();

        for dy in 0..area.height as usize {
            let y = self.scroll_y + dy;
            if y >= grid.height {
                break;
            }
            for dx in 0..area.width as usize {
                let x = self.scroll_x + dx;
                if x >= grid.width {
                    break;
                }
                let cell = *grid.get(x, y);
                let (r, g, b) = cell_color(cell);
                let style = Style::default().fg(Color::Rgb(230, 230, 230)).bg(Color::Rgb(r, g, b));
                buf.get_mut(area.x + dx as u16, area.y + dy as u16)
                    .set_char(cell_char(cell))
                    .set_style(style);
            }
        }
    }
}

fn describe_event(event: StepEvent) -> String {
    match event {
        StepEvent::Carved { from, to } => format!("carved {:?} -> {:?}", from, to),
        StepEvent::Backtracked { at } => format!("backtracked at {:?}", at),
        StepEvent::RoomsInjected { rooms } => format!("{} rooms injected", rooms),
        StepEvent::Simulated { iteration } => format!("iteration {}", iteration),
        StepEvent::Connected { edge } => {
            format!("connected {}-{} ({:.1})", edge.a, edge.b, edge.weight)
        }
        StepEvent::Finished => "finished".to_string(),
    }
}

/// Run the step viewer until the user quits, then return the generator's
/// output in whatever state it reached.
pub fn run_explorer<G: StepGenerator>(
    generator: G,
    title: &str,
) -> Result<G::Output, Box<dyn Error>> {
    terminal::enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut explorer = Explorer::new(generator, title);

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(f.area());

            explorer.render_grid(chunks[0], f.buffer_mut());

            let status = Paragraph::new(explorer.status())
                .style(Style::default().bg(Color::DarkGray).fg(Color::White));
            f.render_widget(status, chunks[1]);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if explorer.handle_key(key.code) == Action::Quit {
                    break;
                }
            }
        }

        explorer.tick();
    }

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(explorer.generator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{CaveConfig, CaveSimulator};
    use crate::seeds::rng_from_seed;

    fn cave_explorer(steps: usize) -> Explorer<CaveSimulator> {
        let config = CaveConfig {
            map_width: 20,
            map_height: 12,
            simulation_steps: steps,
            ..Default::default()
        };
        let sim = CaveSimulator::new(&config, &mut rng_from_seed(9)).unwrap();
        Explorer::new(sim, "caves")
    }

    #[test]
    fn test_space_steps_once() {
        let mut explorer = cave_explorer(3);
        explorer.handle_key(KeyCode::Char(' '));
        assert_eq!(explorer.steps, 1);
        assert_eq!(explorer.last_event, Some(StepEvent::Simulated { iteration: 1 }));
    }

    #[test]
    fn test_auto_run_stops_when_finished() {
        let mut explorer = cave_explorer(3);
        explorer.handle_key(KeyCode::Char('r'));
        assert!(explorer.auto_run);
        for _ in 0..10 {
            explorer.tick();
        }
        assert!(explorer.generator.is_finished());
        assert!(!explorer.auto_run);
        assert_eq!(explorer.steps, 3);
    }

    #[test]
    fn test_speed_is_bounded() {
        let mut explorer = cave_explorer(1);
        explorer.handle_key(KeyCode::Char('-'));
        assert_eq!(explorer.steps_per_tick, 1);
        for _ in 0..20 {
            explorer.handle_key(KeyCode::Char('+'));
        }
        assert_eq!(explorer.steps_per_tick, MAX_STEPS_PER_TICK);
    }

    #[test]
    fn test_finish_and_quit() {
        let mut explorer = cave_explorer(4);
        explorer.handle_key(KeyCode::Char('f'));
        assert!(explorer.generator.is_finished());
        assert_eq!(explorer.handle_key(KeyCode::Char('q')), Action::Quit);
        let cave = explorer.generator.finish();
        assert_eq!(cave.iterations, 4);
    }

    #[test]
    fn test_scroll_clamps_to_grid() {
        let mut explorer = cave_explorer(1);
        explorer.scroll(-5, -5);
        assert_eq!((explorer.scroll_x, explorer.scroll_y), (0, 0));
        explorer.scroll(100, 100);
        assert_eq!((explorer.scroll_x, explorer.scroll_y), (19, 11));
    }
}
