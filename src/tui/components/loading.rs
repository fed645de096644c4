use crate::tui::{Action, Component, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph},
};
use std::time::{Duration, Instant};
use tracing::trace;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(300);
/// Simulated progress never passes this until the request completes
pub const PROGRESS_CAP: f64 = 90.0;
/// Time the full bar stays on screen after completion
pub const COMPLETE_LINGER: Duration = Duration::from_millis(300);

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Supplies the increment of each simulated progress step
pub trait ProgressSource: Send {
    fn next_increment(&mut self) -> f64;
}

/// Random step in `[0, 5)` percent
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIncrement;

impl ProgressSource for RandomIncrement {
    fn next_increment(&mut self) -> f64 {
        rand::random::<f64>() * 5.0
    }
}

/// Constant step, for deterministic progress
#[derive(Debug, Clone, Copy)]
pub struct FixedIncrement(pub f64);

impl ProgressSource for FixedIncrement {
    fn next_increment(&mut self) -> f64 {
        self.0
    }
}

/// Repeating task that creeps a percentage towards [`PROGRESS_CAP`]
pub struct SimulatedProgress {
    percent: f64,
    interval: Duration,
    next_step: Option<Instant>,
    source: Box<dyn ProgressSource>,
}

impl std::fmt::Debug for SimulatedProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedProgress")
            .field("percent", &self.percent)
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl SimulatedProgress {
    pub fn new(interval: Duration, source: Box<dyn ProgressSource>) -> Self {
        Self {
            percent: 0.0,
            interval,
            next_step: None,
            source,
        }
    }

    /// Restart from zero; the first step lands one interval after `now`
    pub fn start(&mut self, now: Instant) {
        self.percent = 0.0;
        self.next_step = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_step = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_step.is_some()
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Apply every step due by `now`; stops once the cap is reached
    pub fn tick(&mut self, now: Instant) {
        while let Some(due) = self.next_step {
            if now < due {
                break;
            }
            self.percent = (self.percent + self.source.next_increment()).min(PROGRESS_CAP);
            trace!(percent = self.percent, "progress step");
            if self.percent >= PROGRESS_CAP {
                self.next_step = None;
            } else {
                self.next_step = Some(due + self.interval);
            }
        }
    }

    /// Stop stepping and jump to 100%
    pub fn complete(&mut self) {
        self.next_step = None;
        self.percent = 100.0;
    }
}

/// Full-screen overlay shown while a request is outstanding
#[derive(Debug)]
pub struct LoadingOverlay {
    message: Option<String>,
    with_progress: bool,
    progress: SimulatedProgress,
    hide_at: Option<Instant>,
    frame: usize,
    supported_actions: Vec<Action>,
}

impl LoadingOverlay {
    pub fn new(interval: Duration) -> Self {
        Self::with_source(interval, Box::new(RandomIncrement))
    }

    pub fn with_source(interval: Duration, source: Box<dyn ProgressSource>) -> Self {
        Self {
            message: None,
            with_progress: false,
            progress: SimulatedProgress::new(interval, source),
            hide_at: None,
            frame: 0,
            supported_actions: Vec::new(),
        }
    }

    pub fn show(&mut self, message: impl Into<String>, with_progress: bool, now: Instant) {
        self.message = Some(message.into());
        self.with_progress = with_progress;
        self.hide_at = None;
        if with_progress {
            self.progress.start(now);
        } else {
            self.progress.cancel();
        }
    }

    /// The request finished
    ///
    /// With a progress bar the bar snaps to 100% and the overlay hides after
    /// [`COMPLETE_LINGER`]; without one it hides at once.
    pub fn complete(&mut self, now: Instant) {
        if self.message.is_none() {
            return;
        }
        if self.with_progress {
            self.progress.complete();
            self.hide_at = Some(now + COMPLETE_LINGER);
        } else {
            self.hide();
        }
    }

    pub fn hide(&mut self) {
        self.message = None;
        self.hide_at = None;
        self.progress.cancel();
    }

    pub fn tick(&mut self, now: Instant) {
        if self.message.is_none() {
            return;
        }
        self.frame = self.frame.wrapping_add(1);
        if matches!(self.hide_at, Some(at) if now >= at) {
            self.hide();
            return;
        }
        self.progress.tick(now);
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn percent(&self) -> Option<f64> {
        (self.is_visible() && self.with_progress).then(|| self.progress.percent())
    }
}

impl Component for LoadingOverlay {
    fn handle_action(&mut self, _action: Action) -> Result<bool> {
        // Swallow input while visible
        Ok(self.is_visible())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(message) = &self.message else {
            return;
        };
        let height = if self.with_progress { 6 } else { 4 };
        let width = area.width.clamp(20, 56);
        let overlay = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width: width.min(area.width),
            height: height.min(area.height),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.focused_border_style());
        let inner = block.inner(overlay);
        frame.render_widget(Clear, overlay);
        frame.render_widget(block, overlay);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        let spinner = SPINNER[self.frame % SPINNER.len()];
        let text = Line::from(format!("{spinner} {message}")).style(theme.normal_style());
        frame.render_widget(Paragraph::new(text).centered(), chunks[0]);

        if let Some(percent) = self.percent() {
            let gauge = Gauge::default()
                .gauge_style(theme.info_style().add_modifier(Modifier::BOLD))
                .ratio((percent / 100.0).clamp(0.0, 1.0))
                .label(format!("{percent:.0}%"));
            frame.render_widget(gauge, chunks[1]);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "Loading"
    }

    fn update(&mut self, now: Instant) -> Result<()> {
        self.tick(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(300);

    fn overlay() -> LoadingOverlay {
        LoadingOverlay::with_source(STEP, Box::new(FixedIncrement(4.0)))
    }

    #[test]
    fn test_progress_steps_and_caps() {
        let start = Instant::now();
        let mut progress = SimulatedProgress::new(STEP, Box::new(FixedIncrement(4.0)));
        progress.start(start);
        progress.tick(start + Duration::from_millis(299));
        assert_eq!(progress.percent(), 0.0);
        progress.tick(start + STEP * 2);
        assert_eq!(progress.percent(), 8.0);
        progress.tick(start + STEP * 100);
        assert_eq!(progress.percent(), PROGRESS_CAP);
        assert!(!progress.is_running());
    }

    #[test]
    fn test_random_increment_range() {
        let mut source = RandomIncrement;
        for _ in 0..100 {
            let step = source.next_increment();
            assert!((0.0..5.0).contains(&step));
        }
    }

    #[test]
    fn test_complete_with_progress_lingers() {
        let start = Instant::now();
        let mut overlay = overlay();
        overlay.show("Processing file...", true, start);
        overlay.tick(start + STEP);
        assert_eq!(overlay.percent(), Some(4.0));

        overlay.complete(start + STEP);
        assert_eq!(overlay.percent(), Some(100.0));
        overlay.tick(start + STEP + Duration::from_millis(299));
        assert!(overlay.is_visible());
        overlay.tick(start + STEP + COMPLETE_LINGER);
        assert!(!overlay.is_visible());
    }

    #[test]
    fn test_complete_without_progress_hides_immediately() {
        let now = Instant::now();
        let mut overlay = overlay();
        overlay.show("Removing contaminants...", false, now);
        assert_eq!(overlay.percent(), None);
        assert_eq!(overlay.message(), Some("Removing contaminants..."));
        overlay.complete(now);
        assert!(!overlay.is_visible());
    }

    #[test]
    fn test_swallows_actions_only_while_visible() {
        let mut overlay = overlay();
        assert!(!overlay.handle_action(Action::Quit).unwrap());
        overlay.show("Loading example data...", true, Instant::now());
        assert!(overlay.handle_action(Action::NextPage).unwrap());
    }
}
