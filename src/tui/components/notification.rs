use crate::core::{Notification, Severity};
use crate::tui::{Action, Component, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Holds at most one visible notification with an auto-hide deadline
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    current: Option<(Notification, Instant)>,
    timeout: Duration,
    supported_actions: Vec<Action>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TIMEOUT)
    }
}

impl NotificationCenter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            current: None,
            timeout,
            supported_actions: vec![Action::Cancel],
        }
    }

    /// Replace any visible notification and restart the hide timer
    pub fn show(&mut self, notification: Notification, now: Instant) {
        debug!(severity = %notification.severity, message = %notification.message, "notification");
        self.current = Some((notification, now + self.timeout));
    }

    pub fn dismiss(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Hide the notification once its deadline has passed
    pub fn tick(&mut self, now: Instant) {
        if matches!(&self.current, Some((_, deadline)) if now >= *deadline) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref().map(|(n, _)| n)
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    /// Toast rectangle in the top-right corner of `area`
    fn toast_area(message: &str, area: Rect) -> Rect {
        let width = area.width.clamp(20, 50);
        let wrapped = textwrap::wrap(message, width.saturating_sub(6) as usize);
        let height = (wrapped.len() as u16 + 2).min(area.height);
        Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y: area.y + 1u16.min(area.height.saturating_sub(height)),
            width: width.min(area.width),
            height,
        }
    }
}

fn icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "✖",
        Severity::Warning => "!",
        Severity::Success => "✔",
    }
}

impl Component for NotificationCenter {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Cancel => Ok(self.dismiss()),
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(notification) = self.current() else {
            return;
        };
        let toast = Self::toast_area(&notification.message, area);
        let style = theme.severity_style(notification.severity);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(style);
        let inner = block.inner(toast);

        let wrapped = textwrap::wrap(&notification.message, inner.width.saturating_sub(3) as usize);
        let lines: Vec<Line> = wrapped
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let prefix = if i == 0 { icon(notification.severity) } else { " " };
                Line::from(vec![
                    Span::styled(format!("{prefix} "), style),
                    Span::styled(text.to_string(), theme.normal_style()),
                ])
            })
            .collect();

        frame.render_widget(Clear, toast);
        frame.render_widget(block, toast);
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "Notification"
    }

    fn update(&mut self, now: Instant) -> Result<()> {
        self.tick(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_auto_hide_after_timeout() {
        let start = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_secs(5));
        center.show(Notification::success("saved"), start);
        center.tick(start + Duration::from_millis(4999));
        assert!(center.is_visible());
        center.tick(start + Duration::from_secs(5));
        assert!(!center.is_visible());
    }

    #[test]
    fn test_new_notification_restarts_timer() {
        let start = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_secs(5));
        center.show(Notification::error("first"), start);
        center.show(Notification::warning("second"), start + Duration::from_secs(4));
        center.tick(start + Duration::from_secs(6));
        assert_eq!(center.current(), Some(&Notification::warning("second")));
    }

    #[test]
    fn test_cancel_dismisses() {
        let mut center = NotificationCenter::default();
        assert!(!center.handle_action(Action::Cancel).unwrap());
        center.show(Notification::error("boom"), Instant::now());
        assert!(center.handle_action(Action::Cancel).unwrap());
        assert!(center.current().is_none());
    }

    #[test]
    fn test_render_shows_message() {
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        let mut center = NotificationCenter::default();
        center.show(Notification::error("bad format"), Instant::now());
        terminal
            .draw(|frame| center.render(frame, frame.area(), &Theme::default()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("bad format"));
    }
}
