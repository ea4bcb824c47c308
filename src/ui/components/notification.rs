//! Notification/toast component for user feedback.
//!
//! Toasts are transient, auto-dismissing messages stacked in the bottom-right
//! corner. Each one runs through its own lifecycle:
//!
//! ```text
//! Entering --(enter delay)--> Visible --(deadline | close)--> Closing --(close animation)--> removed
//! ```
//!
//! The auto-dismiss deadline and a manual close are mutually exclusive ways
//! into `Closing`: a manual close clears the deadline, and a toast that is
//! already closing ignores further close requests. Removal hands the toast's
//! `on_complete` payload back to the owner exactly once.

use std::time::{Duration, Instant};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tracing::trace;

use crate::config::settings::DEFAULT_NOTIFICATION_DURATION_MS;

/// Delay between creation and the toast counting as visible.
const ENTER_DELAY: Duration = Duration::from_millis(10);

/// How long a closing toast lingers before it is purged.
const CLOSE_ANIMATION: Duration = Duration::from_millis(300);

/// The severity of a notification, which determines its appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational message (blue).
    Info,
    /// Success message (green).
    Success,
    /// Warning message (yellow).
    Warning,
    /// Error message (red).
    Error,
}

impl Severity {
    /// Get the icon for this severity.
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ",
            Severity::Success => "✓",
            Severity::Warning => "⚠",
            Severity::Error => "✗",
        }
    }

    /// Get the color for this severity.
    pub fn color(&self) -> Color {
        match self {
            Severity::Info => Color::Blue,
            Severity::Success => Color::Green,
            Severity::Warning => Color::Yellow,
            Severity::Error => Color::Red,
        }
    }
}

/// Identifier of a notification, unique within its manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

/// Lifecycle phase of a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Just created, not yet shown.
    Entering,
    /// Shown, auto-dismiss deadline pending.
    Visible,
    /// Dismissal in progress, deadline cancelled.
    Closing,
}

/// A single notification message.
#[derive(Debug, Clone)]
pub struct Notification<C> {
    id: NotificationId,
    message: String,
    severity: Severity,
    duration: Duration,
    created_at: Instant,
    phase: Phase,
    /// Auto-dismiss deadline; `None` once cancelled or fired.
    dismiss_at: Option<Instant>,
    /// When the toast entered `Closing`.
    closing_since: Option<Instant>,
    on_complete: Option<C>,
}

impl<C> Notification<C> {
    /// Get the identifier.
    pub fn id(&self) -> NotificationId {
        self.id
    }

    /// Get the message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the configured display duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Get the current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Start closing. Returns false if already closing.
    fn begin_close(&mut self, now: Instant) -> bool {
        if self.phase == Phase::Closing {
            return false;
        }
        self.phase = Phase::Closing;
        self.dismiss_at = None;
        self.closing_since = Some(now);
        true
    }
}

/// A notification that has been purged from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dismissed<C> {
    /// The purged notification's identifier.
    pub id: NotificationId,
    /// The completion payload, handed back exactly once.
    pub on_complete: Option<C>,
}

/// Manages the stack of active notifications.
///
/// `C` is the completion payload type: whatever the owner wants to run once a
/// toast is gone.
#[derive(Debug)]
pub struct NotificationManager<C = ()> {
    /// Active notifications in insertion (stacking) order.
    notifications: Vec<Notification<C>>,
    /// Next identifier to hand out.
    next_id: u64,
    /// Duration used by the convenience constructors.
    default_duration: Duration,
}

impl<C> Default for NotificationManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> NotificationManager<C> {
    /// Create a new notification manager with the default 2 second duration.
    pub fn new() -> Self {
        Self::with_default_duration(Duration::from_millis(DEFAULT_NOTIFICATION_DURATION_MS))
    }

    /// Create a notification manager with a custom default duration.
    pub fn with_default_duration(default_duration: Duration) -> Self {
        Self {
            notifications: Vec::new(),
            next_id: 0,
            default_duration,
        }
    }

    /// Show a notification and return its identifier.
    pub fn show(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
        on_complete: Option<C>,
    ) -> NotificationId {
        self.show_at(message, severity, duration, on_complete, Instant::now())
    }

    /// Show a notification created at the given instant.
    pub fn show_at(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
        on_complete: Option<C>,
        now: Instant,
    ) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;

        self.notifications.push(Notification {
            id,
            message: message.into(),
            severity,
            duration,
            created_at: now,
            phase: Phase::Entering,
            dismiss_at: Some(now + duration),
            closing_since: None,
            on_complete,
        });
        trace!(?id, ?severity, "Notification shown");
        id
    }

    /// Add an info notification with the default duration.
    pub fn info(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, Severity::Info, self.default_duration, None)
    }

    /// Add a success notification with the default duration.
    pub fn success(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, Severity::Success, self.default_duration, None)
    }

    /// Add a warning notification with the default duration.
    pub fn warning(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, Severity::Warning, self.default_duration, None)
    }

    /// Add an error notification with the default duration.
    pub fn error(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, Severity::Error, self.default_duration, None)
    }

    /// Get the duration used by the convenience constructors.
    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Remove a notification immediately, without running its lifecycle.
    ///
    /// Removing an absent identifier is a no-op. The completion payload is
    /// dropped.
    pub fn remove(&mut self, id: NotificationId) {
        self.notifications.retain(|n| n.id != id);
    }

    /// Request a manual close of a notification.
    ///
    /// Cancels its auto-dismiss deadline. Returns false if the notification
    /// does not exist or is already closing.
    pub fn close(&mut self, id: NotificationId) -> bool {
        self.close_at(id, Instant::now())
    }

    /// Request a manual close at the given instant.
    pub fn close_at(&mut self, id: NotificationId, now: Instant) -> bool {
        self.notifications
            .iter_mut()
            .find(|n| n.id == id)
            .map(|n| n.begin_close(now))
            .unwrap_or(false)
    }

    /// Close the most recently added notification that is not already closing.
    pub fn close_latest(&mut self) -> bool {
        let latest = self
            .notifications
            .iter()
            .rev()
            .find(|n| n.phase != Phase::Closing)
            .map(|n| n.id);
        latest.map(|id| self.close(id)).unwrap_or(false)
    }

    /// Advance every notification's lifecycle to now.
    ///
    /// This should be called on each tick.
    pub fn tick(&mut self) -> Vec<Dismissed<C>> {
        self.tick_at(Instant::now())
    }

    /// Advance every notification's lifecycle to the given instant.
    ///
    /// Returns the notifications purged by this call, in queue order.
    pub fn tick_at(&mut self, now: Instant) -> Vec<Dismissed<C>> {
        for n in &mut self.notifications {
            if n.phase == Phase::Entering && now >= n.created_at + ENTER_DELAY {
                n.phase = Phase::Visible;
            }
            if n.phase != Phase::Closing && n.dismiss_at.is_some_and(|at| now >= at) {
                n.begin_close(now);
            }
        }

        let mut dismissed = Vec::new();
        let mut i = 0;
        while i < self.notifications.len() {
            let done = self.notifications[i]
                .closing_since
                .is_some_and(|since| now >= since + CLOSE_ANIMATION);
            if done {
                let n = self.notifications.remove(i);
                trace!(id = ?n.id, "Notification removed");
                dismissed.push(Dismissed {
                    id: n.id,
                    on_complete: n.on_complete,
                });
            } else {
                i += 1;
            }
        }
        dismissed
    }

    /// Clear all notifications, dropping their completion payloads.
    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    /// Check if there are any notifications.
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Get the number of notifications.
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Look up a notification by identifier.
    pub fn get(&self, id: NotificationId) -> Option<&Notification<C>> {
        self.notifications.iter().find(|n| n.id == id)
    }

    /// Get an iterator over the notifications in stacking order.
    pub fn iter(&self) -> impl Iterator<Item = &Notification<C>> {
        self.notifications.iter()
    }

    /// Render all notifications in the bottom-right corner of the given area.
    ///
    /// The oldest sits at the bottom; newer toasts stack upwards.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let notification_width = 50.min(area.width.saturating_sub(4));
        // Borders (1 char each side) and icon prefix (icon + space)
        let inner_width = notification_width.saturating_sub(4) as usize;

        let shown: Vec<&Notification<C>> = self
            .notifications
            .iter()
            .rev()
            .filter(|n| n.phase != Phase::Entering)
            .collect();

        let heights: Vec<u16> = shown
            .iter()
            .map(|n| {
                let text_len = n.message.chars().count() + 2;
                let lines_needed = if inner_width > 0 {
                    text_len.div_ceil(inner_width) as u16
                } else {
                    1
                };
                lines_needed + 2
            })
            .collect();

        let total_height = heights
            .iter()
            .sum::<u16>()
            .min(area.height.saturating_sub(2));

        let x = area.x + area.width.saturating_sub(notification_width + 2);
        let y = area.y + area.height.saturating_sub(total_height + 1);
        let stack_area = Rect::new(x, y, notification_width, total_height);

        let constraints: Vec<Constraint> = heights.iter().map(|&h| Constraint::Length(h)).collect();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(stack_area);

        for (notification, chunk) in shown.iter().zip(chunks.iter()) {
            render_notification(notification, frame, *chunk);
        }
    }
}

/// Render a single notification.
fn render_notification<C>(notification: &Notification<C>, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let color = notification.severity.color();
    let style = if notification.phase == Phase::Closing {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(color)
    };

    let text = Line::from(vec![
        Span::styled(
            format!("{} ", notification.severity.icon()),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(notification.message.as_str(), style),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title_bottom(Line::from(" [x] Ctrl+X ").alignment(Alignment::Right));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_severity_icon_and_color() {
        assert_eq!(Severity::Success.icon(), "✓");
        assert_eq!(Severity::Error.color(), Color::Red);
        assert_eq!(Severity::Info.color(), Color::Blue);
    }

    #[test]
    fn test_show_returns_unique_ids_in_order() {
        let mut manager: NotificationManager = NotificationManager::new();
        let a = manager.info("a");
        let b = manager.info("b");
        assert_ne!(a, b);
        let messages: Vec<&str> = manager.iter().map(|n| n.message()).collect();
        assert_eq!(messages, vec!["a", "b"]);
    }

    #[test]
    fn test_default_duration() {
        let mut manager: NotificationManager = NotificationManager::new();
        let id = manager.success("Saved");
        assert_eq!(manager.get(id).unwrap().duration(), ms(2000));
        assert_eq!(manager.get(id).unwrap().phase(), Phase::Entering);
    }

    #[test]
    fn test_lifecycle_phases() {
        let t0 = Instant::now();
        let mut manager: NotificationManager = NotificationManager::new();
        let id = manager.show_at("hi", Severity::Info, ms(2000), None, t0);

        assert!(manager.tick_at(t0 + ms(20)).is_empty());
        assert_eq!(manager.get(id).unwrap().phase(), Phase::Visible);

        assert!(manager.tick_at(t0 + ms(1999)).is_empty());
        assert_eq!(manager.get(id).unwrap().phase(), Phase::Visible);

        assert!(manager.tick_at(t0 + ms(2000)).is_empty());
        assert_eq!(manager.get(id).unwrap().phase(), Phase::Closing);

        let dismissed = manager.tick_at(t0 + ms(2300));
        assert_eq!(dismissed.len(), 1);
        assert_eq!(dismissed[0].id, id);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_auto_dismiss_runs_completion_exactly_once() {
        let t0 = Instant::now();
        let mut manager = NotificationManager::new();
        manager.show_at("Logged in", Severity::Success, ms(2000), Some("go"), t0);

        let mut completions = Vec::new();
        for step in 0..=30 {
            for d in manager.tick_at(t0 + ms(step * 100)) {
                completions.extend(d.on_complete);
            }
        }
        assert_eq!(completions, vec!["go"]);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_not_removed_before_duration() {
        let t0 = Instant::now();
        let mut manager: NotificationManager = NotificationManager::new();
        manager.show_at("x", Severity::Info, ms(2000), None, t0);
        assert!(manager.tick_at(t0 + ms(1500)).is_empty());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_manual_close_cancels_timer() {
        let t0 = Instant::now();
        let mut manager = NotificationManager::new();
        let id = manager.show_at("x", Severity::Info, ms(2000), Some(7), t0);

        manager.tick_at(t0 + ms(50));
        assert!(manager.close_at(id, t0 + ms(500)));

        let mut completions = Vec::new();
        // Close animation finishes at 800ms; the original deadline at 2000ms is gone
        for step in 0..=40 {
            for d in manager.tick_at(t0 + ms(step * 100)) {
                completions.extend(d.on_complete);
            }
        }
        assert_eq!(completions, vec![7]);
    }

    #[test]
    fn test_manual_close_removes_after_animation() {
        let t0 = Instant::now();
        let mut manager: NotificationManager = NotificationManager::new();
        let id = manager.show_at("x", Severity::Info, ms(2000), None, t0);

        manager.close_at(id, t0 + ms(100));
        assert!(manager.tick_at(t0 + ms(399)).is_empty());
        assert_eq!(manager.tick_at(t0 + ms(400)).len(), 1);
    }

    #[test]
    fn test_close_twice_is_ignored() {
        let t0 = Instant::now();
        let mut manager: NotificationManager = NotificationManager::new();
        let id = manager.show_at("x", Severity::Info, ms(2000), None, t0);

        assert!(manager.close_at(id, t0 + ms(100)));
        assert!(!manager.close_at(id, t0 + ms(250)));
        // The second request did not restart the animation
        assert_eq!(manager.tick_at(t0 + ms(400)).len(), 1);
    }

    #[test]
    fn test_close_after_timer_fired_is_ignored() {
        let t0 = Instant::now();
        let mut manager: NotificationManager = NotificationManager::new();
        let id = manager.show_at("x", Severity::Info, ms(100), None, t0);

        manager.tick_at(t0 + ms(100));
        assert_eq!(manager.get(id).unwrap().phase(), Phase::Closing);
        assert!(!manager.close_at(id, t0 + ms(150)));
    }

    #[test]
    fn test_close_unknown_id() {
        let mut manager: NotificationManager = NotificationManager::new();
        let id = manager.info("x");
        manager.remove(id);
        assert!(!manager.close(id));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut manager: NotificationManager = NotificationManager::new();
        let a = manager.info("a");
        let b = manager.info("b");
        manager.remove(a);
        manager.remove(a);
        assert_eq!(manager.len(), 1);
        assert!(manager.get(b).is_some());
    }

    #[test]
    fn test_close_latest() {
        let t0 = Instant::now();
        let mut manager: NotificationManager = NotificationManager::new();
        let a = manager.show_at("a", Severity::Info, ms(5000), None, t0);
        let b = manager.show_at("b", Severity::Info, ms(5000), None, t0);

        assert!(manager.close_latest());
        assert_eq!(manager.get(b).unwrap().phase(), Phase::Closing);
        assert!(manager.close_latest());
        assert_eq!(manager.get(a).unwrap().phase(), Phase::Closing);
        assert!(!manager.close_latest());
    }

    #[test]
    fn test_independent_lifecycles() {
        let t0 = Instant::now();
        let mut manager: NotificationManager = NotificationManager::new();
        let short = manager.show_at("short", Severity::Info, ms(100), None, t0);
        let long = manager.show_at("long", Severity::Info, ms(5000), None, t0);

        let dismissed = manager.tick_at(t0 + ms(100));
        assert!(dismissed.is_empty());
        let dismissed = manager.tick_at(t0 + ms(400));
        assert_eq!(dismissed.iter().map(|d| d.id).collect::<Vec<_>>(), vec![short]);
        assert!(manager.get(long).is_some());
    }

    #[test]
    fn test_clear() {
        let mut manager: NotificationManager = NotificationManager::new();
        manager.info("Test");
        manager.clear();
        assert!(manager.is_empty());
    }
}
