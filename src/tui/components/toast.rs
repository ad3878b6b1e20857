//! Toast messages drawn over the top-right corner

use std::time::Duration;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::events::{schedule, AppEvent, EventSender, Timer};
use crate::tui::ui::{top_right_rect, Styles};

/// Most toasts shown at once
const MAX_VISIBLE: usize = 3;
const TOAST_WIDTH: u16 = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

impl ToastKind {
    fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Info => "i",
            ToastKind::Error => "✗",
        }
    }
}

#[derive(Debug)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    timer: Timer,
}

/// Live toasts, oldest first. Each holds its own expiry timer.
#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
    next_id: u64,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast that expires after `lifetime`
    pub fn push(&mut self, kind: ToastKind, message: String, events: &EventSender, lifetime: Duration) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let mut timer = Timer::default();
        timer.set(schedule(events, lifetime, AppEvent::ToastExpired(id)));
        self.items.push(Toast {
            id,
            kind,
            message,
            timer,
        });
        id
    }

    /// Remove a toast; unknown ids are ignored
    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let visible = self.items.iter().rev().take(MAX_VISIBLE);
        let mut y = area.y + 1;
        for toast in visible {
            let slot = top_right_rect(TOAST_WIDTH, 3, Rect::new(area.x, y, area.width.saturating_sub(1), 3));
            if slot.bottom() > area.bottom() {
                break;
            }
            let style = match toast.kind {
                ToastKind::Success => Styles::success(),
                ToastKind::Info => Styles::info(),
                ToastKind::Error => Styles::error(),
            };
            let text = Line::from(vec![
                Span::styled(format!("{} ", toast.kind.icon()), style),
                Span::raw(toast.message.clone()),
            ]);
            f.render_widget(Clear, slot);
            f.render_widget(
                Paragraph::new(text)
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL).border_style(style)),
                slot,
            );
            y += 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_toast_expires_through_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut toasts = Toasts::new();
        let id = toasts.push(
            ToastKind::Success,
            "Settings saved".to_string(),
            &tx,
            Duration::from_millis(5),
        );
        assert_eq!(toasts.items().len(), 1);
        assert_eq!(rx.recv().await, Some(AppEvent::ToastExpired(id)));
        toasts.dismiss(id);
        assert!(toasts.items().is_empty());
    }

    #[tokio::test]
    async fn test_dismissed_toast_timer_is_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut toasts = Toasts::new();
        let first = toasts.push(ToastKind::Info, "one".to_string(), &tx, Duration::from_millis(30));
        let second = toasts.push(ToastKind::Error, "two".to_string(), &tx, Duration::from_millis(5));
        assert_ne!(first, second);
        toasts.dismiss(first);
        assert_eq!(rx.recv().await, Some(AppEvent::ToastExpired(second)));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err());
    }
}
