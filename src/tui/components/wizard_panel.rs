//! Keyboard driver and renderer for any [`WizardForm`]

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::tui::events::{schedule, AppEvent, EventSender, FormKind, Timer};
use crate::tui::ui::{field_line, key_hints, Styles};
use crate::wizard::{FieldKind, FieldSpec, Transition, Wizard, WizardForm};

/// What the host screen should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    None,
    /// Required fields missing
    Blocked,
    /// Back from the first step
    Leave,
    /// Submission delay started
    Started,
}

/// One focusable line of the current step
#[derive(Debug, Clone, Copy, PartialEq)]
enum InputRow {
    Text(FieldSpec),
    Choice(FieldSpec),
    Toggle(FieldSpec, usize),
}

pub struct WizardPanel<F: WizardForm> {
    pub wizard: Wizard<F>,
    kind: FormKind,
    title: &'static str,
    focus: usize,
    blocked: bool,
    timer: Timer,
}

impl<F: WizardForm> WizardPanel<F> {
    pub fn new(kind: FormKind, title: &'static str, form: F) -> Self {
        Self {
            wizard: Wizard::new(form),
            kind,
            title,
            focus: 0,
            blocked: false,
            timer: Timer::default(),
        }
    }

    pub fn set_title(&mut self, title: &'static str) {
        self.title = title;
    }

    /// Start over with `form`, dropping any pending submission
    pub fn reset(&mut self, form: F) {
        self.timer.cancel();
        self.wizard.reset(form);
        self.focus = 0;
        self.blocked = false;
    }

    pub fn is_submission_pending(&self) -> bool {
        self.timer.is_pending()
    }

    fn rows(&self) -> Vec<InputRow> {
        let form = self.wizard.form();
        let mut rows = Vec::new();
        for spec in form.fields(self.wizard.current_step()) {
            match spec.kind {
                FieldKind::Text => rows.push(InputRow::Text(spec)),
                FieldKind::Choice => rows.push(InputRow::Choice(spec)),
                FieldKind::MultiToggle => {
                    let count = form.toggle_options(spec.key).len();
                    rows.extend((0..count).map(|i| InputRow::Toggle(spec, i)));
                }
            }
        }
        rows
    }

    fn focused_row(&self) -> Option<InputRow> {
        self.rows().get(self.focus).copied()
    }

    /// Whether printable keys go into a text field
    pub fn captures_text(&self) -> bool {
        self.wizard.is_editable() && matches!(self.focused_row(), Some(InputRow::Text(_)))
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.rows().len();
        if count == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
    }

    fn clamp_focus(&mut self) {
        let count = self.rows().len();
        if self.focus >= count {
            self.focus = count.saturating_sub(1);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, events: &EventSender, delay: Duration) -> WizardOutcome {
        if !self.wizard.is_editable() {
            return WizardOutcome::None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
            KeyCode::Enter => return self.advance(events, delay),
            KeyCode::Esc => match self.wizard.back() {
                Transition::Leave => return WizardOutcome::Leave,
                Transition::Moved(_) => {
                    self.focus = 0;
                    self.blocked = false;
                }
                _ => {}
            },
            code => self.edit(code, key.modifiers),
        }
        WizardOutcome::None
    }

    fn advance(&mut self, events: &EventSender, delay: Duration) -> WizardOutcome {
        match self.wizard.advance() {
            Transition::Moved(_) => {
                self.focus = 0;
                self.blocked = false;
                WizardOutcome::None
            }
            Transition::Blocked => {
                self.blocked = true;
                WizardOutcome::Blocked
            }
            Transition::Submitting(ticket) => {
                self.blocked = false;
                self.timer.set(schedule(
                    events,
                    delay,
                    AppEvent::SubmitFinished {
                        form: self.kind,
                        ticket,
                    },
                ));
                WizardOutcome::Started
            }
            Transition::Leave | Transition::Ignored => WizardOutcome::None,
        }
    }

    fn edit(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let Some(row) = self.focused_row() else {
            return;
        };
        let Some(form) = self.wizard.form_mut() else {
            return;
        };
        match (row, code) {
            (InputRow::Text(spec), KeyCode::Char(c)) if !modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(value) = form.text_mut(spec.key) {
                    value.push(c);
                }
            }
            (InputRow::Text(spec), KeyCode::Backspace) => {
                if let Some(value) = form.text_mut(spec.key) {
                    value.pop();
                }
            }
            (InputRow::Choice(spec), KeyCode::Left) => form.cycle_choice(spec.key, false),
            (InputRow::Choice(spec), KeyCode::Right | KeyCode::Char(' ')) => {
                form.cycle_choice(spec.key, true)
            }
            (InputRow::Toggle(spec, index), KeyCode::Char(' ')) => form.toggle(spec.key, index),
            _ => return,
        }
        self.blocked = false;
        self.clamp_focus();
    }

    /// Completion of the submission `ticket`; false when stale
    pub fn finish(&mut self, ticket: u64) -> bool {
        self.wizard.complete(ticket)
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Styles::active_border());
        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.wizard.is_submitted() {
            self.render_confirmation(f, inner);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let step = self.wizard.current_step();
        let steps = self.wizard.step_count();
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("Step {} of {}", step, steps), Styles::title()),
                Span::raw(format!("  {}", self.wizard.step_title())),
            ])),
            chunks[0],
        );
        f.render_widget(
            Gauge::default()
                .gauge_style(Styles::info())
                .ratio(self.wizard.progress().clamp(0.0, 1.0))
                .label(format!("{}%", (self.wizard.progress() * 100.0).round())),
            chunks[1],
        );

        let mut lines = Vec::new();
        lines.push(Line::raw(""));
        for (i, row) in self.rows().into_iter().enumerate() {
            if let InputRow::Toggle(spec, 0) = row {
                let required = if spec.required { " *" } else { "" };
                lines.push(Line::styled(format!("  {}{}", spec.label, required), Styles::default()));
            }
            lines.push(self.row_line(row, i == self.focus));
        }
        if self.wizard.is_last_step() {
            lines.push(Line::raw(""));
            lines.push(Line::styled("Summary", Styles::header()));
            for (label, value) in self.wizard.form().summary() {
                lines.push(field_line(label, &value, 18));
            }
        }
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[2]);

        let footer = if self.wizard.is_submitting() {
            Line::styled("Submitting...", Styles::warning())
        } else if self.blocked {
            Line::styled("Please fill in all required fields", Styles::error())
        } else {
            let forward = if self.wizard.is_last_step() { "Submit" } else { "Next" };
            let mut line = key_hints(&[
                ("Enter", forward),
                ("Esc", "Back"),
                ("Tab", "Next field"),
                ("←/→", "Change option"),
                ("Space", "Toggle"),
            ]);
            if !self.wizard.can_advance() {
                line.spans[0].style = Styles::inactive();
            }
            line
        };
        f.render_widget(Paragraph::new(footer), chunks[3]);
    }

    fn row_line(&self, row: InputRow, focused: bool) -> Line<'static> {
        let form = self.wizard.form();
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused { Styles::title() } else { Styles::default() };
        let required = |spec: &FieldSpec| if spec.required { " *" } else { "" };

        match row {
            InputRow::Text(spec) => {
                let value = form.text(spec.key).unwrap_or("").to_string();
                let cursor = if focused { "▏" } else { "" };
                Line::from(vec![
                    Span::styled(format!("{}{}{}: ", marker, spec.label, required(&spec)), label_style),
                    Span::raw(format!("{}{}", value, cursor)),
                ])
            }
            InputRow::Choice(spec) => {
                let value = form
                    .choice_label(spec.key)
                    .unwrap_or_else(|| "Select...".to_string());
                Line::from(vec![
                    Span::styled(format!("{}{}{}: ", marker, spec.label, required(&spec)), label_style),
                    Span::styled(format!("‹ {} ›", value), Styles::info()),
                ])
            }
            InputRow::Toggle(spec, index) => {
                let options = form.toggle_options(spec.key);
                let (option, on) = options.get(index).copied().unwrap_or(("", false));
                let check = if on { "[x]" } else { "[ ]" };
                Line::styled(format!("{}  {} {}", marker, check, option), label_style)
            }
        }
    }

    fn render_confirmation(&self, f: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::styled("✓ Submitted successfully", Styles::success()),
            Line::raw(""),
        ];
        for (label, value) in self.wizard.form().summary() {
            lines.push(field_line(label, &value, 18));
        }
        lines.push(Line::raw(""));
        lines.push(key_hints(&[("Enter", "Done")]));
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{BookingForm, WizardState};
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(panel: &mut WizardPanel<BookingForm>, text: &str, events: &EventSender) {
        for c in text.chars() {
            panel.handle_key(key(KeyCode::Char(c)), events, Duration::ZERO);
        }
    }

    #[tokio::test]
    async fn test_keys_fill_and_advance_steps() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut panel = WizardPanel::new(FormKind::Booking, "Book a Service", BookingForm::default());
        let delay = Duration::from_millis(5);

        assert!(panel.captures_text());
        assert_eq!(panel.handle_key(key(KeyCode::Enter), &tx, delay), WizardOutcome::Blocked);

        type_text(&mut panel, "Budi", &tx);
        panel.handle_key(key(KeyCode::Tab), &tx, delay);
        type_text(&mut panel, "0812", &tx);
        assert_eq!(panel.handle_key(key(KeyCode::Enter), &tx, delay), WizardOutcome::None);
        assert_eq!(panel.wizard.state(), WizardState::Step(2));

        assert_eq!(panel.handle_key(key(KeyCode::Esc), &tx, delay), WizardOutcome::None);
        assert_eq!(panel.wizard.form().name, "Budi");
        assert_eq!(panel.handle_key(key(KeyCode::Esc), &tx, delay), WizardOutcome::Leave);
    }

    #[tokio::test]
    async fn test_submission_completes_through_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let form = BookingForm {
            name: "Budi".to_string(),
            phone: "0812".to_string(),
            vehicle_model: "Avanza".to_string(),
            date: "2024-02-01".to_string(),
            address: "Jl. Melati 5".to_string(),
            ..BookingForm::default()
        };
        let mut panel = WizardPanel::new(FormKind::Booking, "Book a Service", form);
        let delay = Duration::from_millis(5);
        for _ in 0..3 {
            panel.handle_key(key(KeyCode::Enter), &tx, delay);
        }
        assert_eq!(panel.wizard.current_step(), 4);

        // workshop location needs a workshop picked
        assert!(!panel.wizard.can_advance());
        panel.handle_key(key(KeyCode::Down), &tx, delay);
        panel.handle_key(key(KeyCode::Right), &tx, delay);
        assert_eq!(panel.handle_key(key(KeyCode::Enter), &tx, delay), WizardOutcome::Started);
        assert_eq!(panel.handle_key(key(KeyCode::Enter), &tx, delay), WizardOutcome::None);

        let Some(AppEvent::SubmitFinished { form, ticket }) = rx.recv().await else {
            panic!("expected a submit event");
        };
        assert_eq!(form, FormKind::Booking);
        assert!(panel.finish(ticket));
        assert!(!panel.finish(ticket));
        assert!(panel.wizard.is_submitted());
    }

    #[tokio::test]
    async fn test_reset_drops_pending_submission() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let form = BookingForm {
            name: "Budi".to_string(),
            phone: "0812".to_string(),
            vehicle_model: "Avanza".to_string(),
            date: "2024-02-01".to_string(),
            ..BookingForm::default()
        };
        let mut panel = WizardPanel::new(FormKind::Booking, "Book a Service", form);
        let delay = Duration::from_millis(20);
        for _ in 0..3 {
            panel.handle_key(key(KeyCode::Enter), &tx, delay);
        }
        panel.handle_key(key(KeyCode::Down), &tx, delay);
        panel.handle_key(key(KeyCode::Right), &tx, delay);
        assert_eq!(panel.handle_key(key(KeyCode::Enter), &tx, delay), WizardOutcome::Started);
        assert!(panel.is_submission_pending());
        panel.reset(BookingForm::default());
        assert!(!panel.is_submission_pending());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(panel.wizard.state(), WizardState::Step(1));
    }
}
