//! Linear multi-step forms
//!
//! A [`Wizard`] walks a [`WizardForm`] through its steps. Every step edits
//! the same form value, so going back and forth never loses input. The
//! last step submits; the host runs the simulated delay and reports back
//! with [`Wizard::complete`].

pub mod booking;
pub mod workshop;

pub use booking::{BookingForm, ServiceLocation, ServiceType, VehicleType, WorkshopChoice};
pub use workshop::{City, WorkshopForm, WORKSHOP_SERVICE_OPTIONS};

/// How a field is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// One of a closed option list, cycled with left/right
    Choice,
    /// Any subset of a closed option list
    MultiToggle,
}

/// One input shown on a wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
            required: true,
        }
    }

    pub const fn choice(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Choice,
            required: true,
        }
    }

    pub const fn toggles(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::MultiToggle,
            required: true,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Shared state of a multi-step form
pub trait WizardForm {
    /// Step titles, one per step
    const STEPS: &'static [&'static str];

    /// Inputs of `step` (1-based); may depend on earlier choices
    fn fields(&self, step: usize) -> Vec<FieldSpec>;

    /// Whether the required fields of `step` are filled in
    fn step_complete(&self, step: usize) -> bool;

    fn text_mut(&mut self, _key: &str) -> Option<&mut String> {
        None
    }

    fn text(&self, _key: &str) -> Option<&str> {
        None
    }

    /// Display label of the selected option
    fn choice_label(&self, _key: &str) -> Option<String> {
        None
    }

    fn cycle_choice(&mut self, _key: &str, _forward: bool) {}

    /// Options of a toggle field with their on/off state
    fn toggle_options(&self, _key: &str) -> Vec<(&'static str, bool)> {
        Vec::new()
    }

    fn toggle(&mut self, _key: &str, _index: usize) {}

    /// Label/value pairs for the confirmation view
    fn summary(&self) -> Vec<(&'static str, String)>;
}

/// Where a wizard is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Step(usize),
    Submitting { ticket: u64 },
    Submitted,
}

/// Result of a wizard command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Moved to another step
    Moved(usize),
    /// Required fields are missing; nothing changed
    Blocked,
    /// Back from the first step; the host should navigate away
    Leave,
    /// Submission started; complete it with this ticket after the delay
    Submitting(u64),
    /// Command not valid in the current state
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Wizard<F: WizardForm> {
    form: F,
    state: WizardState,
    next_ticket: u64,
}

impl<F: WizardForm> Wizard<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            state: WizardState::Step(1),
            next_ticket: 1,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Mutable access to the form; `None` once submission has started
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self.state {
            WizardState::Step(_) => Some(&mut self.form),
            _ => None,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn step_count(&self) -> usize {
        F::STEPS.len()
    }

    /// Current step, or the last step while submitting or submitted
    pub fn current_step(&self) -> usize {
        match self.state {
            WizardState::Step(step) => step,
            _ => self.step_count(),
        }
    }

    pub fn step_title(&self) -> &'static str {
        F::STEPS
            .get(self.current_step().saturating_sub(1))
            .copied()
            .unwrap_or("")
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step() == self.step_count()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, WizardState::Submitting { .. })
    }

    /// Whether the form still accepts edits and step commands
    pub fn is_editable(&self) -> bool {
        matches!(self.state, WizardState::Step(_))
    }

    pub fn is_submitted(&self) -> bool {
        self.state == WizardState::Submitted
    }

    /// Whether the forward control of the current step is enabled
    pub fn can_advance(&self) -> bool {
        match self.state {
            WizardState::Step(step) => self.form.step_complete(step),
            _ => false,
        }
    }

    /// Completed share of the wizard, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        self.current_step() as f64 / self.step_count() as f64
    }

    pub fn next(&mut self) -> Transition {
        let WizardState::Step(step) = self.state else {
            return Transition::Ignored;
        };
        if step >= self.step_count() {
            return Transition::Ignored;
        }
        if !self.form.step_complete(step) {
            return Transition::Blocked;
        }
        self.state = WizardState::Step(step + 1);
        Transition::Moved(step + 1)
    }

    pub fn back(&mut self) -> Transition {
        match self.state {
            WizardState::Step(1) => Transition::Leave,
            WizardState::Step(step) => {
                self.state = WizardState::Step(step - 1);
                Transition::Moved(step - 1)
            }
            _ => Transition::Ignored,
        }
    }

    /// Forward control: next on inner steps, submit on the last one
    pub fn advance(&mut self) -> Transition {
        if self.is_last_step() {
            self.submit()
        } else {
            self.next()
        }
    }

    pub fn submit(&mut self) -> Transition {
        let WizardState::Step(step) = self.state else {
            return Transition::Ignored;
        };
        if step != self.step_count() {
            return Transition::Ignored;
        }
        if !self.form.step_complete(step) {
            return Transition::Blocked;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.state = WizardState::Submitting { ticket };
        Transition::Submitting(ticket)
    }

    /// Finishes the submission identified by `ticket`. Returns false for a
    /// stale or repeated completion, which leaves the state untouched.
    pub fn complete(&mut self, ticket: u64) -> bool {
        match self.state {
            WizardState::Submitting { ticket: pending } if pending == ticket => {
                self.state = WizardState::Submitted;
                true
            }
            _ => false,
        }
    }

    /// Starts over with a fresh form; pending tickets become stale
    pub fn reset(&mut self, form: F) {
        self.form = form;
        self.state = WizardState::Step(1);
    }
}

/// Next or previous entry of `options` after `current`, wrapping around
pub fn cycle<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let Some(pos) = options.iter().position(|o| *o == current) else {
        return options.first().copied().unwrap_or(current);
    };
    let len = options.len();
    let next = if forward {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    };
    options[next]
}

/// Non-blank check used by required text fields
pub(crate) fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}
