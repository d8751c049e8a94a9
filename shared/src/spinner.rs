//! Widget state for a numeric spinner.
//!
//! `Spinner` is the whole widget minus the DOM: the committed value, the text
//! being typed, the options and the repeat controller. Events go in through
//! [`Spinner::update`], which returns the notifications and timer work the
//! host has to perform. [`Spinner::display`] renders the field text.

use rust_decimal::Decimal;

use crate::options::{Constraints, RepeatTiming, SpinnerOptions};
use crate::repeat::{RepeatController, RepeatEffect, RepeatState};
use crate::value::{self, Direction};

/// Keys the spinner reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "Enter" => Key::Enter,
            _ => Key::Other,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Key::ArrowUp => Some(Direction::Increment),
            Key::ArrowDown => Some(Direction::Decrement),
            _ => None,
        }
    }
}

/// What started the running gesture. Only the matching release ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSource {
    Pointer,
    Keyboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Focus,
    Input(String),
    Blur,
    /// Enter pressed in the field.
    Commit,
    Press(Direction),
    Release,
    KeyDown(Key),
    KeyUp(Key),
    DelayElapsed,
    Tick,
    /// The controlling value changed outside the widget.
    External(Decimal),
    SetDisabled(bool),
    /// The caller's bounds, step or formatting changed.
    SetConstraints(Constraints),
    SetTiming(RepeatTiming),
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// The committed value moved. A step clamped at a bound emits nothing.
    Changed(Decimal),
    Settled(Decimal),
    Focused(Decimal),
    ArmDelay(u32),
    StartInterval(u32),
    CancelTimers,
}

#[derive(Debug, Clone)]
pub struct Spinner {
    value: Decimal,
    entered_text: Option<String>,
    options: SpinnerOptions,
    repeat: RepeatController,
    source: Option<GestureSource>,
}

impl Spinner {
    pub fn new(value: Decimal, options: SpinnerOptions) -> Self {
        let options = options.validated();
        let value = value::clamp(value, &options.constraints);
        let repeat = RepeatController::new(options.timing);
        Self {
            value,
            entered_text: None,
            options,
            repeat,
            source: None,
        }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn entered_text(&self) -> Option<&str> {
        self.entered_text.as_deref()
    }

    pub fn options(&self) -> &SpinnerOptions {
        &self.options
    }

    pub fn constraints(&self) -> &Constraints {
        &self.options.constraints
    }

    pub fn is_disabled(&self) -> bool {
        self.options.disabled
    }

    pub fn repeat_state(&self) -> RepeatState {
        self.repeat.state()
    }

    pub fn gesture_source(&self) -> Option<GestureSource> {
        self.source
    }

    /// Text shown in the field: the entry verbatim while typing, otherwise the
    /// formatted committed value.
    pub fn display(&self) -> String {
        match &self.entered_text {
            Some(text) => text.clone(),
            None => value::format(self.value, &self.options.constraints),
        }
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Command> {
        let mut commands = Vec::new();
        let disabled = self.options.disabled;

        match msg {
            Msg::Focus if !disabled => commands.push(Command::Focused(self.value)),
            Msg::Input(text) if !disabled => self.entered_text = Some(text),
            Msg::Blur => {
                self.commit_entered(&mut commands);
                // a running gesture settles on release
                if !self.repeat.is_active() {
                    commands.push(Command::Settled(self.value));
                }
            }
            Msg::Commit if !disabled => self.commit_entered(&mut commands),
            Msg::Press(direction) if !disabled => {
                self.start(direction, GestureSource::Pointer, &mut commands)
            }
            Msg::KeyDown(key) if !disabled => match key.direction() {
                Some(direction) => self.start(direction, GestureSource::Keyboard, &mut commands),
                None if key == Key::Enter => self.commit_entered(&mut commands),
                None => {}
            },
            Msg::Release => {
                if self.source == Some(GestureSource::Pointer) {
                    self.stop(&mut commands);
                }
            }
            Msg::KeyUp(key) => {
                let releases_hold = self.source == Some(GestureSource::Keyboard)
                    && key.direction().is_some()
                    && key.direction() == self.repeat.direction();
                if releases_hold {
                    self.stop(&mut commands);
                }
            }
            Msg::DelayElapsed => {
                let effects = self.repeat.delay_elapsed();
                self.apply(effects, &mut commands);
            }
            Msg::Tick => {
                let effects = self.repeat.tick();
                self.apply(effects, &mut commands);
            }
            Msg::External(value) => self.set_external(value, &mut commands),
            Msg::SetDisabled(disabled) => {
                self.options.disabled = disabled;
                if disabled {
                    self.entered_text = None;
                    self.stop(&mut commands);
                }
            }
            Msg::SetConstraints(constraints) => self.set_constraints(constraints, &mut commands),
            Msg::SetTiming(timing) => {
                self.options.timing = timing;
                self.repeat.set_timing(timing);
            }
            Msg::Teardown => {
                self.source = None;
                let effects = self.repeat.cancel();
                self.apply(effects, &mut commands);
            }
            ignored @ (Msg::Focus
            | Msg::Input(_)
            | Msg::Commit
            | Msg::Press(_)
            | Msg::KeyDown(_)) => {
                log::debug!("spinner is disabled, ignoring {:?}", ignored);
            }
        }

        commands
    }

    fn start(
        &mut self,
        direction: Direction,
        source: GestureSource,
        commands: &mut Vec<Command>,
    ) {
        if self.repeat.is_active() {
            return;
        }
        self.commit_entered(commands);
        self.source = Some(source);
        let effects = self.repeat.start(direction);
        self.apply(effects, commands);
    }

    fn stop(&mut self, commands: &mut Vec<Command>) {
        self.source = None;
        let effects = self.repeat.stop();
        self.apply(effects, commands);
    }

    fn commit_entered(&mut self, commands: &mut Vec<Command>) {
        let Some(text) = self.entered_text.take() else {
            return;
        };
        match value::parse(&text) {
            Ok(parsed) => {
                self.value = value::clamp(parsed, &self.options.constraints);
                commands.push(Command::Changed(self.value));
            }
            Err(err) => log::debug!("discarding entry: {}", err),
        }
    }

    fn set_external(&mut self, value: Decimal, commands: &mut Vec<Command>) {
        if value == self.value {
            return;
        }
        let clamped = value::clamp(value, &self.options.constraints);
        self.entered_text = None;
        self.value = clamped;
        if clamped != value {
            commands.push(Command::Changed(clamped));
        }
    }

    /// Swap in new constraints and re-clamp the committed value. A pending
    /// entry is left alone and is clamped against the new bounds on commit.
    fn set_constraints(&mut self, constraints: Constraints, commands: &mut Vec<Command>) {
        let constraints = constraints.validated();
        if constraints == self.options.constraints {
            return;
        }
        log::debug!("constraints changed: {:?}", constraints);
        self.options.constraints = constraints;
        let clamped = value::clamp(self.value, &self.options.constraints);
        if clamped != self.value {
            self.value = clamped;
            commands.push(Command::Changed(clamped));
        }
    }

    fn apply(&mut self, effects: Vec<RepeatEffect>, commands: &mut Vec<Command>) {
        for effect in effects {
            match effect {
                RepeatEffect::Step(direction) => {
                    let next = value::step(self.value, direction, &self.options.constraints);
                    if next != self.value {
                        self.value = next;
                        commands.push(Command::Changed(next));
                    }
                }
                RepeatEffect::ArmDelay(ms) => commands.push(Command::ArmDelay(ms)),
                RepeatEffect::StartInterval(ms) => commands.push(Command::StartInterval(ms)),
                RepeatEffect::CancelTimers => commands.push(Command::CancelTimers),
                RepeatEffect::Settle => commands.push(Command::Settled(self.value)),
            }
        }
    }
}
