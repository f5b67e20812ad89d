//! Active rule set: which grammar contexts examine code lines.
//!
//! Every context kind is either inactive or active. Kinds are independent of
//! each other, so a countdown context can run inside a block. Re-activating an
//! active kind or closing an inactive one is an error.

use std::fmt;

use crate::error::ErrorKind;
use crate::parser::directive::{Action, Directive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Macro,
    Function,
    Struct,
    Enum,
    Color,
    Callback,
    NameAlias,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextKind::Macro => "define",
            ContextKind::Function => "functions",
            ContextKind::Struct => "struct",
            ContextKind::Enum => "enum",
            ContextKind::Color => "color_defines",
            ContextKind::Callback => "callback_notation",
            ContextKind::NameAlias => "define_name_alias",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveContext {
    kind: ContextKind,
    /// Matches left before a countdown context closes itself.
    remaining: Option<u32>,
    opened_at: usize,
}

/// Outcome of applying a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened(ContextKind),
    Closed(ContextKind),
}

#[derive(Debug, Default)]
pub struct RuleSet {
    /// Activation order, which is also the order contexts see a line in.
    active: Vec<ActiveContext>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, kind: ContextKind) -> bool {
        self.active.iter().any(|c| c.kind == kind)
    }

    /// Snapshot of active kinds in activation order.
    pub fn active_kinds(&self) -> Vec<ContextKind> {
        self.active.iter().map(|c| c.kind).collect()
    }

    pub fn apply(&mut self, directive: &Directive, line: usize) -> Result<Transition, ErrorKind> {
        let (kind, action) = directive.command.transition();
        match action {
            Action::Begin | Action::Countdown => {
                if self.is_active(kind) {
                    return Err(ErrorKind::OverlappedBlock(kind));
                }
                let remaining = match action {
                    Action::Countdown => directive.count,
                    _ => None,
                };
                self.active.push(ActiveContext {
                    kind,
                    remaining,
                    opened_at: line,
                });
                Ok(Transition::Opened(kind))
            }
            Action::End => {
                let pos = self
                    .active
                    .iter()
                    .position(|c| c.kind == kind && c.remaining.is_none())
                    .ok_or(ErrorKind::UnmatchedEnd(kind))?;
                self.active.remove(pos);
                Ok(Transition::Closed(kind))
            }
        }
    }

    /// Record one successful match for `kind`. Returns true when a countdown
    /// context just ran out and was deactivated.
    pub fn consume(&mut self, kind: ContextKind) -> bool {
        let Some(pos) = self.active.iter().position(|c| c.kind == kind) else {
            return false;
        };
        let Some(remaining) = self.active[pos].remaining.as_mut() else {
            return false;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.active.remove(pos);
            true
        } else {
            false
        }
    }

    /// Check that nothing is left open at end of input.
    pub fn finish(&self) -> Result<(), (usize, ErrorKind)> {
        match self.active.first() {
            None => Ok(()),
            Some(ctx) => match ctx.remaining {
                Some(remaining) => Err((
                    ctx.opened_at,
                    ErrorKind::UnfinishedCountdown {
                        context: ctx.kind,
                        remaining,
                    },
                )),
                None => Err((ctx.opened_at, ErrorKind::UnclosedBlock(ctx.kind))),
            },
        }
    }
}
