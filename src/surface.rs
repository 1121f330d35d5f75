//! UI binding layer
//!
//! The controller never touches widgets directly. It renders through a
//! [`ControlSurface`] and receives [`OptionChange`] events from it. Missing
//! render targets are the surface's business: a surface without a price
//! label simply ignores `render_total`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::catalog::GroupKind;
use crate::preview::Preview;
use crate::pricing::PriceBreakdown;
use crate::registry::OptionRegistry;

/// How long a notification stays visible
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// A control changed state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChange {
    pub group: String,
    pub value: String,
    /// Ignored for exclusive groups, where a change always means selection
    pub checked: bool,
}

impl OptionChange {
    pub fn checked(group: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            value: value.into(),
            checked: true,
        }
    }

    pub fn unchecked(group: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            value: value.into(),
            checked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub ttl: Duration,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            ttl: NOTIFICATION_TTL,
        }
    }
}

/// Everything the controller needs from the presentation layer
pub trait ControlSurface {
    fn render_total(&mut self, formatted: &str);
    fn render_breakdown(&mut self, breakdown: &PriceBreakdown);
    fn render_preview(&mut self, preview: &Preview);
    fn render_highlights(&mut self, features: &[String]);

    /// Uncheck every option control
    fn clear_controls(&mut self);

    /// Check the control for `group`/`value`. Returns false when no such
    /// control exists.
    fn check_control(&mut self, group: &str, value: &str) -> bool;

    /// Ask the user for a name; `None` when cancelled
    fn prompt_name(&mut self, message: &str) -> Option<String>;

    fn notify(&mut self, notification: Notification);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub group: String,
    pub value: String,
    pub kind: GroupKind,
    pub checked: bool,
}

/// In-memory surface that records what was rendered
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    controls: Vec<Control>,
    pub total: Option<String>,
    pub breakdown: Option<PriceBreakdown>,
    pub preview: Option<Preview>,
    pub highlights: Vec<String>,
    pub prompts: Vec<String>,
    answers: VecDeque<Option<String>>,
    notifications: Vec<(Notification, Instant)>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// One control per registry entry
    pub fn from_registry(registry: &OptionRegistry) -> Self {
        let controls = registry
            .entries()
            .map(|entry| Control {
                group: entry.group.clone(),
                value: entry.value.clone(),
                kind: entry.kind,
                checked: false,
            })
            .collect();
        Self {
            controls,
            ..Self::default()
        }
    }

    /// Queue the answer for the next `prompt_name`
    pub fn answer_prompt(&mut self, answer: Option<&str>) {
        self.answers.push_back(answer.map(str::to_string));
    }

    pub fn is_checked(&self, group: &str, value: &str) -> bool {
        self.controls
            .iter()
            .any(|c| c.group == group && c.value == value && c.checked)
    }

    pub fn checked(&self) -> Vec<(&str, &str)> {
        self.controls
            .iter()
            .filter(|c| c.checked)
            .map(|c| (c.group.as_str(), c.value.as_str()))
            .collect()
    }

    /// Toggle a control as a user would and return the resulting event
    ///
    /// Checking a radio unchecks its siblings. Unchecking a radio is not a
    /// user action, so it yields no event.
    pub fn toggle(&mut self, group: &str, value: &str, checked: bool) -> Option<OptionChange> {
        let idx = self
            .controls
            .iter()
            .position(|c| c.group == group && c.value == value)?;

        if self.controls[idx].kind == GroupKind::Exclusive {
            if !checked {
                return None;
            }
            for control in self.controls.iter_mut().filter(|c| c.group == group) {
                control.checked = false;
            }
        }
        self.controls[idx].checked = checked;

        Some(OptionChange {
            group: group.to_string(),
            value: value.to_string(),
            checked,
        })
    }

    /// Notifications still visible at `now`
    pub fn notifications_at(&self, now: Instant) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|(n, shown)| now.duration_since(*shown) < n.ttl)
            .map(|(n, _)| n)
            .collect()
    }

    pub fn notifications(&self) -> Vec<&Notification> {
        self.notifications_at(Instant::now())
    }

    /// Drop notifications whose time-to-live has passed
    pub fn dismiss_expired(&mut self, now: Instant) {
        self.notifications
            .retain(|(n, shown)| now.duration_since(*shown) < n.ttl);
    }
}

impl ControlSurface for HeadlessSurface {
    fn render_total(&mut self, formatted: &str) {
        self.total = Some(formatted.to_string());
    }

    fn render_breakdown(&mut self, breakdown: &PriceBreakdown) {
        self.breakdown = Some(breakdown.clone());
    }

    fn render_preview(&mut self, preview: &Preview) {
        self.preview = Some(preview.clone());
    }

    fn render_highlights(&mut self, features: &[String]) {
        self.highlights = features.to_vec();
    }

    fn clear_controls(&mut self) {
        for control in &mut self.controls {
            control.checked = false;
        }
    }

    fn check_control(&mut self, group: &str, value: &str) -> bool {
        match self
            .controls
            .iter_mut()
            .find(|c| c.group == group && c.value == value)
        {
            Some(control) => {
                control.checked = true;
                true
            }
            None => false,
        }
    }

    fn prompt_name(&mut self, message: &str) -> Option<String> {
        self.prompts.push(message.to_string());
        self.answers.pop_front().flatten()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push((notification, Instant::now()));
    }
}
