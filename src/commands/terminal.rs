use car_configurator::{
    preview::Preview,
    pricing::PriceBreakdown,
    registry::OptionRegistry,
    surface::{ControlSurface, Notification, NotificationLevel},
};
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Console rendering of a configurator session
///
/// Renders are buffered and printed once by [`TerminalSurface::print_summary`];
/// notifications go out immediately.
pub struct TerminalSurface {
    controls: Vec<(String, String, bool)>,
    preset_name: Option<String>,
    total: Option<String>,
    breakdown: Option<PriceBreakdown>,
    preview: Option<Preview>,
    highlights: Vec<String>,
}

impl TerminalSurface {
    pub fn new(registry: &OptionRegistry) -> Self {
        Self {
            controls: registry
                .entries()
                .map(|e| (e.group.clone(), e.value.clone(), false))
                .collect(),
            preset_name: None,
            total: None,
            breakdown: None,
            preview: None,
            highlights: Vec::new(),
        }
    }

    /// Answer the next name prompt without reading stdin
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.preset_name = name;
        self
    }

    pub fn print_summary(&self) {
        if let Some(breakdown) = &self.breakdown {
            println!("{}", "Price Breakdown:".bold());
            for (label, price) in breakdown.lines() {
                println!("  {:<40} {:>12}", label, price);
            }
            println!();
        }

        if let Some(total) = &self.total {
            println!("{} {}", "Total:".bold(), total.green().bold());
        }

        if let Some(preview) = &self.preview {
            let note = if preview.fallback { " (default image)" } else { "" };
            println!("{} {}{}", "Preview:".cyan(), preview.src, note.dimmed());
        }

        if !self.highlights.is_empty() {
            println!("{} {}", "Features:".cyan(), self.highlights.join(", "));
        }
    }
}

impl ControlSurface for TerminalSurface {
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
            control.2 = false;
        }
    }

    fn check_control(&mut self, group: &str, value: &str) -> bool {
        match self
            .controls
            .iter_mut()
            .find(|(g, v, _)| g == group && v == value)
        {
            Some(control) => {
                control.2 = true;
                true
            }
            None => false,
        }
    }

    fn prompt_name(&mut self, message: &str) -> Option<String> {
        if let Some(name) = self.preset_name.take() {
            return Some(name);
        }

        print!("{} ", message);
        io::stdout().flush().ok()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn notify(&mut self, notification: Notification) {
        let line = match notification.level {
            NotificationLevel::Success => format!("✓ {}", notification.message).green(),
            NotificationLevel::Error => format!("✗ {}", notification.message).red(),
            NotificationLevel::Info => notification.message.blue(),
        };
        println!("{}", line);
    }
}
