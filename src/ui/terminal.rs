//! Terminal rendering of the dashboard.
//!
//! Every setter prints one line. The timer line is only printed on whole
//! minutes and during the last ten seconds to keep the output readable.

use std::io::Write;

use super::{Control, Controls, DashboardView};

/// Dashboard that writes to stdout.
#[derive(Debug, Default)]
pub struct TerminalDashboard {
    last_status: String,
}

impl TerminalDashboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints the command help shown when the dashboard starts.
    pub fn show_banner(&self, username: &str) {
        println!("Focus Dashboard ({})", username);
        println!("─────────────────────────────");
        println!("Commands: start | stop | reset | quit");
    }

    fn render_control(control: &Control) -> String {
        if control.enabled {
            format!("[{}]", control.label)
        } else {
            format!("({})", control.label)
        }
    }

    fn should_print_timer(text: &str) -> bool {
        match text.split_once(':') {
            Some((minutes, seconds)) => seconds == "00" || (minutes == "00" && seconds < "10"),
            None => true,
        }
    }
}

impl DashboardView for TerminalDashboard {
    fn set_timer_text(&mut self, text: &str) {
        if Self::should_print_timer(text) {
            println!("Time remaining: {}", text);
        }
    }

    fn set_status(&mut self, label: &str, _class: &str) {
        // The poller republishes every second; only print changes
        if self.last_status != label {
            println!("{}", label);
            self.last_status = label.to_string();
        }
    }

    fn set_focus_score_text(&mut self, text: &str) {
        tracing::debug!("{}", text);
    }

    fn set_controls(&mut self, controls: Controls) {
        println!(
            "{} {} {}",
            Self::render_control(&controls.start),
            Self::render_control(&controls.stop),
            Self::render_control(&controls.reset)
        );
    }

    fn set_video_source(&mut self, url: Option<&str>) {
        match url {
            Some(url) => println!("Video feed: {}", url),
            None => println!("Video feed: off"),
        }
    }

    fn alert(&mut self, message: &str) {
        // Terminal bell, then the message
        print!("\x07");
        let _ = std::io::stdout().flush();
        println!("! {}", message);
    }
}
