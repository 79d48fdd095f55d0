//! Progress reporting while an agent prepares an answer

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rag_application::ports::progress::ProgressNotifier;
use rag_domain::AgentDomain;
use std::sync::Mutex;
use std::time::Duration;

/// Spinner that follows retrieval, escalation and generation
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn set_message(&self, message: String) {
        if let Ok(guard) = self.spinner.lock()
            && let Some(pb) = guard.as_ref()
        {
            pb.set_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_retrieval_start(&self, domain: AgentDomain, collection: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(domain.to_string());
        pb.set_message(format!("Searching {}...", collection));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(pb);
        }
    }

    fn on_escalation(&self, tool: &str) {
        self.set_message(format!("Local results insufficient, calling {}...", tool));
    }

    fn on_retrieval_complete(&self, results: usize, degraded: bool) {
        let message = if degraded {
            format!("{} results ({})", results, "web unavailable".yellow())
        } else {
            format!("{} results", results)
        };
        self.set_message(message);
    }

    fn on_generation_start(&self) {
        self.set_message("Generating answer...".to_string());
    }

    fn on_complete(&self, success: bool) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            if success {
                pb.finish_and_clear();
            } else {
                pb.abandon_with_message(format!("{}", "failed".red()));
            }
        }
    }
}

/// Simple text-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_retrieval_start(&self, domain: AgentDomain, collection: &str) {
        eprintln!("{} {} searching {}", "->".cyan(), domain.as_str().bold(), collection);
    }

    fn on_escalation(&self, tool: &str) {
        eprintln!("  {} escalating to {}", "~".yellow(), tool);
    }

    fn on_retrieval_complete(&self, results: usize, degraded: bool) {
        if degraded {
            eprintln!("  {} {} results (web unavailable)", "!".yellow(), results);
        } else {
            eprintln!("  {} {} results", "v".green(), results);
        }
    }

    fn on_generation_start(&self) {
        eprintln!("  {} generating", "->".cyan());
    }

    fn on_complete(&self, success: bool) {
        if !success {
            eprintln!("  {} failed", "x".red());
        }
    }
}
