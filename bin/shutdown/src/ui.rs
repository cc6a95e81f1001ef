//! Operator-facing terminal output.
//!
//! Each phase prints a banner when it starts and a check mark or cross when it
//! ends. The structured log records the same events separately.

use std::time::Instant;
use tracing::{error, info};

pub fn warning(message: &str) {
    println!("⚠ {}", message);
}

/// A running phase or script, from banner to summary.
pub struct Step {
    label: &'static str,
    title: &'static str,
    started: Instant,
}

impl Step {
    pub fn start(label: &'static str, title: &'static str) -> Self {
        println!("\n▶ [{}] {}", label, title);
        info!(phase = label, "{}", title);
        Self {
            label,
            title,
            started: Instant::now(),
        }
    }

    /// Print the summary for `result` and pass it through.
    pub fn finish<T, E: std::fmt::Display>(self, result: Result<T, E>) -> Result<T, E> {
        let elapsed = self.started.elapsed();
        match &result {
            Ok(_) => {
                println!("✓ [{}] {} ({:.1?})", self.label, self.title, elapsed);
                info!(phase = self.label, elapsed = ?elapsed, "Phase completed");
            }
            Err(e) => {
                println!("✗ [{}] {}: {}", self.label, self.title, e);
                error!(phase = self.label, error = %e, "Phase failed");
            }
        }
        result
    }
}
