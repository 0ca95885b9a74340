//! Operator-facing progress lines for a restart cycle.

use podcycle_domain::CycleEvent;
use podcycle_ports::ProgressPort;

/// Prints each cycle event to stdout as it happens.
#[derive(Clone, Copy, Default)]
pub struct TerminalProgressPort;

impl ProgressPort for TerminalProgressPort {
    fn publish(&self, event: CycleEvent) {
        if let Some(text) = render_event(&event) {
            println!("{text}");
        }
    }
}

pub fn render_event(event: &CycleEvent) -> Option<String> {
    let text = match event {
        CycleEvent::CandidatesSelected { candidates } if candidates.is_empty() => {
            "No restartable pods found".to_string()
        }
        CycleEvent::CandidatesSelected { candidates } => {
            let mut lines = vec![
                format!(
                    "Found {} restartable pods (excluding protected namespaces)",
                    candidates.len()
                ),
                String::new(),
                "Pods to be restarted:".to_string(),
            ];
            lines.extend(candidates.iter().enumerate().map(|(i, pod)| {
                format!("  {}. {} ({})", i + 1, pod.key, pod.phase.as_str())
            }));
            lines.join("\n")
        }
        CycleEvent::AwaitingConfirmation { count, delay_secs } => format!(
            "\nAbout to restart {count} pods sequentially\n\
             Press Ctrl+C to cancel or wait {delay_secs} seconds to proceed..."
        ),
        CycleEvent::Aborted => "\nOperation cancelled by user".to_string(),
        CycleEvent::CandidateStarted {
            position: 1,
            total,
            key,
        } => format!(
            "\nStarting sequential pod restart. Ctrl+C no longer cancels; \
             the remaining pods will be processed.\n\
             {}\n\n[1/{total}] Processing pod: {key}",
            "=".repeat(60)
        ),
        CycleEvent::CandidateStarted {
            position,
            total,
            key,
        } => format!("\n[{position}/{total}] Processing pod: {key}"),
        CycleEvent::Evicted { key } => format!("    Pod {} deleted", key.name),
        CycleEvent::EvictionFailed { key, error } => {
            format!("    Error restarting pod {}: {error}", key.name)
        }
        CycleEvent::AwaitingReplacement { key } => {
            format!("    Waiting for a ready replacement of {}...", key.name)
        }
        CycleEvent::OutcomeRecorded { outcome } if outcome.success => {
            match &outcome.replacement {
                Some(replacement) => format!(
                    "    Successfully restarted pod {} (replaced by {})",
                    outcome.key.name, replacement.name
                ),
                None => format!("    Successfully restarted pod {}", outcome.key.name),
            }
        }
        CycleEvent::OutcomeRecorded { outcome } => format!(
            "    Failed to restart pod {}: {}",
            outcome.key.name,
            outcome.reason.as_deref().unwrap_or("unknown reason")
        ),
        CycleEvent::CoolingDown { secs } => {
            format!("    Waiting {secs} seconds before next pod...")
        }
        CycleEvent::Finished { .. } => return None,
    };
    Some(text)
}
