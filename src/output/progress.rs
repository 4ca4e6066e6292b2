use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_red, bright_yellow};
use crate::traversal::{Accumulator, TraversalEnd};

/// Spinner on stderr tracking how many records a walk has produced.
pub struct TraversalProgress {
    pb: ProgressBar,
}

impl TraversalProgress {
    pub fn start(branch: &str) -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Traversal").underlined());
        let pb = create_spinner(bright_yellow(format!("Walking workflow runs on {branch}")).to_string());
        Self { pb }
    }

    pub fn update(&self, accumulator: &Accumulator) {
        self.pb
            .set_message(bright_yellow(counts(accumulator)).to_string());
    }

    pub fn finish(&self, accumulator: &Accumulator, end: &TraversalEnd) {
        let counts = counts(accumulator);
        match end {
            TraversalEnd::Completed => self
                .pb
                .finish_with_message(bright_green(format!("{counts} ✓")).to_string()),
            TraversalEnd::StoppedEarly => self.pb.finish_with_message(
                bright_yellow(format!("{counts} (stopped early) ✓")).to_string(),
            ),
            TraversalEnd::Failed(_) => self
                .pb
                .abandon_with_message(bright_red(format!("{counts} (failed) ✗")).to_string()),
        }
    }
}

fn counts(accumulator: &Accumulator) -> String {
    format!(
        "{} workflow runs, {} jobs, {} steps",
        accumulator.workflows(),
        accumulator.jobs(),
        accumulator.steps()
    )
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
