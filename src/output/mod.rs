mod progress;
mod sink;
mod styling;

pub use progress::TraversalProgress;
pub use sink::write_json;
use styling::{dim, magenta_bold};

/// Prints the `CISteps` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🪜 CISteps"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitHub Actions Step Telemetry")
    );
}
