//! CLI output surface
//!
//! Every subcommand renders through an [`OutputFormatter`], so the global
//! `--json` flag flips the whole tool between human and machine output at
//! one seam. Human mode prints status-marked lines; JSON mode emits one
//! object per message and pretty-prints structured payloads via
//! [`print_json`](OutputFormatter::print_json).

/// Output format selected by the global `--json` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// True when structured output was requested
    #[must_use]
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Rendering seam between command logic and the terminal
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Returns the formatter matching the requested output format
pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Human => Box::new(HumanFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Status-marked lines for interactive use; details indented under them
struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {message}");
    }

    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {message}");
    }

    fn info(&self, message: &str) {
        println!("  {message}");
    }

    fn print_json(&self, _value: &serde_json::Value) {
        // Structured payloads are rendered by the human branches instead.
    }
}

/// One JSON record per message; informational chatter is suppressed so
/// stdout stays parseable
struct JsonFormatter;

impl JsonFormatter {
    fn record(status: &str, message: &str) -> String {
        serde_json::json!({ "status": status, "message": message }).to_string()
    }
}

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!("{}", Self::record("ok", message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", Self::record("error", message));
    }

    fn warn(&self, message: &str) {
        eprintln!("{}", Self::record("warning", message));
    }

    fn info(&self, _message: &str) {}

    fn print_json(&self, value: &serde_json::Value) {
        match serde_json::to_string_pretty(value) {
            Ok(rendered) => println!("{rendered}"),
            Err(_) => println!("{value}"),
        }
    }
}
