//! Terminal output helpers: color, quiet/JSON modes, and small formatters.

use std::io::IsTerminal;

pub const QUIET_ENV: &str = "TASTEGRAPH_QUIET";
pub const JSON_ENV: &str = "TASTEGRAPH_JSON";
pub const NO_COLOR_ENV: &str = "TASTEGRAPH_NO_COLOR";

/// Color is on only for a terminal stdout and when neither `NO_COLOR` nor
/// `--no-color` is set.
pub fn color_enabled() -> bool {
    if std::env::var_os("NO_COLOR").is_some() || std::env::var_os(NO_COLOR_ENV).is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn is_quiet() -> bool {
    std::env::var_os(QUIET_ENV).is_some()
}

pub fn is_json() -> bool {
    std::env::var_os(JSON_ENV).is_some()
}

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Wraps text in ANSI codes when color is enabled.
#[derive(Debug, Clone, Copy)]
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    /// Never colors; used for report files.
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn ok_sym(&self) -> String {
        self.paint(GREEN, if self.use_color { "\u{2713}" } else { "OK" })
    }

    pub fn warn_sym(&self) -> String {
        self.paint(YELLOW, if self.use_color { "\u{26a0}" } else { "??" })
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub fn cyan(&self, s: &str) -> String {
        self.paint(CYAN, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }
}

/// Name and version line printed before human-readable output.
pub fn print_header(s: &Styled) {
    eprintln!(
        "  {} {}",
        s.bold("TasteGraph"),
        s.dim(&format!("v{}", env!("CARGO_PKG_VERSION")))
    );
    eprintln!();
}

pub fn print_json(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}

/// Seconds with one decimal, or milliseconds below one second.
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    if elapsed.as_secs() == 0 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}
