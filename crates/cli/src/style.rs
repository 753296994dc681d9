//! Status-line styling for `svnctx` output: support probe results, config
//! validation and errors. Colour is dropped automatically when the stream is
//! not a terminal.

use console::Style;

fn marked(mark: &str, style: Style, msg: &str) -> String {
    format!("{} {}", style.apply_to(mark), msg)
}

/// A client/platform pairing or config that checked out fine.
pub fn success(msg: &str) -> String {
    marked("✓", Style::new().green(), msg)
}

/// A failed command, printed to stderr before exiting non-zero.
pub fn error(msg: &str) -> String {
    marked("✗", Style::new().red().bold(), msg)
}

/// An unsupported client or a config warning.
pub fn warn(msg: &str) -> String {
    marked("⚠", Style::new().yellow(), msg)
}

pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_their_text() {
        assert!(success("configuration is valid").ends_with("configuration is valid"));
        assert!(warn("SnailSVN is not supported on Windows").contains("SnailSVN"));
        assert!(error("Error: boom").ends_with("Error: boom"));
        assert!(dim("no client configured").contains("no client configured"));
    }
}
