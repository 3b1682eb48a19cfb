//! Unified diff rendering for files with incorrect formatting.

use diffy::PatchFormatter;
use owo_colors::OwoColorize;
use std::fmt;

/// A rendered diff labeled with the file's display path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffView {
    pub path: String,
    text: String,
}

impl DiffView {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for DiffView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render the difference between `original` and `revised`. Pure; the
/// caller decides where the text goes.
pub fn render(ansi: bool, display_path: &str, original: &str, revised: &str) -> DiffView {
    let patch = diffy::create_patch(original, revised);
    let body = PatchFormatter::new().fmt_patch(&patch).to_string();

    let mut text = String::new();
    push_line(&mut text, ansi, &format!("--- a/{display_path}"));
    push_line(&mut text, ansi, &format!("+++ b/{display_path}"));
    // diffy's own `---`/`+++` header carries placeholder names; skip it
    for line in body.lines().skip_while(|l| !l.starts_with("@@")) {
        push_line(&mut text, ansi, line);
    }
    DiffView {
        path: display_path.to_string(),
        text,
    }
}

fn push_line(out: &mut String, ansi: bool, line: &str) {
    if !ansi {
        out.push_str(line);
    } else if line.starts_with("---") || line.starts_with("+++") {
        out.push_str(&line.bold().to_string());
    } else if line.starts_with("@@") {
        out.push_str(&line.cyan().to_string());
    } else if line.starts_with('-') {
        out.push_str(&line.red().to_string());
    } else if line.starts_with('+') {
        out.push_str(&line.green().to_string());
    } else {
        out.push_str(line);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_diff_is_labeled_with_display_path() {
        let view = render(false, "src/app/core.clj", "(a\nb)\n", "(a\n b)\n");
        let lines: Vec<&str> = view.as_str().lines().collect();
        assert_eq!(lines[0], "--- a/src/app/core.clj");
        assert_eq!(lines[1], "+++ b/src/app/core.clj");
        assert!(lines[2].starts_with("@@"));
        assert!(lines.contains(&"-b)"));
        assert!(lines.contains(&"+ b)"));
        assert!(!view.as_str().contains("\u{1b}["));
        assert_eq!(view.path, "src/app/core.clj");
    }

    #[test]
    fn test_colored_diff_marks_changes() {
        let view = render(true, "x.clj", "(a)\n", "(b)\n");
        let text = view.to_string();
        assert!(text.contains(&"-(a)".red().to_string()));
        assert!(text.contains(&"+(b)".green().to_string()));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(
            render(false, "x.clj", "(a  b)\n", "(a b)\n"),
            render(false, "x.clj", "(a  b)\n", "(a b)\n")
        );
    }
}
