//! Per-file classification of a transform run.

use crate::config::FeatureToggles;
use crate::formatter::Transform;
use anyhow::anyhow;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug)]
pub enum Outcome {
    Unchanged,
    Changed { original: String, revised: String },
    /// The transform rejected the content; carries the full error chain.
    Failed(anyhow::Error),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Run `transform` over `content` and classify the result.
///
/// Errors and panics raised by the transform are captured as
/// [`Outcome::Failed`] so one bad file never stops a batch.
pub fn classify(transform: &dyn Transform, toggles: &FeatureToggles, content: String) -> Outcome {
    let run = panic::catch_unwind(AssertUnwindSafe(|| transform.transform(&content, toggles)));
    match run {
        Ok(Ok(revised)) if revised == content => Outcome::Unchanged,
        Ok(Ok(revised)) => Outcome::Changed {
            original: content,
            revised,
        },
        Ok(Err(e)) => Outcome::Failed(e),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            Outcome::Failed(anyhow!("formatter panicked: {msg}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::SexpFormatter;

    struct Panicky;

    impl Transform for Panicky {
        fn transform(&self, _: &str, _: &FeatureToggles) -> anyhow::Result<String> {
            panic!("boom")
        }
    }

    fn run(src: &str) -> Outcome {
        classify(
            &SexpFormatter::default(),
            &FeatureToggles::default(),
            src.to_string(),
        )
    }

    #[test]
    fn test_identical_output_is_unchanged() {
        assert!(matches!(run("(a b)\n"), Outcome::Unchanged));
    }

    #[test]
    fn test_different_output_keeps_both_texts() {
        match run("( a b )\n") {
            Outcome::Changed { original, revised } => {
                assert_eq!(original, "( a b )\n");
                assert_eq!(revised, "(a b)\n");
            }
            other => panic!("expected change, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_is_captured() {
        let out = run("(a b");
        assert!(out.is_failed());
    }

    #[test]
    fn test_panic_is_captured() {
        let out = classify(&Panicky, &FeatureToggles::default(), "(a)".to_string());
        match out {
            Outcome::Failed(e) => assert!(e.to_string().contains("boom")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
