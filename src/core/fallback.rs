//! Fallback diagnostics channel
//!
//! Failures inside the pipeline (write errors, closed destinations, panicking
//! appenders) are reported here instead of through the pipeline itself, so a
//! broken sink can never recurse into more logging. Output goes straight to
//! the process stderr, bypassing any queued stderr sink.

use std::fmt;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl Severity {
    fn tag(&self) -> &'static str {
        match self {
            Severity::Warning => "[LOGGER WARNING]",
            Severity::Error => "[LOGGER ERROR]",
            Severity::Critical => "[LOGGER CRITICAL]",
        }
    }
}

/// Write one diagnostic line to stderr. Never panics.
pub fn report(severity: Severity, message: fmt::Arguments<'_>) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{} {}", severity.tag(), message);
}

pub(crate) fn warning(message: fmt::Arguments<'_>) {
    report(Severity::Warning, message);
}

pub(crate) fn error(message: fmt::Arguments<'_>) {
    report(Severity::Error, message);
}

pub(crate) fn critical(message: fmt::Arguments<'_>) {
    report(Severity::Critical, message);
}

/// Best-effort text for a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "Unknown panic");
    }

    #[test]
    fn test_report_does_not_panic() {
        report(Severity::Warning, format_args!("diagnostic {}", 1));
    }
}
