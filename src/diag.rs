//! Non-fatal diagnostics — data-consistency warnings surfaced alongside results.
//!
//! Catalog authoring errors (conflicting anchors, dangling riff references)
//! never abort generation. The engine applies its documented fallback and
//! records a [`Diagnostic`] so the caller can report the problem.

use std::fmt;

/// A non-fatal warning about inconsistent or unresolvable catalog data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_with_warning_prefix() {
        let d = Diagnostic::new("anchor conflict on beat1:targetTone");
        assert_eq!(d.to_string(), "warning: anchor conflict on beat1:targetTone");
    }
}
