//! Non-fatal resolution failures.

use std::fmt;

/// One missing or broken link found while resolving a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("No Root entry")]
    NoRoot,
    #[error("No Data entry")]
    NoData,
    #[error("CreateAction {action:?} has no instrument reference")]
    NoInstrument { action: String },
    #[error("Error parsing SoftwareApplication: no node with id {target:?}")]
    NoSoftware { target: String },
    #[error("Error parsing SoftwareApplication: {target:?} has no name")]
    NoSoftwareName { target: String },
}

/// Ordered, deduplicated list of diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `diagnostic` unless an equal one is already present.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.0.contains(&diagnostic) {
            log::debug!("resolution: {diagnostic}");
            self.0.push(diagnostic);
        }
    }

    /// Message of the first recorded diagnostic, or `""`.
    pub fn first(&self) -> String {
        self.0.first().map(ToString::to_string).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, diagnostic: &Diagnostic) -> bool {
        self.0.contains(diagnostic)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// All messages, separated by `; `.
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut is_first = true;
        for d in &self.0 {
            if is_first {
                is_first = false;
            } else {
                f.write_str("; ")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}
