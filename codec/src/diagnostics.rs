//! Non-fatal events recorded while encoding or decoding.

use std::fmt;

/// One non-fatal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A field id the consumer's descriptor does not know was skipped.
    UnknownField {
        type_name: &'static str,
        id: u16,
        size: usize,
    },
    /// A known field failed to decode and was skipped to its declared end.
    FieldSkipped {
        type_name: &'static str,
        field: &'static str,
        id: u16,
        reason: String,
    },
    /// A field failed to encode and was left out of the object.
    FieldOmitted {
        type_name: &'static str,
        field: &'static str,
        id: u16,
        reason: String,
    },
    /// A decoded integer exceeded the field's version gate.
    VersionGate {
        type_name: &'static str,
        field: &'static str,
        gate: i64,
        found: i64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField {
                type_name,
                id,
                size,
            } => write!(f, "{type_name}: skipped unknown field {id} ({size} bytes)"),
            Self::FieldSkipped {
                type_name,
                field,
                id,
                reason,
            } => write!(f, "{type_name}.{field} (id {id}) skipped: {reason}"),
            Self::FieldOmitted {
                type_name,
                field,
                id,
                reason,
            } => write!(f, "{type_name}.{field} (id {id}) omitted: {reason}"),
            Self::VersionGate {
                type_name,
                field,
                gate,
                found,
            } => write!(
                f,
                "{type_name}.{field} holds {found}, newer than supported version {gate}"
            ),
        }
    }
}

/// Diagnostics collected by one encode or decode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

/// Report returned by [`decode_with_report`](crate::decode_with_report).
pub type DecodeReport = Report;

/// Report returned by [`encode_with_report`](crate::encode_with_report).
pub type EncodeReport = Report;

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns `true` if nothing noteworthy happened.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Ids of unknown fields that were skipped.
    pub fn unknown_fields(&self) -> impl Iterator<Item = u16> + '_ {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::UnknownField { id, .. } => Some(*id),
            _ => None,
        })
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_collects_unknown_ids() {
        let mut report = Report::new();
        assert!(report.is_clean());
        report.push(Diagnostic::UnknownField {
            type_name: "Point",
            id: 3,
            size: 12,
        });
        report.push(Diagnostic::VersionGate {
            type_name: "Point",
            field: "x",
            gate: 10,
            found: 42,
        });
        assert!(!report.is_clean());
        assert_eq!(report.unknown_fields().collect::<Vec<_>>(), vec![3]);
        assert_eq!(report.diagnostics().len(), 2);
    }

    #[test]
    fn diagnostic_display() {
        let diag = Diagnostic::VersionGate {
            type_name: "Point",
            field: "x",
            gate: 10,
            found: 42,
        };
        let msg = diag.to_string();
        assert!(msg.contains("Point.x"));
        assert!(msg.contains("42"));
        assert!(msg.contains("10"));
    }
}
