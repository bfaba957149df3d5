//! Per-call encode and decode state.

use cursor::{ParcelReader, ParcelWriter};
use wire::{LimitKind, Limits};

use crate::diagnostics::{Diagnostic, Report};
use crate::error::{CodecError, CodecResult, FieldError};

/// State threaded through one encode call.
#[derive(Debug)]
pub struct EncodeContext<'w> {
    pub(crate) writer: &'w mut ParcelWriter,
    pub(crate) report: &'w mut Report,
    pub(crate) depth: usize,
    pub(crate) max_depth: usize,
    pub(crate) type_name: &'static str,
}

impl<'w> EncodeContext<'w> {
    pub(crate) fn new(writer: &'w mut ParcelWriter, report: &'w mut Report, max_depth: usize) -> Self {
        Self {
            writer,
            report,
            depth: 0,
            max_depth,
            type_name: "",
        }
    }

    /// The writer positioned at the current payload.
    pub fn writer(&mut self) -> &mut ParcelWriter {
        self.writer
    }

    /// Name of the object currently being encoded.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.report.push(diagnostic);
    }

    /// Runs `f` one object level deeper, restoring the level afterwards.
    pub(crate) fn descend<R>(
        &mut self,
        type_name: &'static str,
        f: impl FnOnce(&mut Self) -> CodecResult<R>,
    ) -> CodecResult<R> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(CodecError::DepthExceeded {
                depth,
                limit: self.max_depth,
            });
        }
        let saved = (self.depth, self.type_name);
        self.depth = depth;
        self.type_name = type_name;
        let result = f(self);
        (self.depth, self.type_name) = saved;
        result
    }
}

/// State threaded through one decode call.
#[derive(Debug)]
pub struct DecodeContext<'r, 'a> {
    pub(crate) reader: &'r mut ParcelReader<'a>,
    pub(crate) limits: &'r Limits,
    pub(crate) report: &'r mut Report,
    pub(crate) depth: usize,
    pub(crate) type_name: &'static str,
}

impl<'r, 'a> DecodeContext<'r, 'a> {
    pub(crate) fn new(reader: &'r mut ParcelReader<'a>, limits: &'r Limits, report: &'r mut Report) -> Self {
        Self {
            reader,
            limits,
            report,
            depth: 0,
            type_name: "",
        }
    }

    /// The reader, limited to the current payload.
    pub fn reader(&mut self) -> &mut ParcelReader<'a> {
        self.reader
    }

    #[must_use]
    pub const fn limits(&self) -> &Limits {
        self.limits
    }

    /// Name of the object currently being decoded.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.report.push(diagnostic);
    }

    /// Runs `f` with reads bounded by `end`.
    pub(crate) fn within<R>(
        &mut self,
        end: usize,
        f: impl FnOnce(&mut DecodeContext<'_, 'a>) -> CodecResult<R>,
    ) -> CodecResult<R> {
        let Self {
            reader,
            limits,
            report,
            depth,
            type_name,
        } = self;
        reader.with_limit(end, |reader| {
            let mut inner = DecodeContext {
                reader,
                limits: *limits,
                report: &mut **report,
                depth: *depth,
                type_name: *type_name,
            };
            f(&mut inner)
        })
    }

    /// Runs `f` one object level deeper, restoring the level afterwards.
    pub(crate) fn descend<R>(
        &mut self,
        type_name: &'static str,
        f: impl FnOnce(&mut Self) -> CodecResult<R>,
    ) -> CodecResult<R> {
        let depth = self.depth + 1;
        if depth > self.limits.max_depth {
            return Err(CodecError::DepthExceeded {
                depth,
                limit: self.limits.max_depth,
            });
        }
        let saved = (self.depth, self.type_name);
        self.depth = depth;
        self.type_name = type_name;
        let result = f(self);
        (self.depth, self.type_name) = saved;
        result
    }

    /// Reads a count prefix and checks it against the element limit.
    ///
    /// The null marker yields `None`.
    pub(crate) fn read_count(&mut self) -> Result<Option<usize>, FieldError> {
        let Some(count) = self.reader.read_len()? else {
            return Ok(None);
        };
        check_elements(self.limits, count)?;
        Ok(Some(count))
    }
}

pub(crate) const fn check_elements(limits: &Limits, count: usize) -> Result<(), FieldError> {
    if count > limits.max_elements {
        return Err(FieldError::LimitsExceeded {
            kind: LimitKind::Elements,
            limit: limits.max_elements,
            actual: count,
        });
    }
    Ok(())
}

/// Capacity hint that never trusts a count beyond what the input could hold.
pub(crate) fn capacity_hint(count: usize, remaining: usize, min_element: usize) -> usize {
    count.min(remaining / min_element.max(1))
}
