//! Object encoding.

use cursor::ParcelWriter;
use tracing::warn;
use wire::{begin_object, finish_object, Limits};

use crate::context::EncodeContext;
use crate::diagnostics::{Diagnostic, EncodeReport, Report};
use crate::error::CodecResult;
use crate::parcelable::Parcelable;
use crate::registry::schema_of;

/// Encodes `value` as one object frame at the writer's position.
///
/// On error nothing is left behind: the writer is truncated back to where
/// the object started.
pub fn encode<T: Parcelable>(value: &T, writer: &mut ParcelWriter) -> CodecResult<()> {
    encode_with_report(value, writer).map(drop)
}

/// Like [`encode`], also returning the fields that had to be left out.
pub fn encode_with_report<T: Parcelable>(
    value: &T,
    writer: &mut ParcelWriter,
) -> CodecResult<EncodeReport> {
    let start = writer.position();
    let mut report = Report::new();
    let mut ctx = EncodeContext::new(writer, &mut report, Limits::default().max_depth);
    match encode_object(value, &mut ctx) {
        Ok(()) => Ok(report),
        Err(err) => {
            writer.truncate(start);
            Err(err)
        }
    }
}

/// Writes the object frame of `value` and its fields in ascending id order.
///
/// A field that fails for a non-fatal reason is rolled back and omitted;
/// its siblings are still written.
pub(crate) fn encode_object<T: Parcelable>(
    value: &T,
    ctx: &mut EncodeContext<'_>,
) -> CodecResult<()> {
    let schema = schema_of::<T>()?;
    ctx.descend(schema.name(), |ctx| {
        let mark = begin_object(ctx.writer);
        for (field, binding) in schema.entries() {
            let before = ctx.writer.position();
            let Err(err) = binding.encode(value, field, ctx) else {
                continue;
            };
            if err.is_fatal() {
                return Err(err);
            }
            ctx.writer.truncate(before);
            warn!(
                type_name = ctx.type_name(),
                field = field.name,
                id = field.id,
                error = %err,
                "omitting field that failed to encode"
            );
            ctx.push(Diagnostic::FieldOmitted {
                type_name: ctx.type_name(),
                field: field.name,
                id: field.id,
                reason: err.to_string(),
            });
        }
        finish_object(ctx.writer, mark)?;
        Ok(())
    })
}
