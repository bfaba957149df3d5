//! Object decoding.

use cursor::ParcelReader;
use tracing::{debug, warn};
use wire::{read_field_header, read_object_header, CorruptionError, LimitKind, Limits};

use crate::context::DecodeContext;
use crate::diagnostics::{DecodeReport, Diagnostic, Report};
use crate::error::{CodecResult, FieldError};
use crate::parcelable::Parcelable;
use crate::registry::schema_of;

/// Decodes one object of type `T` with default limits.
pub fn decode<T: Parcelable>(reader: &mut ParcelReader<'_>) -> CodecResult<T> {
    decode_with_report(reader, &Limits::default()).map(|(value, _)| value)
}

/// Decodes one object of type `T`, returning what was skipped on the way.
///
/// The reader is left at the end of the object frame.
pub fn decode_with_report<T: Parcelable>(
    reader: &mut ParcelReader<'_>,
    limits: &Limits,
) -> CodecResult<(T, DecodeReport)> {
    let mut report = Report::new();
    let mut ctx = DecodeContext::new(reader, limits, &mut report);
    let value = decode_object::<T>(&mut ctx)?;
    Ok((value, report))
}

/// Reads one object frame into a freshly constructed `T`.
///
/// Unknown ids and fields that fail to decode are skipped to their declared
/// end. A field that claims to extend past the object is corruption.
pub(crate) fn decode_object<T: Parcelable>(ctx: &mut DecodeContext<'_, '_>) -> CodecResult<T> {
    let schema = schema_of::<T>()?;
    let mut target = schema.construct()?;
    ctx.descend(schema.name(), |ctx| {
        let end = read_object_header(ctx.reader)?;
        let size = end.saturating_sub(ctx.reader.position());
        if size > ctx.limits.max_object_bytes {
            return Err(FieldError::LimitsExceeded {
                kind: LimitKind::ObjectBytes,
                limit: ctx.limits.max_object_bytes,
                actual: size,
            }
            .into());
        }
        ctx.within(end, |ctx| {
            while ctx.reader.position() < end {
                let header = read_field_header(ctx.reader)?;
                let field_end = header.end();
                if field_end > end {
                    return Err(CorruptionError::Overread {
                        end: field_end,
                        limit: end,
                    }
                    .into());
                }
                match schema.entry(header.id) {
                    None => {
                        debug!(
                            type_name = ctx.type_name(),
                            id = header.id,
                            size = header.size,
                            "skipping unknown field"
                        );
                        ctx.push(Diagnostic::UnknownField {
                            type_name: ctx.type_name(),
                            id: header.id,
                            size: header.size,
                        });
                    }
                    Some((field, binding)) => {
                        let result = ctx.within(field_end, |ctx| {
                            binding.decode(&mut target, &header, field, ctx)
                        });
                        if let Err(err) = result {
                            if err.is_fatal() {
                                return Err(err);
                            }
                            warn!(
                                type_name = ctx.type_name(),
                                field = field.name,
                                id = field.id,
                                error = %err,
                                "skipping field that failed to decode"
                            );
                            ctx.push(Diagnostic::FieldSkipped {
                                type_name: ctx.type_name(),
                                field: field.name,
                                id: field.id,
                                reason: err.to_string(),
                            });
                        }
                    }
                }
                ctx.reader.set_position(field_end)?;
            }
            Ok(())
        })?;
        ctx.reader.set_position(end)?;
        Ok(())
    })?;
    Ok(target)
}
