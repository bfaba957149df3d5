//! Inspection and debugging tools for the safeparcel codec.
//!
//! This crate provides utilities for understanding encoded objects without
//! knowing their Rust types:
//!
//! - Walk an object frame and report every field's id, offset and size
//! - Detect nested object frames inside delimited fields
//! - Export a described type's descriptor as JSON
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use codec::Parcelable;
use serde::Serialize;
use wire::{scan_object, FieldFormat, FieldLayout, Limits, ObjectLayout};

/// Structural summary of one encoded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    /// Length of the inspected buffer.
    pub total_bytes: usize,
    /// Bytes after the end of the object frame.
    pub trailing_bytes: usize,
    /// Number of fields, nested ones included.
    pub field_count: usize,
    /// Deepest object nesting found.
    pub max_depth: usize,
    pub object: ObjectSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    pub offset: usize,
    pub size: usize,
    pub fields: Vec<FieldSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub id: u16,
    pub offset: usize,
    pub size: usize,
    /// `"fixed"` when the size is packed into the header, else `"delimited"`.
    pub format: &'static str,
    /// Little-endian integer reading of 4- and 8-byte payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalar: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<ObjectSummary>,
}

/// Walks the object at the start of `bytes`.
pub fn inspect_bytes(bytes: &[u8], limits: &Limits) -> Result<InspectReport> {
    let layout = scan_object(bytes, limits).context("scan object")?;
    let object = summarize(bytes, &layout);
    Ok(InspectReport {
        total_bytes: bytes.len(),
        trailing_bytes: bytes.len().saturating_sub(layout.end),
        field_count: count_fields(&object),
        max_depth: depth(&object),
        object,
    })
}

fn summarize(bytes: &[u8], layout: &ObjectLayout) -> ObjectSummary {
    ObjectSummary {
        offset: layout.offset,
        size: layout.size,
        fields: layout.fields.iter().map(|f| summarize_field(bytes, f)).collect(),
    }
}

fn summarize_field(bytes: &[u8], field: &FieldLayout) -> FieldSummary {
    let format = match field.format {
        FieldFormat::Fixed => "fixed",
        FieldFormat::Delimited => "delimited",
    };
    let payload = bytes.get(field.payload_offset..field.payload_offset.saturating_add(field.size));
    let scalar = match (field.format, payload) {
        (FieldFormat::Fixed, Some(p)) if p.len() == 4 => {
            Some(i64::from(i32::from_le_bytes([p[0], p[1], p[2], p[3]])))
        }
        (FieldFormat::Fixed, Some(p)) if p.len() == 8 => {
            let mut word = [0u8; 8];
            word.copy_from_slice(p);
            Some(i64::from_le_bytes(word))
        }
        _ => None,
    };
    FieldSummary {
        id: field.id,
        offset: field.offset,
        size: field.size,
        format,
        scalar,
        nested: field.nested.as_ref().map(|nested| summarize(bytes, nested)),
    }
}

fn count_fields(object: &ObjectSummary) -> usize {
    object
        .fields
        .iter()
        .map(|f| 1 + f.nested.as_ref().map_or(0, count_fields))
        .sum()
}

fn depth(object: &ObjectSummary) -> usize {
    1 + object
        .fields
        .iter()
        .filter_map(|f| f.nested.as_ref())
        .map(depth)
        .max()
        .unwrap_or(0)
}

/// Renders a report as an indented field tree.
#[must_use]
pub fn format_report_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "object: {} bytes ({} fields, depth {})",
        report.object.size, report.field_count, report.max_depth
    );
    write_fields(&mut out, &report.object, 1);
    if report.trailing_bytes > 0 {
        let _ = writeln!(out, "trailing: {} bytes", report.trailing_bytes);
    }
    out
}

fn write_fields(out: &mut String, object: &ObjectSummary, indent: usize) {
    let pad = "  ".repeat(indent);
    for field in &object.fields {
        let _ = write!(
            out,
            "{pad}field {} @{}: {} bytes {}",
            field.id, field.offset, field.size, field.format
        );
        if let Some(scalar) = field.scalar {
            let _ = write!(out, " = {scalar}");
        }
        out.push('\n');
        if let Some(nested) = &field.nested {
            let _ = writeln!(out, "{pad}  object: {} bytes", nested.size);
            write_fields(out, nested, indent + 2);
        }
    }
}

/// Serializes the descriptor of `T` together with its fingerprint.
pub fn descriptor_json<T: Parcelable>() -> Result<serde_json::Value> {
    let schema = codec::schema_of::<T>().context("build schema")?;
    Ok(serde_json::json!({
        "fingerprint": format!("{:016x}", schema.fingerprint()),
        "descriptor": schema.descriptor(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::SchemaBuilder;

    #[derive(Debug, Default)]
    struct Inner {
        code: i32,
    }

    impl Parcelable for Inner {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.constructor(Self::default);
            schema.field(1, "code", |i| &i.code, |i| &mut i.code);
        }
    }

    #[derive(Debug, Default)]
    struct Outer {
        stamp: i64,
        inner: Option<Inner>,
        name: String,
    }

    impl Parcelable for Outer {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.constructor(Self::default);
            schema.field(1, "stamp", |o| &o.stamp, |o| &mut o.stamp);
            schema.object(2, "inner", |o| &o.inner, |o| &mut o.inner).nullable();
            schema.field(3, "name", |o| &o.name, |o| &mut o.name);
        }
    }

    fn sample_bytes() -> Vec<u8> {
        codec::to_bytes(&Outer {
            stamp: -5,
            inner: Some(Inner { code: 17 }),
            name: "tool".into(),
        })
        .unwrap()
    }

    #[test]
    fn inspect_reports_nested_fields() {
        let report = inspect_bytes(&sample_bytes(), &Limits::default()).unwrap();
        assert_eq!(report.field_count, 4);
        assert_eq!(report.max_depth, 2);
        assert_eq!(report.trailing_bytes, 0);
        let ids: Vec<u16> = report.object.fields.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(report.object.fields[0].scalar, Some(-5));
        let nested = report.object.fields[1].nested.as_ref().unwrap();
        assert_eq!(nested.fields[0].scalar, Some(17));
    }

    #[test]
    fn inspect_counts_trailing_bytes() {
        let mut bytes = sample_bytes();
        bytes.extend_from_slice(&[0; 4]);
        let report = inspect_bytes(&bytes, &Limits::default()).unwrap();
        assert_eq!(report.trailing_bytes, 4);
    }

    #[test]
    fn inspect_counts_trailing_bytes_after_packed_header() {
        // packed object header: size 8 in the high half, no size word
        let mut bytes = 0x0008_4F45u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0x0004_0001u32.to_le_bytes());
        bytes.extend_from_slice(&7i32.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);
        let report = inspect_bytes(&bytes, &Limits::default()).unwrap();
        assert_eq!(report.object.size, 8);
        assert_eq!(report.trailing_bytes, 4);
        assert_eq!(report.object.fields[0].scalar, Some(7));
    }

    #[test]
    fn inspect_rejects_garbage() {
        assert!(inspect_bytes(&[1, 2, 3, 4, 5, 6, 7, 8], &Limits::default()).is_err());
    }

    #[test]
    fn pretty_output_lists_fields() {
        let report = inspect_bytes(&sample_bytes(), &Limits::default()).unwrap();
        let text = format_report_pretty(&report);
        assert!(text.contains("field 1"));
        assert!(text.contains("= -5"));
        assert!(text.contains("= 17"));
        assert!(text.contains("depth 2"));
    }

    #[test]
    fn json_output_omits_empty_options() {
        let report = inspect_bytes(&sample_bytes(), &Limits::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let name = &json["object"]["fields"][2];
        assert_eq!(name["format"], "delimited");
        assert!(name.get("scalar").is_none());
    }

    #[test]
    fn descriptor_export_includes_fields() {
        let json = descriptor_json::<Outer>().unwrap();
        assert_eq!(json["descriptor"]["name"], "Outer");
        assert_eq!(json["descriptor"]["fields"]["2"]["semantic"], "Object");
        assert_eq!(json["fingerprint"].as_str().map(str::len), Some(16));
    }
}
