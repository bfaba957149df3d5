#![no_main]

use std::collections::BTreeMap;

use codec::{decode_with_report, Bundle, Parcelable, SchemaBuilder, Value};
use cursor::ParcelReader;
use libfuzzer_sys::fuzz_target;
use wire::Limits;

#[derive(Default)]
struct Leaf {
    id: i64,
    name: Option<String>,
}

impl Parcelable for Leaf {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.constructor(Self::default);
        schema.field(1, "id", |l| &l.id, |l| &mut l.id);
        schema.field(2, "name", |l| &l.name, |l| &mut l.name).nullable();
    }
}

#[derive(Default)]
struct Root {
    count: i32,
    blob: Vec<u8>,
    leaf: Option<Leaf>,
    leaves: Vec<Option<Leaf>>,
    values: Vec<Value>,
    extras: BTreeMap<String, Value>,
    bundle: Option<Bundle>,
    scores: Vec<f64>,
}

impl Parcelable for Root {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.constructor(Self::default);
        schema.field(1, "count", |r| &r.count, |r| &mut r.count);
        schema.field(2, "blob", |r| &r.blob, |r| &mut r.blob);
        schema.object(3, "leaf", |r| &r.leaf, |r| &mut r.leaf).nullable();
        schema.object_array(4, "leaves", |r| &r.leaves, |r| &mut r.leaves);
        schema.list(5, "values", |r| &r.values, |r| &mut r.values);
        schema.map(6, "extras", |r| &r.extras, |r| &mut r.extras);
        schema.field(7, "bundle", |r| &r.bundle, |r| &mut r.bundle).nullable();
        schema
            .list(8, "scores", |r| &r.scores, |r| &mut r.scores)
            .direct_list();
    }
}

fuzz_target!(|data: &[u8]| {
    let _ = wire::scan_object(data, &Limits::for_testing());
    let mut reader = ParcelReader::new(data);
    let _ = decode_with_report::<Root>(&mut reader, &Limits::for_testing());
});
