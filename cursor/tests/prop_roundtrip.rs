use cursor::{ParcelReader, ParcelWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    I32(i32),
    U32(u32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Bytes(Option<Vec<u8>>),
    Text(Option<String>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i32>().prop_map(Op::I32),
        any::<u32>().prop_map(Op::U32),
        any::<i64>().prop_map(Op::I64),
        any::<f32>().prop_map(Op::F32),
        any::<f64>().prop_map(Op::F64),
        any::<bool>().prop_map(Op::Bool),
        prop::option::of(prop::collection::vec(any::<u8>(), 0..32)).prop_map(Op::Bytes),
        prop::option::of(".{0,16}").prop_map(Op::Text),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = ParcelWriter::new();

        for op in &ops {
            match op {
                Op::I32(v) => writer.write_i32(*v),
                Op::U32(v) => writer.write_u32(*v),
                Op::I64(v) => writer.write_i64(*v),
                Op::F32(v) => writer.write_f32(*v),
                Op::F64(v) => writer.write_f64(*v),
                Op::Bool(v) => writer.write_bool(*v),
                Op::Bytes(v) => writer.write_byte_array(v.as_deref()).unwrap(),
                Op::Text(v) => writer.write_string16(v.as_deref()).unwrap(),
            }
            prop_assert_eq!(writer.position() % 4, 0);
        }

        let bytes = writer.finish();
        let mut reader = ParcelReader::new(&bytes);

        for op in &ops {
            match op {
                Op::I32(v) => prop_assert_eq!(reader.read_i32().unwrap(), *v),
                Op::U32(v) => prop_assert_eq!(reader.read_u32().unwrap(), *v),
                Op::I64(v) => prop_assert_eq!(reader.read_i64().unwrap(), *v),
                Op::F32(v) => prop_assert_eq!(reader.read_f32().unwrap().to_bits(), v.to_bits()),
                Op::F64(v) => prop_assert_eq!(reader.read_f64().unwrap().to_bits(), v.to_bits()),
                Op::Bool(v) => prop_assert_eq!(reader.read_bool().unwrap(), *v),
                Op::Bytes(v) => prop_assert_eq!(&reader.read_byte_array().unwrap(), v),
                Op::Text(v) => prop_assert_eq!(&reader.read_string16().unwrap(), v),
            }
        }
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn prop_reader_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
        let mut reader = ParcelReader::new(&bytes);
        loop {
            let before = reader.position();
            let step = match before % 3 {
                0 => reader.read_string16().map(|_| ()),
                1 => reader.read_byte_array().map(|_| ()),
                _ => reader.read_i64().map(|_| ()),
            };
            if step.is_err() || reader.position() == before {
                break;
            }
        }
        prop_assert!(reader.position() <= reader.limit());
    }
}
