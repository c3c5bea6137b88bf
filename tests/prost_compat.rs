//! Cross-validation against prost-encoded wire bytes.

use std::collections::BTreeMap;
use std::collections::HashMap;

use prost::Message as ProstMessage;
use protodec::error::DecodeError;
use protodec::map::StringValue;
use protodec::scalar::Bool;
use protodec::scalar::Double;
use protodec::scalar::Fixed32;
use protodec::scalar::Int32;
use protodec::scalar::Int64;
use protodec::scalar::Sint64;
use protodec::scalar::Uint32;
use protodec::FieldDecoder;
use protodec::Message;
use protodec::UnknownFields;

#[derive(Clone, PartialEq, prost::Message)]
struct NestedProst {
    #[prost(int64, tag = "1")]
    value: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
struct AllTypesProst {
    #[prost(uint32, tag = "1")]
    id: u32,
    #[prost(string, tag = "2")]
    name: String,
    #[prost(bytes = "vec", tag = "3")]
    data: Vec<u8>,
    #[prost(sint64, tag = "4")]
    delta: i64,
    #[prost(double, tag = "5")]
    ratio: f64,
    #[prost(fixed32, tag = "6")]
    checksum: u32,
    #[prost(int64, repeated, tag = "7")]
    values: Vec<i64>,
    #[prost(message, optional, tag = "8")]
    nested: Option<NestedProst>,
    #[prost(message, repeated, tag = "9")]
    children: Vec<NestedProst>,
    #[prost(map = "string, int32", tag = "10")]
    attributes: HashMap<String, i32>,
    #[prost(bool, tag = "11")]
    enabled: bool,
}

/// The wire suffix of `AllTypesProst` past the fields `Reduced` declares.
#[derive(Clone, PartialEq, prost::Message)]
struct TailProst {
    #[prost(bytes = "vec", tag = "3")]
    data: Vec<u8>,
    #[prost(sint64, tag = "4")]
    delta: i64,
    #[prost(double, tag = "5")]
    ratio: f64,
    #[prost(fixed32, tag = "6")]
    checksum: u32,
    #[prost(int64, repeated, tag = "7")]
    values: Vec<i64>,
    #[prost(message, optional, tag = "8")]
    nested: Option<NestedProst>,
    #[prost(message, repeated, tag = "9")]
    children: Vec<NestedProst>,
    #[prost(map = "string, int32", tag = "10")]
    attributes: HashMap<String, i32>,
    #[prost(bool, tag = "11")]
    enabled: bool,
}

#[derive(Debug, Default, PartialEq)]
struct Nested {
    value: i64,
    unknown_fields: UnknownFields,
}

impl Message for Nested {
    fn decode_field(&mut self, field: &mut FieldDecoder<'_, '_>, field_number: u32) -> Result<(), DecodeError> {
        match field_number {
            1 => field.decode_singular::<Int64>(&mut self.value),
            _ => Ok(()),
        }
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown_fields
    }
}

#[derive(Debug, Default, PartialEq)]
struct AllTypes {
    id: u32,
    name: String,
    data: Vec<u8>,
    delta: i64,
    ratio: f64,
    checksum: u32,
    values: Vec<i64>,
    nested: Option<Nested>,
    children: Vec<Nested>,
    attributes: BTreeMap<String, i32>,
    enabled: bool,
    unknown_fields: UnknownFields,
}

impl Message for AllTypes {
    fn decode_field(&mut self, field: &mut FieldDecoder<'_, '_>, field_number: u32) -> Result<(), DecodeError> {
        match field_number {
            1 => field.decode_singular::<Uint32>(&mut self.id),
            2 => field.decode_string(&mut self.name),
            3 => field.decode_bytes(&mut self.data),
            4 => field.decode_singular::<Sint64>(&mut self.delta),
            5 => field.decode_singular::<Double>(&mut self.ratio),
            6 => field.decode_singular::<Fixed32>(&mut self.checksum),
            7 => field.decode_repeated::<Int64>(&mut self.values),
            8 => field.decode_singular_message::<Nested>(&mut self.nested),
            9 => field.decode_repeated_message::<Nested>(&mut self.children),
            10 => field.decode_map::<StringValue, Int32>(&mut self.attributes),
            11 => field.decode_singular::<Bool>(&mut self.enabled),
            _ => Ok(()),
        }
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown_fields
    }
}

#[derive(Debug, Default, PartialEq)]
struct Reduced {
    id: u32,
    name: String,
    unknown_fields: UnknownFields,
}

impl Message for Reduced {
    fn decode_field(&mut self, field: &mut FieldDecoder<'_, '_>, field_number: u32) -> Result<(), DecodeError> {
        match field_number {
            1 => field.decode_singular::<Uint32>(&mut self.id),
            2 => field.decode_string(&mut self.name),
            _ => Ok(()),
        }
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown_fields
    }
}

fn sample_prost() -> AllTypesProst {
    AllTypesProst {
        id: 42,
        name: "proto-compat".to_string(),
        data: vec![0xDE, 0xAD, 0xBE, 0xEF],
        delta: -735_983,
        ratio: -2.25,
        checksum: 0xCAFE_F00D,
        values: vec![-1, 0, 1, i64::MIN, i64::MAX],
        nested: Some(NestedProst { value: -7 }),
        children: vec![NestedProst { value: 11 }, NestedProst { value: 23 }],
        attributes: HashMap::from([("foo".to_string(), 42)]),
        enabled: true,
    }
}

fn assert_matches_sample(decoded: &AllTypes, expected: &AllTypesProst) {
    assert_eq!(decoded.id, expected.id);
    assert_eq!(decoded.name, expected.name);
    assert_eq!(decoded.data, expected.data);
    assert_eq!(decoded.delta, expected.delta);
    assert_eq!(decoded.ratio, expected.ratio);
    assert_eq!(decoded.checksum, expected.checksum);
    assert_eq!(decoded.values, expected.values);
    assert_eq!(decoded.nested.as_ref().map(|nested| nested.value), expected.nested.as_ref().map(|nested| nested.value));
    let children: Vec<i64> = decoded.children.iter().map(|child| child.value).collect();
    let expected_children: Vec<i64> = expected.children.iter().map(|child| child.value).collect();
    assert_eq!(children, expected_children);
    let attributes: HashMap<String, i32> = decoded.attributes.iter().map(|(k, v)| (k.clone(), *v)).collect();
    assert_eq!(attributes, expected.attributes);
    assert_eq!(decoded.enabled, expected.enabled);
}

#[test]
fn decodes_prost_encoded_messages() {
    let expected = sample_prost();
    let bytes = expected.encode_to_vec();

    let decoded = AllTypes::decode(&bytes).unwrap();
    assert_matches_sample(&decoded, &expected);
    assert!(decoded.unknown_fields.is_empty());
}

#[test]
fn reduced_schema_preserves_the_tail_byte_exact() {
    let full = sample_prost();
    let bytes = full.encode_to_vec();

    let reduced = Reduced::decode(&bytes).unwrap();
    assert_eq!(reduced.id, full.id);
    assert_eq!(reduced.name, full.name);

    // prost emits fields in tag order, so the unknown buffer must be
    // byte-identical to an encoding of just the undeclared tail.
    let tail = TailProst {
        data: full.data.clone(),
        delta: full.delta,
        ratio: full.ratio,
        checksum: full.checksum,
        values: full.values.clone(),
        nested: full.nested.clone(),
        children: full.children.clone(),
        attributes: full.attributes.clone(),
        enabled: full.enabled,
    };
    assert_eq!(reduced.unknown_fields.as_bytes(), tail.encode_to_vec());
}

#[test]
fn preserved_unknowns_replay_with_the_full_schema() {
    let full = sample_prost();
    let bytes = full.encode_to_vec();

    let reduced = Reduced::decode(&bytes).unwrap();
    let replayed = AllTypes::decode(reduced.unknown_fields.as_bytes()).unwrap();
    assert_eq!(replayed.data, full.data);
    assert_eq!(replayed.delta, full.delta);
    assert_eq!(replayed.values, full.values);
    assert_eq!(replayed.nested.map(|nested| nested.value), full.nested.map(|nested| nested.value));
    assert_eq!(replayed.enabled, full.enabled);
}

#[test]
fn prost_decodes_what_the_reduced_schema_preserved() {
    // Round the unknown bytes back through prost to close the loop.
    let full = sample_prost();
    let reduced = Reduced::decode(&full.encode_to_vec()).unwrap();
    let tail = TailProst::decode(reduced.unknown_fields.as_bytes()).unwrap();
    assert_eq!(tail.delta, full.delta);
    assert_eq!(tail.values, full.values);
    assert_eq!(tail.attributes, full.attributes);
}

#[test]
fn packed_and_unpacked_prost_encodings_agree() {
    #[derive(Clone, PartialEq, prost::Message)]
    struct UnpackedProst {
        #[prost(int64, repeated, packed = "false", tag = "7")]
        values: Vec<i64>,
    }

    let values = vec![-3, 0, 300, i64::MAX];
    let packed = AllTypesProst {
        values: values.clone(),
        ..Default::default()
    }
    .encode_to_vec();
    let unpacked = UnpackedProst { values: values.clone() }.encode_to_vec();
    assert_ne!(packed, unpacked);

    assert_eq!(AllTypes::decode(&packed).unwrap().values, values);
    assert_eq!(AllTypes::decode(&unpacked).unwrap().values, values);
}

#[test]
fn zigzag_matches_prost_for_extremes() {
    for delta in [i64::MIN, -1, 0, 1, i64::MAX] {
        let bytes = AllTypesProst {
            delta,
            ..Default::default()
        }
        .encode_to_vec();
        assert_eq!(AllTypes::decode(&bytes).unwrap().delta, delta);
    }
}
