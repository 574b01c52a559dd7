use super::*;
use anyhow::Result;
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of(key: &InternalKey) -> u64 {
    let mut h = DefaultHasher::new();
    key.hash(&mut h);
    h.finish()
}

// -------------------- Packing --------------------

#[test]
fn pack_places_sequence_above_type_byte() -> Result<()> {
    assert_eq!(pack_sequence_and_type(0, ValueType::Deletion)?, 0x00);
    assert_eq!(pack_sequence_and_type(0, ValueType::Value)?, 0x01);
    assert_eq!(pack_sequence_and_type(5, ValueType::Value)?, 0x0501);
    assert_eq!(
        pack_sequence_and_type(MAX_SEQUENCE_NUMBER, ValueType::Value)?,
        u64::MAX
    );
    Ok(())
}

#[test]
fn pack_rejects_sequence_past_56_bits() {
    let err = pack_sequence_and_type(MAX_SEQUENCE_NUMBER + 1, ValueType::Value).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn unpack_recovers_both_fields() -> Result<()> {
    let tag = pack_sequence_and_type(42, ValueType::Deletion)?;
    assert_eq!(unpack_sequence_number(tag), 42);
    assert_eq!(unpack_value_type(tag)?, ValueType::Deletion);
    Ok(())
}

#[test]
fn unpack_unknown_type_byte_is_corruption() {
    let err = unpack_value_type(0x0507).unwrap_err();
    assert!(err.is_corruption());
}

#[test]
fn value_type_from_byte() {
    assert_eq!(ValueType::try_from(0u8), Ok(ValueType::Deletion));
    assert_eq!(ValueType::try_from(1u8), Ok(ValueType::Value));
    assert!(matches!(
        ValueType::try_from(2u8),
        Err(Error::InvalidArgument(_))
    ));
}

// -------------------- InternalKey construction --------------------

#[test]
fn new_rejects_negative_sequence() {
    // -1 reinterpreted as unsigned is far outside the 56-bit range.
    let err = InternalKey::new("k", -1i64 as u64, ValueType::Value).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn new_accepts_max_sequence() -> Result<()> {
    let key = InternalKey::new("k", MAX_SEQUENCE_NUMBER, ValueType::Value)?;
    assert_eq!(key.sequence(), MAX_SEQUENCE_NUMBER);
    Ok(())
}

#[test]
fn decode_rejects_seven_bytes() {
    let err = InternalKey::decode(&[0u8; 7]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn decode_eight_bytes_gives_empty_user_key() -> Result<()> {
    let mut data = [0u8; 8];
    data[6] = 0x03; // sequence 3
    data[7] = 0x01; // Value
    let key = InternalKey::decode(&data)?;
    assert!(key.user_key().is_empty());
    assert_eq!(key.sequence(), 3);
    assert_eq!(key.value_type(), ValueType::Value);
    Ok(())
}

// -------------------- Encoding --------------------

#[test]
fn encode_layout_is_user_key_then_big_endian_tag() -> Result<()> {
    let key = InternalKey::new("k1", 5, ValueType::Value)?;
    let enc = key.encode();
    assert_eq!(enc.len(), 2 + TAG_BYTES);
    assert_eq!(&enc[..2], b"k1");
    assert_eq!(&enc[2..], &[0, 0, 0, 0, 0, 0, 0x05, 0x01]);
    assert_eq!(key.encoded_len(), enc.len());
    Ok(())
}

#[test]
fn key_tag_is_the_packed_tag() -> Result<()> {
    for (seq, t) in [
        (0, ValueType::Deletion),
        (5, ValueType::Value),
        (MAX_SEQUENCE_NUMBER, ValueType::Deletion),
        (MAX_SEQUENCE_NUMBER, ValueType::Value),
    ] {
        let key = InternalKey::new("k", seq, t)?;
        assert_eq!(key.tag(), pack_sequence_and_type(seq, t)?);
    }
    Ok(())
}

#[test]
fn decode_bytes_shares_buffer() -> Result<()> {
    let enc = InternalKey::new("shared", 9, ValueType::Deletion)?.encode();
    let key = InternalKey::decode_bytes(enc.clone())?;
    assert_eq!(key.user_key().as_ptr(), enc.as_ptr());
    assert_eq!(key.sequence(), 9);
    Ok(())
}

#[test]
fn identical_inputs_hash_and_encode_identically() -> Result<()> {
    let a = InternalKey::new(b"user".to_vec(), 7, ValueType::Value)?;
    let b = InternalKey::new("user", 7, ValueType::Value)?;
    assert_eq!(a, b);
    assert_eq!(a.encode(), b.encode());
    assert_eq!(hash_of(&a), hash_of(&b));

    let c = InternalKey::new("user", 7, ValueType::Deletion)?;
    assert_ne!(a, c);
    Ok(())
}

#[test]
fn degenerate_key_is_a_regular_value() -> Result<()> {
    let zero = InternalKey::new("", 0, ValueType::Deletion)?;
    let same = InternalKey::decode(&zero.encode())?;
    assert_eq!(zero, same);
    assert_eq!(hash_of(&zero), hash_of(&same));
    assert_eq!(zero.encode().as_ref(), &[0u8; 8]);
    Ok(())
}

#[test]
fn debug_does_not_print_user_key() -> Result<()> {
    let key = InternalKey::new("secret-password", 1, ValueType::Value)?;
    let dbg = format!("{key:?}");
    let display = key.to_string();
    assert!(!dbg.contains("secret"));
    assert!(!display.contains("secret"));
    assert!(dbg.contains("<15 bytes>"));
    assert!(dbg.contains("sequence: 1"));
    Ok(())
}

// -------------------- Ordering --------------------

#[test]
fn newer_sequence_sorts_first_for_same_user_key() -> Result<()> {
    let newer = InternalKey::new("k1", 5, ValueType::Value)?;
    let older = InternalKey::new("k1", 3, ValueType::Deletion)?;
    let other = InternalKey::new("k2", 100, ValueType::Value)?;
    assert!(newer < older);
    assert!(older < other);
    Ok(())
}

#[test]
fn internal_comparator_agrees_with_ord() -> Result<()> {
    let cmp = InternalKeyComparator::default();
    let mut keys = vec![
        InternalKey::new("b", 1, ValueType::Value)?,
        InternalKey::new("a", 1, ValueType::Value)?,
        InternalKey::new("a", 9, ValueType::Deletion)?,
        InternalKey::new("ab", 2, ValueType::Value)?,
        InternalKey::new("a", 9, ValueType::Value)?,
    ];
    let mut encoded: Vec<_> = keys.iter().map(InternalKey::encode).collect();
    keys.sort();
    encoded.sort_by(|a, b| cmp.compare(a, b));
    let decoded: Vec<_> = encoded
        .iter()
        .map(|e| InternalKey::decode(e))
        .collect::<std::result::Result<_, _>>()?;
    assert_eq!(keys, decoded);
    Ok(())
}

#[test]
fn internal_comparator_falls_back_for_short_buffers() {
    let cmp = InternalKeyComparator::default();
    assert_eq!(cmp.compare(b"ab", b"b"), std::cmp::Ordering::Less);
    assert_eq!(cmp.compare(b"zz", b"zz"), std::cmp::Ordering::Equal);
}

#[test]
fn bytewise_comparator_is_lexicographic() {
    let cmp = BytewiseComparator;
    assert_eq!(cmp.compare(b"a", b"apple"), std::cmp::Ordering::Less);
    assert_eq!(cmp.compare(b"bee", b"banana"), std::cmp::Ordering::Greater);
}

// -------------------- Properties --------------------

fn value_type_strategy() -> impl Strategy<Value = ValueType> {
    prop_oneof![Just(ValueType::Value), Just(ValueType::Deletion)]
}

proptest! {
    #[test]
    fn encode_decode_roundtrip(
        user_key in prop::collection::vec(any::<u8>(), 0..64),
        sequence in 0..=MAX_SEQUENCE_NUMBER,
        value_type in value_type_strategy(),
    ) {
        let key = InternalKey::new(user_key, sequence, value_type).unwrap();
        prop_assert_eq!(InternalKey::decode(&key.encode()).unwrap(), key);
    }

    #[test]
    fn tag_is_monotone_in_sequence(
        a in 0..=MAX_SEQUENCE_NUMBER,
        b in 0..=MAX_SEQUENCE_NUMBER,
        ta in value_type_strategy(),
        tb in value_type_strategy(),
    ) {
        prop_assume!(a != b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(
            pack_sequence_and_type(hi, tb).unwrap() > pack_sequence_and_type(lo, ta).unwrap()
        );
    }
}
