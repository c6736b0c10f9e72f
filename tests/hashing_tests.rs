use proptest::prelude::*;
use serde_json::json;
use shift_rota::hashing::{canonicalize, hash_json, hash_payload};

#[test]
fn digest_ignores_key_order_at_any_depth() {
    let a = json!({"name": "Ada", "weeks": {"A": {"Monday": [{"start": "09:00", "end": "12:00"}]}}});
    let b = json!({"weeks": {"A": {"Monday": [{"end": "12:00", "start": "09:00"}]}}, "name": "Ada"});
    assert_eq!(hash_payload(&a), hash_payload(&b));
    assert_eq!(canonicalize(&a).to_string(), canonicalize(&b).to_string());
}

#[test]
fn digest_changes_with_any_leaf_or_array_order() {
    let base = json!({"slots": [1, 2], "name": "Ada"});
    let leaf = json!({"slots": [1, 3], "name": "Ada"});
    let order = json!({"slots": [2, 1], "name": "Ada"});
    assert_ne!(hash_payload(&base), hash_payload(&leaf));
    assert_ne!(hash_payload(&base), hash_payload(&order));
}

#[test]
fn digest_is_lowercase_sha256_hex() {
    let digest = hash_json("{}").unwrap();
    assert_eq!(
        digest,
        "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
    );
    assert_eq!(hash_json("  { }\n").unwrap(), digest);
}

#[test]
fn invalid_json_is_an_error() {
    assert!(hash_json("{\"name\":").is_err());
}

proptest! {
    #[test]
    fn changing_any_leaf_changes_the_digest(
        values in prop::collection::vec(any::<i64>(), 1..8),
        index in any::<prop::sample::Index>(),
        delta in 1i64..1000,
    ) {
        let mut changed = values.clone();
        let i = index.index(changed.len());
        changed[i] = changed[i].wrapping_add(delta);
        prop_assert_ne!(
            hash_payload(&json!({"values": values})),
            hash_payload(&json!({"values": changed}))
        );
    }
}
