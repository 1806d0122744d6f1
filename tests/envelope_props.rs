use base64::{engine::general_purpose::STANDARD, Engine};
use proptest::prelude::*;

use keyseal::crypto::{open, seal, MasterKey};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn seal_open_round_trips(key in any::<[u8; 32]>(), plaintext in ".*") {
        let key = MasterKey::from_bytes(key);
        let envelope = seal(&plaintext, &key).unwrap();
        prop_assert_eq!(open(envelope.as_str(), &key).unwrap(), plaintext);
    }

    #[test]
    fn any_flipped_bit_is_rejected(
        key in any::<[u8; 32]>(),
        plaintext in ".{0,64}",
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = MasterKey::from_bytes(key);
        let envelope = seal(&plaintext, &key).unwrap();

        let mut sealed = STANDARD.decode(envelope.as_str()).unwrap();
        let i = index.index(sealed.len());
        sealed[i] ^= 1 << bit;

        let err = open(&STANDARD.encode(&sealed), &key).unwrap_err();
        prop_assert!(err.is_authentication());
    }

    #[test]
    fn other_keys_are_rejected(k1 in any::<[u8; 32]>(), k2 in any::<[u8; 32]>()) {
        prop_assume!(k1 != k2);
        let envelope = seal("secret", &MasterKey::from_bytes(k1)).unwrap();
        let err = open(envelope.as_str(), &MasterKey::from_bytes(k2)).unwrap_err();
        prop_assert!(err.is_authentication());
    }
}
