//! Property-based tests for configuration and address handling.

use proptest::prelude::*;
use proxmox_provider::domain::config::REQUIRED_KEYS;
use proxmox_provider::domain::{ProviderConfig, ProviderError, strip_cidr};

proptest! {
    #[test]
    fn prop_any_missing_key_is_named(index in 0..REQUIRED_KEYS.len(), blank in any::<bool>()) {
        let missing = REQUIRED_KEYS[index];
        let result = ProviderConfig::from_lookup(|key| {
            if key == missing {
                blank.then(String::new)
            } else {
                Some("value".to_string())
            }
        });
        match result {
            Err(ProviderError::MissingConfiguration { key }) => prop_assert_eq!(key, missing),
            other => prop_assert!(false, "unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn prop_strip_cidr_keeps_address(a in any::<u8>(), b in any::<u8>(), c in any::<u8>(), d in any::<u8>(), prefix in 0u8..=32) {
        let address = format!("{a}.{b}.{c}.{d}");
        let with_suffix = format!("{address}/{prefix}");
        prop_assert_eq!(strip_cidr(&with_suffix), address.as_str());
        prop_assert_eq!(strip_cidr(&address), address.as_str());
    }
}
