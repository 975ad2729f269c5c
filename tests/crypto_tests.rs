//! Integration tests for the HoneyVault crypto module.

use honeyvault::crypto::kdf::SALT_LEN;
use honeyvault::crypto::{
    decrypt, decrypt_with_key, derive_master_key_with_params, encrypt, encrypt_with_key,
    generate_key, generate_salt, Argon2Params, MasterKey, ENTRY_KEY_LEN,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const FAST: Argon2Params = Argon2Params {
    memory_kib: 8192,
    iterations: 1,
    parallelism: 1,
};

// ---------------------------------------------------------------------------
// Entry encryption
// ---------------------------------------------------------------------------

#[test]
fn entry_value_opens_only_with_its_key() {
    let mut rng = StdRng::seed_from_u64(5);
    let key = generate_key(&mut rng, ENTRY_KEY_LEN);
    let other = generate_key(&mut rng, ENTRY_KEY_LEN);

    let sealed = encrypt_with_key(&key, "mySecretValue").expect("encrypt");
    assert_eq!(decrypt_with_key(&key, &sealed).unwrap(), "mySecretValue");
    assert!(decrypt_with_key(&other, &sealed).is_err());
}

#[test]
fn entry_encryption_is_randomized() {
    let sealed1 = encrypt_with_key("k".repeat(20).as_str(), "same").unwrap();
    let sealed2 = encrypt_with_key("k".repeat(20).as_str(), "same").unwrap();
    assert_ne!(sealed1, sealed2);
}

#[test]
fn raw_encryption_detects_tampering() {
    let key = [0xABu8; 32];
    let mut ct = encrypt(&key, b"hello").unwrap();
    assert_eq!(decrypt(&key, &ct).unwrap(), b"hello");

    let last = ct.len() - 1;
    ct[last] ^= 0x01;
    assert!(decrypt(&key, &ct).is_err());
}

// ---------------------------------------------------------------------------
// Master key stretching
// ---------------------------------------------------------------------------

#[test]
fn master_key_verifier_distinguishes_keys() {
    let mut rng = StdRng::seed_from_u64(8);
    let salt = generate_salt(&mut rng);
    assert_eq!(salt.len(), SALT_LEN);

    let right = MasterKey::new(derive_master_key_with_params(b"m@ster", &salt, &FAST).unwrap());
    let again = MasterKey::new(derive_master_key_with_params(b"m@ster", &salt, &FAST).unwrap());
    let wrong = MasterKey::new(derive_master_key_with_params(b"m@ster!", &salt, &FAST).unwrap());

    let verifier = right.derive_verifier().unwrap();
    assert!(again.matches_verifier(&verifier).unwrap());
    assert!(!wrong.matches_verifier(&verifier).unwrap());
}

#[test]
fn salts_differ_between_draws() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_ne!(generate_salt(&mut rng), generate_salt(&mut rng));
}

// ---------------------------------------------------------------------------
// Key generation
// ---------------------------------------------------------------------------

#[test]
fn generated_keys_are_alphanumeric() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..50 {
        let key = generate_key(&mut rng, ENTRY_KEY_LEN);
        assert_eq!(key.len(), ENTRY_KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
