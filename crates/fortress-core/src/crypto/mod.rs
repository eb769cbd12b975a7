//! Cryptographic operations for Fortress.
//!
//! This module provides the at-rest protection for secure notes using
//! well-audited libraries:
//! - **AES-256-GCM** (`aes-gcm`): authenticated encryption of note content
//! - **Argon2id** (`argon2`): salted one-way hashing of vault PINs
//!
//! ## Security Model
//!
//! - One 32-byte data key per process, derived from configuration
//! - Every encryption uses a fresh random 96-bit IV
//! - The PIN only gates visibility; it never encrypts anything
//! - PINs are stored as Argon2id PHC strings, never in recoverable form
//! - Key material is zeroized on drop and redacted from `Debug`
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft or inspection of the note store (secure note bodies are ciphertext)
//! - Silent tampering with stored ciphertext (GCM tag verification)
//!
//! We do NOT defend against:
//! - Compromise of the configured secret passphrase
//! - Access to an unlocked session / process memory
//! - Online PIN guessing (there is no attempt throttling)

pub mod envelope;
pub mod key;
pub mod pin;

pub use envelope::{ContentCodec, Decrypted, DecryptFailure, DECRYPTION_FAILED_SENTINEL};
pub use key::{SecretKey, DEMO_PASSPHRASE};
pub use pin::{hash_pin, validate_pin, PinVerifier, DEFAULT_PIN, MIN_PIN_LENGTH};
