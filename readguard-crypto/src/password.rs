//! Random passwords for new packages.

use rand::Rng;

/// Letters without `I`, `O`, `l`, `o`; digits without `0`, `1`; a few symbols.
pub const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789!@#$%&*";

/// Length of generated package passwords.
pub const PASSWORD_LENGTH: usize = 12;

/// Generates a package password from [`PASSWORD_ALPHABET`].
pub fn generate_password() -> String {
    generate_password_with_length(PASSWORD_LENGTH)
}

/// Generates a password of `length` characters using the thread-local CSPRNG.
pub fn generate_password_with_length(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| PASSWORD_ALPHABET[rng.random_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect()
}
