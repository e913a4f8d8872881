//! Built-in common-password blocklist.
//!
//! Entries are lowercase. The table is copied into a
//! [`PasswordPolicy`](super::policy::PasswordPolicy) when one is built from
//! defaults; validators never mutate it.

/// Passwords that appear at the top of every public breach corpus.
pub const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "password!",
    "passw0rd",
    "p@ssw0rd",
    "p@ssword",
    "123456",
    "1234567",
    "12345678",
    "123456789",
    "1234567890",
    "12345",
    "1234",
    "111111",
    "000000",
    "123123",
    "654321",
    "666666",
    "121212",
    "qwerty",
    "qwerty123",
    "qwertyuiop",
    "asdfghjkl",
    "1q2w3e4r",
    "1qaz2wsx",
    "zaq12wsx",
    "abc123",
    "abcd1234",
    "letmein",
    "letmein1",
    "welcome",
    "welcome1",
    "welcome123",
    "admin",
    "admin123",
    "administrator",
    "root",
    "toor",
    "changeme",
    "default",
    "guest",
    "login",
    "master",
    "secret",
    "iloveyou",
    "monkey",
    "dragon",
    "football",
    "baseball",
    "superman",
    "batman",
    "trustno1",
    "sunshine",
    "princess",
    "shadow",
    "michael",
    "jennifer",
    "computer",
    "starwars",
    "whatever",
    "freedom",
    "hello123",
    "summer2024",
    "winter2024",
    "spring2024",
    "autumn2024",
    "company123",
    "firewall",
    "firewall123",
    "paloalto",
    "paloalto1",
];

/// Owned copy of [`COMMON_PASSWORDS`], for seeding a policy.
#[must_use]
pub fn default_blocklist() -> Vec<String> {
    COMMON_PASSWORDS.iter().map(|p| (*p).to_string()).collect()
}
