use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Alphabet for physical resource id suffixes.
pub const PHYSICAL_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the random part of a physical resource id.
pub const PHYSICAL_ID_SUFFIX_LEN: usize = 8;

const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draw `len` characters from `alphabet`.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize, alphabet: &[u8]) -> String {
    (0..len)
        .filter_map(|_| alphabet.choose(rng).map(|b| *b as char))
        .collect()
}

/// Generate a physical resource id: `prefix` followed by a random suffix.
///
/// When `seed` is given (the framework's request id), the suffix is derived from it,
/// so a replayed event yields the same id.
pub fn generate_physical_id(prefix: &str, seed: Option<&str>) -> String {
    let suffix = match seed {
        Some(seed) => {
            let digest = Sha256::digest(seed.as_bytes());
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&digest[..8]);
            let mut rng = StdRng::seed_from_u64(u64::from_le_bytes(bytes));
            random_string(&mut rng, PHYSICAL_ID_SUFFIX_LEN, PHYSICAL_ID_ALPHABET)
        }
        None => random_string(
            &mut rand::thread_rng(),
            PHYSICAL_ID_SUFFIX_LEN,
            PHYSICAL_ID_ALPHABET,
        ),
    };
    format!("{prefix}{suffix}")
}

/// Generate an alphanumeric password containing at least one upper-case letter,
/// one lower-case letter and one digit.
pub fn generate_password(len: usize) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let candidate = random_string(&mut rng, len, PASSWORD_ALPHABET);
        if len < 3 || is_strong(&candidate) {
            return candidate;
        }
    }
}

fn is_strong(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}
