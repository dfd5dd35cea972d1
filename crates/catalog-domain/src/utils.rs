//! Small stateless helpers shared across layers.

use sha2::{Digest, Sha256};

/// Short, stable, filesystem-derived suffix used by the `scan` handler's
/// name-disambiguation cascade (`base` -> `base-parent` -> `base-parent-N`
/// -> `base-<hash>`, §4.6) once the numbered forms are exhausted.
#[must_use]
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)[..8].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_is_deterministic_and_eight_chars() {
        let a = short_hash("/home/user/projects/demoapp");
        let b = short_hash("/home/user/projects/demoapp");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }

    #[test]
    fn short_hash_differs_per_input() {
        assert_ne!(short_hash("a"), short_hash("b"));
    }
}
