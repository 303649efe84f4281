use crate::*;
use num_traits::Zero;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

const MAX_SAMPLING_ATTEMPTS: usize = 128;

/// Source of all randomness used by a protocol party.
///
/// Seeding is only meant for reproducible simulations and tests.
pub struct RandomGenerator {
    rng: ChaCha20Rng,
}

impl RandomGenerator {
    pub fn from_entropy() -> Self {
        RandomGenerator {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        RandomGenerator {
            rng: ChaCha20Rng::from_seed(seed),
        }
    }

    /// Derive an independent generator, for handing to another party
    pub fn fork(&mut self) -> Self {
        let mut seed = [0u8; 32];
        self.rng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Uniform random integer in `[0, n)`
    pub fn random_in_zq(&mut self, n: &BigUint) -> BigUint {
        if n.is_zero() {
            return BigUint::zero();
        }
        let bits = n.bits() as usize;
        for _ in 0..MAX_SAMPLING_ATTEMPTS {
            let x = self.random_bits(bits);
            if &x < n {
                return x;
            }
        }
        // n >= 2^(bits-1), so one fewer bit is always in range
        self.random_bits(bits - 1)
    }

    /// Uniform random integer in `[1, n)`
    pub fn random_nonzero_in_zq(&mut self, n: &BigUint) -> BigUint {
        let upper = n - 1u32;
        self.random_in_zq(&upper) + 1u32
    }

    /// Uniform random element of the encryption group's prime-order subgroup
    pub fn random_in_gq(&mut self, group: &EncryptionGroup) -> BigUint {
        let r = self.random_in_zq(&group.q);
        group.g.modpow(&r, &group.p)
    }

    /// Uniform random integer in `[0, 2^bits)`
    pub fn random_bits(&mut self, bits: usize) -> BigUint {
        let mut bytes = self.random_bytes((bits + 7) / 8);
        let excess = bytes.len() * 8 - bits;
        if let Some(first) = bytes.first_mut() {
            *first &= 0xffu8.checked_shr(excess as u32).unwrap_or(0);
        }
        to_integer(&bytes)
    }

    pub fn random_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        self.rng.fill_bytes(&mut bytes);
        bytes
    }

    /// Uniform random index in `[0, n)`
    pub fn random_index(&mut self, n: usize) -> usize {
        use rand::Rng;
        self.rng.gen_range(0, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_generators_are_reproducible() {
        let mut a = RandomGenerator::from_seed([7u8; 32]);
        let mut b = RandomGenerator::from_seed([7u8; 32]);
        let n = BigUint::from(1_000_000_007u64);
        for _ in 0..10 {
            assert_eq!(a.random_in_zq(&n), b.random_in_zq(&n));
        }
        assert_eq!(a.random_bytes(16), b.random_bytes(16));
    }

    #[test]
    fn ranges() {
        let mut rng = RandomGenerator::from_seed([1u8; 32]);
        let n = BigUint::from(5u32);
        for _ in 0..100 {
            assert!(rng.random_in_zq(&n) < n);
            let x = rng.random_nonzero_in_zq(&n);
            assert!(!x.is_zero() && x < n);
            assert!(rng.random_bits(8) < BigUint::from(256u32));
            assert!(rng.random_index(3) < 3);
        }
    }

    #[test]
    fn group_elements() {
        let params = PublicParameters::testing(1).unwrap();
        let mut rng = RandomGenerator::from_seed([2u8; 32]);
        for _ in 0..10 {
            let x = rng.random_in_gq(&params.encryption_group);
            assert!(is_member(&x, &params.encryption_group));
        }
    }
}
