use crate::*;
use num_integer::Integer;
use num_prime::nt_funcs::is_prime;
use num_prime::PrimalityTestConfig;
use num_traits::{One, Zero};

/// Modular arithmetic on non-negative integers
pub trait ModularArithmetic {
    fn mod_add(&self, other: &BigUint, modulus: &BigUint) -> BigUint;
    fn mod_sub(&self, other: &BigUint, modulus: &BigUint) -> BigUint;
    fn mod_mul(&self, other: &BigUint, modulus: &BigUint) -> BigUint;

    /// Multiplicative inverse, or None if it does not exist
    fn mod_inverse(&self, modulus: &BigUint) -> Option<BigUint>;

    /// `self^(-exponent) mod modulus`, or None if `self` is not invertible
    fn mod_pow_neg(&self, exponent: &BigUint, modulus: &BigUint) -> Option<BigUint>;
}

impl ModularArithmetic for BigUint {
    fn mod_add(&self, other: &BigUint, modulus: &BigUint) -> BigUint {
        (self + other) % modulus
    }

    fn mod_sub(&self, other: &BigUint, modulus: &BigUint) -> BigUint {
        let a = self % modulus;
        let b = other % modulus;
        if a >= b {
            a - b
        } else {
            modulus - (b - a)
        }
    }

    fn mod_mul(&self, other: &BigUint, modulus: &BigUint) -> BigUint {
        (self * other) % modulus
    }

    fn mod_inverse(&self, modulus: &BigUint) -> Option<BigUint> {
        let x = self % modulus;
        if x.is_zero() {
            return None;
        }
        x.modinv(modulus)
    }

    fn mod_pow_neg(&self, exponent: &BigUint, modulus: &BigUint) -> Option<BigUint> {
        self.modpow(exponent, modulus).mod_inverse(modulus)
    }
}

/// Product of all values modulo `modulus`. The empty product is one.
pub fn mod_product<'a, I: IntoIterator<Item = &'a BigUint>>(values: I, modulus: &BigUint) -> BigUint {
    values
        .into_iter()
        .fold(BigUint::one() % modulus, |acc, x| acc.mod_mul(x, modulus))
}

/// Sum of all values modulo `modulus`
pub fn mod_sum<'a, I: IntoIterator<Item = &'a BigUint>>(values: I, modulus: &BigUint) -> BigUint {
    values
        .into_iter()
        .fold(BigUint::zero(), |acc, x| acc.mod_add(x, modulus))
}

/// Jacobi symbol `(a/n)` for odd `n`
pub fn jacobi_symbol(a: &BigUint, n: &BigUint) -> i8 {
    debug_assert!(n.is_odd());

    let three = BigUint::from(3u32);
    let five = BigUint::from(5u32);
    let four = BigUint::from(4u32);
    let eight = BigUint::from(8u32);

    let mut a = a % n;
    let mut n = n.clone();
    let mut t: i8 = 1;

    while !a.is_zero() {
        while a.is_even() {
            a >>= 1;
            let r = &n % &eight;
            if r == three || r == five {
                t = -t;
            }
        }
        std::mem::swap(&mut a, &mut n);
        if &a % &four == three && &n % &four == three {
            t = -t;
        }
        a %= &n;
    }

    if n.is_one() {
        t
    } else {
        0
    }
}

/// True iff `x` is an element of the encryption group's prime-order subgroup of quadratic residues
pub fn is_member(x: &BigUint, group: &EncryptionGroup) -> bool {
    !x.is_zero() && x < &group.p && jacobi_symbol(x, &group.p) == 1
}

/// True iff `x` is an element of the identification group's order-q_circ subgroup
pub fn is_identification_member(x: &BigUint, group: &IdentificationGroup) -> bool {
    !x.is_zero() && x < &group.p_circ && x.modpow(&group.q_circ, &group.p_circ).is_one()
}

/// Probabilistic primality test
pub fn is_probable_prime(x: &BigUint) -> bool {
    is_prime(x, Some(PrimalityTestConfig::default())).probably()
}

/// The first `n` primes that are members of the encryption group, in increasing order
pub fn get_primes(n: usize, group: &EncryptionGroup) -> Result<Vec<BigUint>, Error> {
    let mut primes = Vec::with_capacity(n);
    let mut x = BigUint::one();

    while primes.len() < n {
        x += 1u32;
        if x >= group.p {
            return Err(Error::NotEnoughPrimes {
                requested: n,
                found: primes.len(),
            });
        }
        if is_member(&x, group) && is_probable_prime(&x) {
            primes.push(x.clone());
        }
    }

    debug!("generated {} primes in the encryption group", n);
    Ok(primes)
}

/// The primes associated with the given 1-based, strictly increasing selections
pub fn get_selected_primes(selections: &[usize], group: &EncryptionGroup) -> Result<Vec<BigUint>, Error> {
    for window in selections.windows(2) {
        if window[0] >= window[1] {
            return Err(Error::InvalidSelection(
                "selections must be strictly increasing".to_owned(),
            ));
        }
    }
    let max = match selections.last() {
        Some(max) => *max,
        None => return Ok(vec![]),
    };
    if selections[0] == 0 {
        return Err(Error::InvalidSelection("selections are 1-based".to_owned()));
    }

    let primes = get_primes(max, group)?;
    Ok(selections.iter().map(|s| primes[s - 1].clone()).collect())
}
