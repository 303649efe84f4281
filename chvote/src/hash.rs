use crate::*;
use digest::Digest;
use sha2::Sha512;

/// A value that can be hashed with the recursive hash function.
///
/// The set of shapes is closed so the canonical encoding is exhaustive:
///  - `Text` hashes its UTF-8 bytes
///  - `Integer` hashes its minimal big-endian encoding (zero is the empty array)
///  - `Bytes` hashes the bytes themselves
///  - `Tuple` hashes the concatenation of the hashes of its elements
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashValue {
    Text(String),
    Integer(BigUint),
    Bytes(Vec<u8>),
    Tuple(Vec<HashValue>),
}

impl HashValue {
    pub fn tuple<I: IntoIterator<Item = HashValue>>(values: I) -> Self {
        HashValue::Tuple(values.into_iter().collect())
    }

    pub fn integers<'a, I: IntoIterator<Item = &'a BigUint>>(values: I) -> Self {
        HashValue::Tuple(values.into_iter().cloned().map(HashValue::Integer).collect())
    }
}

impl From<&str> for HashValue {
    fn from(s: &str) -> Self {
        HashValue::Text(s.to_owned())
    }
}

impl From<String> for HashValue {
    fn from(s: String) -> Self {
        HashValue::Text(s)
    }
}

impl From<BigUint> for HashValue {
    fn from(x: BigUint) -> Self {
        HashValue::Integer(x)
    }
}

impl From<&BigUint> for HashValue {
    fn from(x: &BigUint) -> Self {
        HashValue::Integer(x.clone())
    }
}

impl From<usize> for HashValue {
    fn from(x: usize) -> Self {
        HashValue::Integer(BigUint::from(x))
    }
}

impl From<Vec<u8>> for HashValue {
    fn from(bytes: Vec<u8>) -> Self {
        HashValue::Bytes(bytes)
    }
}

impl From<&[u8]> for HashValue {
    fn from(bytes: &[u8]) -> Self {
        HashValue::Bytes(bytes.to_vec())
    }
}

/// Recursive hash of `value`, truncated to `length` bytes (at most 64)
pub fn rec_hash(value: &HashValue, length: usize) -> Vec<u8> {
    let digest = match value {
        HashValue::Text(s) => Sha512::digest(s.as_bytes()),
        HashValue::Integer(x) => Sha512::digest(&to_byte_array(x)),
        HashValue::Bytes(bytes) => Sha512::digest(bytes),
        HashValue::Tuple(values) => {
            let mut hasher = Sha512::new();
            for v in values {
                hasher.update(&rec_hash(v, length));
            }
            hasher.finalize()
        }
    };
    truncate(&digest, length)
}

/// Fiat-Shamir challenge: the hash of the public values and the commitments, reduced modulo `modulus`
pub fn get_nizkp_challenge(
    public_values: HashValue,
    commitments: HashValue,
    modulus: &BigUint,
    length: usize,
) -> BigUint {
    let value = HashValue::Tuple(vec![public_values, commitments]);
    to_integer(&rec_hash(&value, length)) % modulus
}

/// `n` independent challenges derived from the public values, each reduced modulo `modulus`
pub fn get_challenges(
    n: usize,
    public_values: HashValue,
    modulus: &BigUint,
    length: usize,
) -> Vec<BigUint> {
    let seed = rec_hash(&public_values, length);
    (0..n)
        .map(|i| {
            let value = HashValue::Tuple(vec![HashValue::Bytes(seed.clone()), HashValue::from(i)]);
            to_integer(&rec_hash(&value, length)) % modulus
        })
        .collect()
}
