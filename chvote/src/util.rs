use crate::*;
use num_traits::{One, ToPrimitive, Zero};

/// Minimal big-endian byte encoding of an integer. Zero encodes to the empty array.
pub fn to_byte_array(x: &BigUint) -> Vec<u8> {
    if x.is_zero() {
        return vec![];
    }
    x.to_bytes_be()
}

/// Big-endian encoding of an integer, left-padded with zeroes to exactly `len` bytes
pub fn to_byte_array_len(x: &BigUint, len: usize) -> Result<Vec<u8>, Error> {
    let bytes = to_byte_array(x);
    if bytes.len() > len {
        return Err(Error::ValueTooLarge(len));
    }

    let mut padded = vec![0u8; len - bytes.len()];
    padded.extend_from_slice(&bytes);
    Ok(padded)
}

/// Big-endian interpretation of a byte array
pub fn to_integer(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// The first `len` bytes of `bytes`
pub fn truncate(bytes: &[u8], len: usize) -> Vec<u8> {
    bytes[..len.min(bytes.len())].to_vec()
}

/// Bytewise XOR of two equal-length arrays
pub fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

/// XOR of all given byte arrays. All arrays must have the same length.
pub fn xor_all<'a, I>(arrays: I, len: usize) -> Vec<u8>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    arrays
        .into_iter()
        .fold(vec![0u8; len], |acc, bytes| xor(&acc, bytes))
}

/// The smallest `k` such that `alphabet_size^k >= upper_bound`
pub fn code_length(upper_bound: &BigUint, alphabet_size: usize) -> usize {
    let base = BigUint::from(alphabet_size);
    let mut k = 0;
    let mut capacity = BigUint::one();
    while &capacity < upper_bound {
        capacity *= &base;
        k += 1;
    }
    k
}

/// Render `x` as a string of exactly `k` characters over `alphabet`, most significant character first
pub fn to_code_string(x: &BigUint, k: usize, alphabet: &[char]) -> Result<String, Error> {
    let base = BigUint::from(alphabet.len());
    let mut chars = Vec::with_capacity(k);
    let mut rest = x.clone();

    for _ in 0..k {
        let digit = (&rest % &base).to_usize().unwrap_or_default();
        chars.push(alphabet[digit]);
        rest /= &base;
    }
    if !rest.is_zero() {
        return Err(Error::InvalidCode(format!(
            "value does not fit into {} characters",
            k
        )));
    }

    chars.reverse();
    Ok(chars.into_iter().collect())
}

/// Parse a string produced by `to_code_string`
pub fn from_code_string(s: &str, alphabet: &[char]) -> Result<BigUint, Error> {
    let base = BigUint::from(alphabet.len());
    let mut x = BigUint::zero();

    for c in s.chars() {
        let digit = alphabet
            .iter()
            .position(|a| *a == c)
            .ok_or_else(|| Error::InvalidCode(format!("character '{}' is not in the code alphabet", c)))?;
        x = x * &base + BigUint::from(digit);
    }
    Ok(x)
}

/// Render a byte array as a code string of the length needed for any array of the same size
pub fn bytes_to_code_string(bytes: &[u8], alphabet: &[char]) -> Result<String, Error> {
    let upper_bound = BigUint::one() << (8 * bytes.len());
    let k = code_length(&upper_bound, alphabet.len());
    to_code_string(&to_integer(bytes), k, alphabet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet() -> Vec<char> {
        "0123456789ABCDEF".chars().collect()
    }

    #[test]
    fn byte_array_conversion() {
        assert!(to_byte_array(&BigUint::zero()).is_empty());
        assert_eq!(to_byte_array(&BigUint::from(256u32)), vec![1, 0]);
        assert_eq!(
            to_byte_array_len(&BigUint::from(5u32), 3).unwrap(),
            vec![0, 0, 5]
        );
        assert!(to_byte_array_len(&BigUint::from(65536u32), 2).is_err());
        assert_eq!(to_integer(&[1, 0]), BigUint::from(256u32));
        assert_eq!(to_integer(&[]), BigUint::zero());
    }

    #[test]
    fn xor_and_truncate() {
        assert_eq!(xor(&[0xff, 0x0f], &[0x0f, 0x0f]), vec![0xf0, 0x00]);
        let arrays: Vec<Vec<u8>> = vec![vec![1, 2], vec![3, 4], vec![1, 2]];
        assert_eq!(xor_all(arrays.iter().map(|a| a.as_slice()), 2), vec![3, 4]);
        assert_eq!(truncate(&[1, 2, 3, 4], 2), vec![1, 2]);
    }

    #[test]
    fn code_strings() {
        let alphabet = alphabet();
        assert_eq!(code_length(&BigUint::from(256u32), 16), 2);
        assert_eq!(code_length(&BigUint::from(257u32), 16), 3);

        let code = to_code_string(&BigUint::from(255u32), 4, &alphabet).unwrap();
        assert_eq!(code, "00FF");
        assert_eq!(
            from_code_string(&code, &alphabet).unwrap(),
            BigUint::from(255u32)
        );

        assert!(to_code_string(&BigUint::from(256u32), 2, &alphabet).is_err());
        assert!(from_code_string("00FG", &alphabet).is_err());

        assert_eq!(bytes_to_code_string(&[0xab, 0x01], &alphabet).unwrap(), "AB01");
    }
}
