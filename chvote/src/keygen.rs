use crate::*;

/// An authority's share of the ElGamal election key
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    #[serde(with = "BigUintHex")]
    pub secret_key: BigUint,
    #[serde(with = "BigUintHex")]
    pub public_key: BigUint,
}

/// Generate a key pair with a secret key uniform in `[0, q)`
pub fn generate_key_pair(group: &EncryptionGroup, rng: &mut RandomGenerator) -> KeyPair {
    let secret_key = rng.random_in_zq(&group.q);
    let public_key = group.g.modpow(&secret_key, &group.p);
    KeyPair {
        secret_key,
        public_key,
    }
}

/// Combine the authorities' public key shares into the election public key.
///
/// Decryption requires every share's secret key; there is no threshold.
pub fn get_public_key(public_key_shares: &[BigUint], group: &EncryptionGroup) -> BigUint {
    mod_product(public_key_shares, &group.p)
}
