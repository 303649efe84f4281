use crate::*;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An authority's partial decryptions `b_i^sk` of the final shuffle
pub fn get_partial_decryptions(
    encryptions: &[Encryption],
    secret_key: &BigUint,
    group: &EncryptionGroup,
) -> Vec<BigUint> {
    #[cfg(not(feature = "parallel"))]
    let iter = encryptions.iter();
    #[cfg(feature = "parallel")]
    let iter = encryptions.par_iter();

    iter.map(|e| e.b.modpow(secret_key, &group.p)).collect()
}

pub(crate) fn decryption_public_values(
    public_key_share: &BigUint,
    encryptions: &[Encryption],
    partial_decryptions: &[BigUint],
) -> HashValue {
    HashValue::tuple(vec![
        HashValue::from(public_key_share),
        HashValue::integers(encryptions.iter().map(|e| &e.b)),
        HashValue::integers(partial_decryptions),
    ])
}

/// Prove that the same secret key underlies the public key share and every partial decryption
pub fn gen_decryption_proof(
    secret_key: &BigUint,
    public_key_share: &BigUint,
    encryptions: &[Encryption],
    partial_decryptions: &[BigUint],
    params: &PublicParameters,
    rng: &mut RandomGenerator,
) -> NonInteractiveZkp {
    let group = &params.encryption_group;

    let omega = rng.random_in_zq(&group.q);
    let mut t = Vec::with_capacity(encryptions.len() + 1);
    t.push(group.g.modpow(&omega, &group.p));
    t.extend(encryptions.iter().map(|e| e.b.modpow(&omega, &group.p)));

    let c = get_nizkp_challenge(
        decryption_public_values(public_key_share, encryptions, partial_decryptions),
        HashValue::integers(&t),
        &group.q,
        params.hash_length(),
    );
    let s = omega.mod_add(&c.mod_mul(secret_key, &group.q), &group.q);

    NonInteractiveZkp { t, s: vec![s] }
}

/// Verify a decryption proof: `t_0 = pk_j^-c * g^s` and `t_i = b'_i^-c * b_i^s`
pub fn check_decryption_proof(
    pi: &NonInteractiveZkp,
    public_key_share: &BigUint,
    encryptions: &[Encryption],
    partial_decryptions: &[BigUint],
    params: &PublicParameters,
) -> bool {
    let group = &params.encryption_group;
    let n = encryptions.len();

    if pi.t.len() != n + 1 || pi.s.len() != 1 || partial_decryptions.len() != n {
        return false;
    }
    let s = &pi.s[0];
    if s >= &group.q {
        return false;
    }
    if !is_member(public_key_share, group)
        || !partial_decryptions.iter().all(|b| is_member(b, group))
        || !pi.t.iter().all(|t| is_member(t, group))
    {
        return false;
    }

    let c = get_nizkp_challenge(
        decryption_public_values(public_key_share, encryptions, partial_decryptions),
        HashValue::integers(&pi.t),
        &group.q,
        params.hash_length(),
    );

    let t_0 = match public_key_share.mod_pow_neg(&c, &group.p) {
        Some(v) => v.mod_mul(&group.g.modpow(s, &group.p), &group.p),
        None => return false,
    };
    if t_0 != pi.t[0] {
        return false;
    }

    (0..n).all(|i| match partial_decryptions[i].mod_pow_neg(&c, &group.p) {
        Some(v) => v.mod_mul(&encryptions[i].b.modpow(s, &group.p), &group.p) == pi.t[i + 1],
        None => false,
    })
}

/// Verify every authority's decryption proof.
///
/// Vectors are indexed by authority. The first failing authority is reported.
pub fn check_decryption_proofs(
    proofs: &[NonInteractiveZkp],
    public_key_shares: &[BigUint],
    encryptions: &[Encryption],
    partial_decryptions: &[Vec<BigUint>],
    params: &PublicParameters,
) -> Result<(), ValidationError> {
    let s = public_key_shares.len();
    if proofs.len() != s || partial_decryptions.len() != s {
        let j = proofs.len().min(partial_decryptions.len());
        return Err(ValidationError::InvalidDecryptionProof(j));
    }

    #[cfg(not(feature = "parallel"))]
    let iter = 0..s;
    #[cfg(feature = "parallel")]
    let iter = (0..s).into_par_iter();

    let valid: Vec<bool> = iter
        .map(|j| {
            check_decryption_proof(
                &proofs[j],
                &public_key_shares[j],
                encryptions,
                &partial_decryptions[j],
                params,
            )
        })
        .collect();

    match valid.iter().position(|ok| !ok) {
        Some(j) => {
            warn!("decryption proof of authority {} failed to verify", j);
            Err(ValidationError::InvalidDecryptionProof(j))
        }
        None => Ok(()),
    }
}

/// Combine all partial decryptions: `m_i = a_i * (∏_j b'_{j,i})^-1`
pub fn get_decryptions(
    encryptions: &[Encryption],
    partial_decryptions: &[Vec<BigUint>],
    group: &EncryptionGroup,
) -> Result<Vec<BigUint>, Error> {
    if partial_decryptions.iter().any(|b| b.len() != encryptions.len()) {
        return Err(Error::InvalidState("partial decryptions do not cover the final shuffle"));
    }

    encryptions
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let shared = mod_product(partial_decryptions.iter().map(|b| &b[i]), &group.p);
            let inverse = shared
                .mod_inverse(&group.p)
                .ok_or(Error::InvalidState("partial decryption is not invertible"))?;
            Ok(e.a.mod_mul(&inverse, &group.p))
        })
        .collect()
}
