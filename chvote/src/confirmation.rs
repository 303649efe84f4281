use crate::*;

/// A voter's confirmation: the public confirmation credential and a proof of knowledge of its secret
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    #[serde(with = "BigUintHex")]
    pub y_circ: BigUint,
    pub pi: NonInteractiveZkp,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationEntry {
    pub voter_index: usize,
    pub confirmation: Confirmation,
}

/// What an authority releases once a voter has confirmed
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FinalizationCodePart {
    #[serde(with = "hex_serde")]
    pub f: Vec<u8>,

    /// The randomizations the authority used when answering the voter's OT query
    #[serde(with = "biguint_vec_hex")]
    pub randomizations: Vec<BigUint>,
}

/// Generate the confirmation from the confirmation code and the points received from every authority.
///
/// `point_matrix[j]` holds the points decoded from authority `j`, in selection order.
pub fn gen_confirmation(
    confirmation_code: &str,
    point_matrix: &[Vec<Point>],
    k_i: &[usize],
    params: &PublicParameters,
    rng: &mut RandomGenerator,
) -> Result<Confirmation, Error> {
    let id_group = &params.identification_group;

    let mut y = from_code_string(confirmation_code, &params.alphabet())?;
    for (j, points) in point_matrix.iter().enumerate() {
        let values = get_values(points, k_i, &params.prime_field)
            .ok_or(ValidationError::InvalidObliviousTransferResponse(j))?;
        y += zero_images_hash(&values, params);
    }
    let y = y % &id_group.q_circ;
    let y_circ = id_group.g_circ.modpow(&y, &id_group.p_circ);

    let pi = gen_confirmation_proof(&y, &y_circ, params, rng);
    Ok(Confirmation { y_circ, pi })
}

/// Interpolate each election's polynomial at zero from the voter's points.
///
/// Returns `None` if the points are inconsistent with `k_i`.
pub fn get_values(points: &[Point], k_i: &[usize], field: &PrimeField) -> Option<Vec<BigUint>> {
    if points.len() != k_i.iter().sum::<usize>() {
        return None;
    }

    let mut offset = 0;
    let mut values = Vec::with_capacity(k_i.len());
    for k_ij in k_i {
        values.push(get_value(&points[offset..offset + k_ij], field)?);
        offset += k_ij;
    }
    Some(values)
}

/// Schnorr proof of knowledge of `y` with `y_circ = g_circ^y`
pub fn gen_confirmation_proof(
    y: &BigUint,
    y_circ: &BigUint,
    params: &PublicParameters,
    rng: &mut RandomGenerator,
) -> NonInteractiveZkp {
    let id_group = &params.identification_group;

    let omega = rng.random_in_zq(&id_group.q_circ);
    let t = id_group.g_circ.modpow(&omega, &id_group.p_circ);
    let c = get_nizkp_challenge(
        HashValue::from(y_circ),
        HashValue::from(&t),
        &id_group.q_circ,
        params.hash_length(),
    );
    let s = omega.mod_add(&(&c * y), &id_group.q_circ);

    NonInteractiveZkp {
        t: vec![t],
        s: vec![s],
    }
}

pub fn check_confirmation_proof(
    pi: &NonInteractiveZkp,
    y_circ: &BigUint,
    params: &PublicParameters,
) -> bool {
    let id_group = &params.identification_group;

    if pi.t.len() != 1 || pi.s.len() != 1 || pi.s[0] >= id_group.q_circ {
        return false;
    }

    let c = get_nizkp_challenge(
        HashValue::from(y_circ),
        HashValue::from(&pi.t[0]),
        &id_group.q_circ,
        params.hash_length(),
    );
    let y_circ_neg_c = match y_circ.mod_pow_neg(&c, &id_group.p_circ) {
        Some(v) => v,
        None => return false,
    };
    let t = y_circ_neg_c.mod_mul(
        &id_group.g_circ.modpow(&pi.s[0], &id_group.p_circ),
        &id_group.p_circ,
    );

    pi.t[0] == t
}

/// Validate a confirmation
pub fn check_confirmation(
    voter_index: usize,
    confirmation: &Confirmation,
    has_ballot: bool,
    already_confirmed: bool,
    public_credentials: &[PublicCredentials],
    params: &PublicParameters,
) -> Result<(), ValidationError> {
    let credentials = public_credentials
        .get(voter_index)
        .ok_or(ValidationError::UnknownVoter(voter_index))?;
    if !has_ballot {
        return Err(ValidationError::BallotNotFound(voter_index));
    }
    if already_confirmed {
        return Err(ValidationError::DuplicateConfirmation(voter_index));
    }
    if confirmation.y_circ != credentials.y_circ {
        return Err(ValidationError::CredentialMismatch(voter_index));
    }
    if !check_confirmation_proof(&confirmation.pi, &confirmation.y_circ, params) {
        return Err(ValidationError::InvalidConfirmationProof(voter_index));
    }
    Ok(())
}

/// An authority's finalization part for a voter whose ballot it accepted
pub fn get_finalization(secret: &SecretVoterData, ballot: &BallotEntry) -> FinalizationCodePart {
    FinalizationCodePart {
        f: secret.f.clone(),
        randomizations: ballot.randomizations.clone(),
    }
}

/// Combine all authorities' finalization parts into the finalization code
pub fn get_finalization_code(
    parts: &[FinalizationCodePart],
    params: &PublicParameters,
) -> Result<String, Error> {
    let length = params.finalization_code_length();
    if parts.iter().any(|part| part.f.len() != length) {
        return Err(Error::InvalidCode("finalization code part has the wrong length".to_owned()));
    }
    let f = xor_all(parts.iter().map(|part| part.f.as_slice()), length);
    bytes_to_code_string(&f, &params.alphabet())
}
