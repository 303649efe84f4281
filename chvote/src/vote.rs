use crate::*;
use hkdf::Hkdf;
use num_traits::One;
use sha2::Sha512;

const OT_MASK_INFO: &[u8] = b"chvote-ot";

/// Oblivious transfer query: one ElGamal-encrypted prime per selection, with its randomization
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ObliviousTransferQuery {
    #[serde(with = "biguint_vec_hex")]
    pub a: Vec<BigUint>,
    #[serde(with = "biguint_vec_hex")]
    pub r: Vec<BigUint>,
}

/// Fiat-Shamir transformed proof: commitments `t` and responses `s`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NonInteractiveZkp {
    #[serde(with = "biguint_vec_hex")]
    pub t: Vec<BigUint>,
    #[serde(with = "biguint_vec_hex")]
    pub s: Vec<BigUint>,
}

/// The ballot a voting client submits
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BallotAndQuery {
    /// Public voting credential, `g_circ^x`
    #[serde(with = "BigUintHex")]
    pub x_circ: BigUint,

    /// OT query, one ciphertext component per selection
    #[serde(with = "biguint_vec_hex")]
    pub a: Vec<BigUint>,

    /// `g^r` for the aggregated randomization `r`
    #[serde(with = "BigUintHex")]
    pub b: BigUint,

    pub pi: NonInteractiveZkp,
}

impl BallotAndQuery {
    /// The aggregated ciphertext component `a = ∏ a_i`
    pub fn aggregate(&self, group: &EncryptionGroup) -> BigUint {
        mod_product(&self.a, &group.p)
    }
}

/// A ballot together with the query randomizations the client keeps secret
#[derive(Clone, Debug)]
pub struct BallotQueryAndRand {
    pub ballot: BallotAndQuery,
    pub r: Vec<BigUint>,
}

/// An authority's answer to an OT query
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ObliviousTransferResponse {
    /// Re-randomized query, one per selection
    #[serde(with = "biguint_vec_hex")]
    pub b: Vec<BigUint>,

    /// Masked point encodings, one per candidate
    pub c: Vec<Vec<u8>>,

    /// `pk^beta_j`, one per election
    #[serde(with = "biguint_vec_hex")]
    pub d: Vec<BigUint>,
}

/// An accepted ballot as recorded by an authority
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BallotEntry {
    pub voter_index: usize,
    pub ballot: BallotAndQuery,

    /// The authority's per-election randomizations `beta_j`
    #[serde(with = "biguint_vec_hex")]
    pub randomizations: Vec<BigUint>,
}

/// Check that 1-based selections pick exactly the allowed number of candidates of each election
pub fn check_selections(
    selections: &[usize],
    election_set: &ElectionSet,
    voter_index: usize,
) -> Result<(), Error> {
    if voter_index >= election_set.voters.len() {
        return Err(Error::InvalidSelection(format!("unknown voter {}", voter_index)));
    }
    if selections.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidSelection(
            "selections must be strictly increasing".to_owned(),
        ));
    }
    if selections
        .iter()
        .any(|s| *s == 0 || *s > election_set.total_candidates())
    {
        return Err(Error::InvalidSelection("selection out of range".to_owned()));
    }

    let offsets = election_set.candidate_offsets();
    let counts = election_set.selection_counts(voter_index);
    for (j, election) in election_set.elections.iter().enumerate() {
        let range = offsets[j] + 1..=offsets[j] + election.number_of_candidates;
        let selected = selections.iter().filter(|s| range.contains(*s)).count();
        if selected != counts[j] {
            return Err(Error::InvalidSelection(format!(
                "election {} requires {} selections, got {}",
                j, counts[j], selected
            )));
        }
    }
    Ok(())
}

/// Generate a ballot for the given 1-based candidate selections
pub fn gen_ballot(
    voting_code: &str,
    selections: &[usize],
    public_key: &BigUint,
    params: &PublicParameters,
    rng: &mut RandomGenerator,
) -> Result<BallotQueryAndRand, Error> {
    let group = &params.encryption_group;
    let id_group = &params.identification_group;

    let x = from_code_string(voting_code, &params.alphabet())?;
    let x_circ = id_group.g_circ.modpow(&x, &id_group.p_circ);

    let u = get_selected_primes(selections, group)?;
    let m = u.iter().fold(BigUint::one(), |acc, u_i| acc * u_i);
    if m >= group.p {
        return Err(Error::IncompatibleParameters(
            "product of selected primes exceeds p".to_owned(),
        ));
    }

    let query = gen_query(&u, public_key, group, rng);
    let a = mod_product(&query.a, &group.p);
    let r = mod_sum(&query.r, &group.q);
    let b = group.g.modpow(&r, &group.p);

    let pi = gen_ballot_proof(&x, &m, &r, &x_circ, &a, &b, public_key, params, rng);

    Ok(BallotQueryAndRand {
        ballot: BallotAndQuery {
            x_circ,
            a: query.a,
            b,
            pi,
        },
        r: query.r,
    })
}

/// Encrypt each selected prime: `a_i = u_i * pk^r_i`
pub fn gen_query(
    u: &[BigUint],
    public_key: &BigUint,
    group: &EncryptionGroup,
    rng: &mut RandomGenerator,
) -> ObliviousTransferQuery {
    let (a, r): (Vec<BigUint>, Vec<BigUint>) = u
        .iter()
        .map(|u_i| {
            let r_i = rng.random_in_zq(&group.q);
            let a_i = u_i.mod_mul(&public_key.modpow(&r_i, &group.p), &group.p);
            (a_i, r_i)
        })
        .unzip();
    ObliviousTransferQuery { a, r }
}

/// Prove knowledge of `(x, m, r)` with `x_circ = g_circ^x`, `a = m * pk^r` and `b = g^r`
#[allow(clippy::too_many_arguments)]
pub fn gen_ballot_proof(
    x: &BigUint,
    m: &BigUint,
    r: &BigUint,
    x_circ: &BigUint,
    a: &BigUint,
    b: &BigUint,
    public_key: &BigUint,
    params: &PublicParameters,
    rng: &mut RandomGenerator,
) -> NonInteractiveZkp {
    let group = &params.encryption_group;
    let id_group = &params.identification_group;

    let omega_1 = rng.random_in_zq(&id_group.q_circ);
    let omega_2 = rng.random_in_gq(group);
    let omega_3 = rng.random_in_zq(&group.q);

    let t_1 = id_group.g_circ.modpow(&omega_1, &id_group.p_circ);
    let t_2 = omega_2.mod_mul(&public_key.modpow(&omega_3, &group.p), &group.p);
    let t_3 = group.g.modpow(&omega_3, &group.p);

    let c = get_nizkp_challenge(
        HashValue::integers(&[x_circ.clone(), a.clone(), b.clone()]),
        HashValue::integers(&[t_1.clone(), t_2.clone(), t_3.clone()]),
        params.challenge_modulus(),
        params.hash_length(),
    );

    let s_1 = omega_1.mod_add(&(&c * x), &id_group.q_circ);
    let s_2 = omega_2.mod_mul(&m.modpow(&c, &group.p), &group.p);
    let s_3 = omega_3.mod_add(&(&c * r), &group.q);

    NonInteractiveZkp {
        t: vec![t_1, t_2, t_3],
        s: vec![s_1, s_2, s_3],
    }
}

/// Verify a ballot proof against `(x_circ, a, b)`
pub fn check_ballot_proof(
    pi: &NonInteractiveZkp,
    x_circ: &BigUint,
    a: &BigUint,
    b: &BigUint,
    public_key: &BigUint,
    params: &PublicParameters,
) -> bool {
    let group = &params.encryption_group;
    let id_group = &params.identification_group;

    if pi.t.len() != 3 || pi.s.len() != 3 {
        return false;
    }
    let (s_1, s_2, s_3) = (&pi.s[0], &pi.s[1], &pi.s[2]);
    if s_1 >= &id_group.q_circ || !is_member(s_2, group) || s_3 >= &group.q {
        return false;
    }

    let c = get_nizkp_challenge(
        HashValue::integers(&[x_circ.clone(), a.clone(), b.clone()]),
        HashValue::integers(&pi.t),
        params.challenge_modulus(),
        params.hash_length(),
    );

    let x_circ_neg_c = match x_circ.mod_pow_neg(&c, &id_group.p_circ) {
        Some(v) => v,
        None => return false,
    };
    let a_neg_c = match a.mod_pow_neg(&c, &group.p) {
        Some(v) => v,
        None => return false,
    };
    let b_neg_c = match b.mod_pow_neg(&c, &group.p) {
        Some(v) => v,
        None => return false,
    };

    let t_1 = x_circ_neg_c.mod_mul(&id_group.g_circ.modpow(s_1, &id_group.p_circ), &id_group.p_circ);
    let t_2 = a_neg_c
        .mod_mul(s_2, &group.p)
        .mod_mul(&public_key.modpow(s_3, &group.p), &group.p);
    let t_3 = b_neg_c.mod_mul(&group.g.modpow(s_3, &group.p), &group.p);

    pi.t[0] == t_1 && pi.t[1] == t_2 && pi.t[2] == t_3
}

/// Validate a submitted ballot.
///
/// `k` and `public_credentials` are indexed by voter. `already_cast` tells whether the voter
/// has an accepted ballot.
pub fn check_ballot(
    voter_index: usize,
    ballot: &BallotAndQuery,
    already_cast: bool,
    public_key: &BigUint,
    k: &[Vec<usize>],
    public_credentials: &[PublicCredentials],
    params: &PublicParameters,
) -> Result<(), ValidationError> {
    let group = &params.encryption_group;

    let (k_i, credentials) = match (k.get(voter_index), public_credentials.get(voter_index)) {
        (Some(k_i), Some(credentials)) => (k_i, credentials),
        _ => return Err(ValidationError::UnknownVoter(voter_index)),
    };
    if already_cast {
        return Err(ValidationError::DuplicateBallot(voter_index));
    }

    let well_formed = ballot.a.len() == k_i.iter().sum::<usize>()
        && ballot.a.iter().all(|a_i| is_member(a_i, group))
        && is_member(&ballot.b, group)
        && is_identification_member(&ballot.x_circ, &params.identification_group);
    if !well_formed {
        return Err(ValidationError::MalformedBallot(voter_index));
    }

    if ballot.x_circ != credentials.x_circ {
        return Err(ValidationError::CredentialMismatch(voter_index));
    }

    let a = ballot.aggregate(group);
    if !check_ballot_proof(&ballot.pi, &ballot.x_circ, &a, &ballot.b, public_key, params) {
        return Err(ValidationError::InvalidBallotProof(voter_index));
    }

    Ok(())
}

/// Answer an OT query over the voter's points.
///
/// Returns the response and the per-election randomizations `beta_j`.
pub fn gen_response(
    query: &[BigUint],
    public_key: &BigUint,
    n: &[usize],
    k_i: &[usize],
    points: &[Point],
    params: &PublicParameters,
    rng: &mut RandomGenerator,
) -> Result<(ObliviousTransferResponse, Vec<BigUint>), Error> {
    let group = &params.encryption_group;
    let message_length = params.point_message_length();
    if query.len() != k_i.iter().sum::<usize>() || points.len() != n.iter().sum::<usize>() {
        return Err(Error::InvalidState("OT query or points do not match the election set"));
    }
    let primes = get_primes(points.len(), group)?;

    let mut b = Vec::with_capacity(query.len());
    let mut c = Vec::with_capacity(points.len());
    let mut d = Vec::with_capacity(n.len());
    let mut betas = Vec::with_capacity(n.len());

    let mut query_offset = 0;
    let mut candidate_offset = 0;
    for (n_j, k_ij) in n.iter().zip(k_i.iter()) {
        let beta = rng.random_in_zq(&group.q);

        for a_i in &query[query_offset..query_offset + k_ij] {
            b.push(a_i.modpow(&beta, &group.p));
        }
        for candidate in candidate_offset..candidate_offset + n_j {
            let key = primes[candidate].modpow(&beta, &group.p);
            let message = encode_point(&points[candidate], message_length)?;
            c.push(xor(&message, &ot_mask(&key, message_length, params)?));
        }
        d.push(public_key.modpow(&beta, &group.p));
        betas.push(beta);

        query_offset += k_ij;
        candidate_offset += n_j;
    }

    Ok((ObliviousTransferResponse { b, c, d }, betas))
}

/// Encode a point as `x ‖ y`, each half padded to `length / 2` bytes
pub fn encode_point(point: &Point, length: usize) -> Result<Vec<u8>, Error> {
    let mut message = to_byte_array_len(&point.x, length / 2)?;
    message.extend(to_byte_array_len(&point.y, length / 2)?);
    Ok(message)
}

/// Mask for an OT message: HKDF-SHA512 expansion of the hashed key
pub fn ot_mask(key: &BigUint, length: usize, params: &PublicParameters) -> Result<Vec<u8>, Error> {
    let ikm = rec_hash(&HashValue::from(key), params.hash_length());
    let hkdf = Hkdf::<Sha512>::new(None, &ikm);
    let mut mask = vec![0u8; length];
    hkdf.expand(OT_MASK_INFO, &mut mask)
        .map_err(|_| Error::InvalidState("OT message too long for mask expansion"))?;
    Ok(mask)
}

/// Decode the points at the selected positions from one authority's response.
///
/// `authority` only labels the error if the response is invalid.
pub fn get_points(
    response: &ObliviousTransferResponse,
    selections: &[usize],
    r: &[BigUint],
    k_i: &[usize],
    authority: usize,
    params: &PublicParameters,
) -> Result<Vec<Point>, Error> {
    let group = &params.encryption_group;
    let p_prime = &params.prime_field.p_prime;
    let message_length = params.point_message_length();
    let invalid = || Error::from(ValidationError::InvalidObliviousTransferResponse(authority));

    if response.b.len() != selections.len()
        || r.len() != selections.len()
        || k_i.iter().sum::<usize>() != selections.len()
        || response.d.len() != k_i.len()
    {
        return Err(invalid());
    }

    // Election of each query entry
    let elections = k_i
        .iter()
        .enumerate()
        .flat_map(|(j, k_ij)| std::iter::repeat(j).take(*k_ij));

    let mut points = Vec::with_capacity(selections.len());
    for (i, j) in elections.enumerate() {
        let c = selections[i]
            .checked_sub(1)
            .and_then(|s| response.c.get(s))
            .ok_or_else(invalid)?;
        if c.len() != message_length {
            return Err(invalid());
        }

        let d_inv = response.d[j]
            .mod_pow_neg(&r[i], &group.p)
            .ok_or_else(invalid)?;
        let key = response.b[i].mod_mul(&d_inv, &group.p);
        let message = xor(c, &ot_mask(&key, message_length, params)?);

        let (x, y) = message.split_at(message_length / 2);
        let point = Point::new(to_integer(x), to_integer(y));
        if &point.x >= p_prime || &point.y >= p_prime {
            return Err(invalid());
        }
        points.push(point);
    }

    Ok(points)
}

/// Decode the selected points from every authority's response, `P[authority][selection]`
pub fn get_point_matrix(
    responses: &[ObliviousTransferResponse],
    selections: &[usize],
    r: &[BigUint],
    k_i: &[usize],
    params: &PublicParameters,
) -> Result<Vec<Vec<Point>>, Error> {
    responses
        .iter()
        .enumerate()
        .map(|(j, response)| get_points(response, selections, r, k_i, j, params))
        .collect()
}

/// Return codes for the selections: XOR over authorities of the hashed points
pub fn get_return_codes(
    point_matrix: &[Vec<Point>],
    params: &PublicParameters,
) -> Result<Vec<String>, Error> {
    let alphabet = params.alphabet();
    let selections = point_matrix.first().map(|p| p.len()).unwrap_or(0);

    (0..selections)
        .map(|i| {
            let parts = point_matrix
                .iter()
                .enumerate()
                .map(|(j, points)| match points.get(i) {
                    Some(point) => Ok(return_code_part(point, params)),
                    None => Err(Error::from(ValidationError::InvalidObliviousTransferResponse(j))),
                })
                .collect::<Result<Vec<Vec<u8>>, Error>>()?;
            let rc = xor_all(
                parts.iter().map(|p| p.as_slice()),
                params.return_code_length(),
            );
            bytes_to_code_string(&rc, &alphabet)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    struct Fixture {
        params: PublicParameters,
        key_pair: KeyPair,
        x: BigUint,
        x_circ: BigUint,
    }

    fn fixture(rng: &mut RandomGenerator) -> Fixture {
        let params = PublicParameters::testing(1).unwrap();
        let key_pair = generate_key_pair(&params.encryption_group, rng);
        let x = rng.random_in_zq(&params.q_x());
        let id_group = &params.identification_group;
        let x_circ = id_group.g_circ.modpow(&x, &id_group.p_circ);
        Fixture {
            params,
            key_pair,
            x,
            x_circ,
        }
    }

    // Copies of `x` with one bit flipped, low and high positions included
    fn flip_bits(x: &BigUint) -> Vec<BigUint> {
        let top = x.bits().saturating_sub(1) as usize;
        [0, 1, 7, 31, 63, top]
            .iter()
            .map(|bit| x ^ (BigUint::one() << *bit))
            .collect()
    }

    #[test]
    fn ballot_proof_is_sound() {
        let mut rng = RandomGenerator::from_seed([10u8; 32]);
        let f = fixture(&mut rng);
        let params = &f.params;
        let code = to_code_string(&f.x, params.voting_code_length(), &params.alphabet()).unwrap();

        let ballot = gen_ballot(&code, &[2, 4], &f.key_pair.public_key, params, &mut rng)
            .unwrap()
            .ballot;
        let a = ballot.aggregate(&params.encryption_group);
        assert_eq!(ballot.x_circ, f.x_circ);
        assert!(check_ballot_proof(
            &ballot.pi,
            &ballot.x_circ,
            &a,
            &ballot.b,
            &f.key_pair.public_key,
            params
        ));

        for i in 0..3 {
            for t in flip_bits(&ballot.pi.t[i]) {
                let mut pi = ballot.pi.clone();
                pi.t[i] = t;
                assert!(!check_ballot_proof(&pi, &ballot.x_circ, &a, &ballot.b, &f.key_pair.public_key, params));
            }
            for s in flip_bits(&ballot.pi.s[i]) {
                let mut pi = ballot.pi.clone();
                pi.s[i] = s;
                assert!(!check_ballot_proof(&pi, &ballot.x_circ, &a, &ballot.b, &f.key_pair.public_key, params));
            }
        }

        for x_circ in flip_bits(&ballot.x_circ) {
            assert!(!check_ballot_proof(&ballot.pi, &x_circ, &a, &ballot.b, &f.key_pair.public_key, params));
        }

        let mut truncated = ballot.pi.clone();
        truncated.s.pop();
        assert!(!check_ballot_proof(&truncated, &ballot.x_circ, &a, &ballot.b, &f.key_pair.public_key, params));
    }

    #[test]
    fn check_ballot_rejections() {
        let mut rng = RandomGenerator::from_seed([11u8; 32]);
        let f = fixture(&mut rng);
        let params = &f.params;
        let pk = &f.key_pair.public_key;
        let code = to_code_string(&f.x, params.voting_code_length(), &params.alphabet()).unwrap();
        let ballot = gen_ballot(&code, &[3], pk, params, &mut rng).unwrap().ballot;

        let k = vec![vec![1]];
        let credentials = vec![PublicCredentials {
            x_circ: f.x_circ.clone(),
            y_circ: BigUint::one(),
        }];

        assert_eq!(check_ballot(0, &ballot, false, pk, &k, &credentials, params), Ok(()));
        assert_eq!(
            check_ballot(1, &ballot, false, pk, &k, &credentials, params),
            Err(ValidationError::UnknownVoter(1))
        );
        assert_eq!(
            check_ballot(0, &ballot, true, pk, &k, &credentials, params),
            Err(ValidationError::DuplicateBallot(0))
        );
        assert_eq!(
            check_ballot(0, &ballot, false, pk, &[vec![2]], &credentials, params),
            Err(ValidationError::MalformedBallot(0))
        );

        let other = vec![PublicCredentials {
            x_circ: params.identification_group.g_circ.clone(),
            y_circ: BigUint::one(),
        }];
        assert_eq!(
            check_ballot(0, &ballot, false, pk, &k, &other, params),
            Err(ValidationError::CredentialMismatch(0))
        );

        let mut forged = ballot.clone();
        forged.pi.s[2] = (&forged.pi.s[2] + 1u32) % &params.encryption_group.q;
        assert_eq!(
            check_ballot(0, &forged, false, pk, &k, &credentials, params),
            Err(ValidationError::InvalidBallotProof(0))
        );
    }

    #[test]
    fn oblivious_transfer_round_trip() {
        let mut rng = RandomGenerator::from_seed([12u8; 32]);
        let f = fixture(&mut rng);
        let params = &f.params;
        let pk = &f.key_pair.public_key;
        let code = to_code_string(&f.x, params.voting_code_length(), &params.alphabet()).unwrap();

        let n = vec![3, 4];
        let k_i = vec![1, 2];
        let generated = gen_points(&n, &k_i, &params.prime_field, &mut rng);

        for selections in [vec![1, 4, 5], vec![3, 6, 7], vec![2, 4, 7]].iter() {
            let ballot = gen_ballot(&code, selections, pk, params, &mut rng).unwrap();
            let (response, betas) =
                gen_response(&ballot.ballot.a, pk, &n, &k_i, &generated.points, params, &mut rng)
                    .unwrap();
            assert_eq!(betas.len(), 2);
            assert_eq!(response.c.len(), 7);

            let points = get_points(&response, selections, &ballot.r, &k_i, 0, params).unwrap();
            let expected: Vec<Point> = selections
                .iter()
                .map(|s| generated.points[s - 1].clone())
                .collect();
            assert_eq!(points, expected);
        }
    }

    #[test]
    fn tampered_response_is_rejected() {
        let mut rng = RandomGenerator::from_seed([13u8; 32]);
        let f = fixture(&mut rng);
        let params = &f.params;
        let pk = &f.key_pair.public_key;
        let code = to_code_string(&f.x, params.voting_code_length(), &params.alphabet()).unwrap();

        let n = vec![3];
        let k_i = vec![1];
        let generated = gen_points(&n, &k_i, &params.prime_field, &mut rng);
        let ballot = gen_ballot(&code, &[2], pk, params, &mut rng).unwrap();
        let (mut response, _) =
            gen_response(&ballot.ballot.a, pk, &n, &k_i, &generated.points, params, &mut rng).unwrap();

        // Force the x half of the decoded message to 0xff..ff, which is outside the field
        let mask = {
            let d_inv = response.d[0].mod_pow_neg(&ballot.r[0], &params.encryption_group.p).unwrap();
            let key = response.b[0].mod_mul(&d_inv, &params.encryption_group.p);
            ot_mask(&key, 16, params).unwrap()
        };
        let mut message = vec![0xffu8; 8];
        message.extend(vec![0u8; 8]);
        response.c[1] = xor(&message, &mask);

        match get_points(&response, &[2], &ballot.r, &k_i, 3, params) {
            Err(Error::Validation(ValidationError::InvalidObliviousTransferResponse(3))) => {}
            other => panic!("unexpected result {:?}", other),
        }

        response.d.clear();
        assert!(get_points(&response, &[2], &ballot.r, &k_i, 0, params).is_err());
    }

    #[test]
    fn return_codes_xor_authorities() {
        let params = PublicParameters::testing(2).unwrap();
        let a = Point::new(BigUint::from(1u32), BigUint::from(2u32));
        let b = Point::new(BigUint::from(3u32), BigUint::zero());
        let codes = get_return_codes(&[vec![a.clone()], vec![b.clone()]], &params).unwrap();
        let expected = xor(&return_code_part(&a, &params), &return_code_part(&b, &params));
        assert_eq!(codes, vec![bytes_to_code_string(&expected, &params.alphabet()).unwrap()]);

        // Authority 1 answered fewer selections than authority 0
        let ragged = [vec![a.clone(), b.clone()], vec![b]];
        match get_return_codes(&ragged, &params) {
            Err(Error::Validation(ValidationError::InvalidObliviousTransferResponse(1))) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn selections_match_election_set() {
        let domain = DomainOfInfluence::new("d");
        let set = ElectionSet::new(
            vec![Voter::new(vec![domain.clone()])],
            vec![
                Election {
                    number_of_candidates: 3,
                    number_of_selections: 1,
                    domain: domain.clone(),
                },
                Election {
                    number_of_candidates: 3,
                    number_of_selections: 2,
                    domain,
                },
            ],
            (0..6).map(|c| Candidate::new(format!("c{}", c))).collect(),
        )
        .unwrap();

        assert!(check_selections(&[1, 4, 6], &set, 0).is_ok());
        assert!(check_selections(&[1, 2, 6], &set, 0).is_err());
        assert!(check_selections(&[1, 4], &set, 0).is_err());
        assert!(check_selections(&[4, 1, 6], &set, 0).is_err());
        assert!(check_selections(&[1, 4, 7], &set, 0).is_err());
        assert!(check_selections(&[1, 4, 6], &set, 1).is_err());
    }
}
