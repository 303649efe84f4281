use crate::*;

/// One authority's secret contribution to a voter's code sheet
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SecretVoterData {
    /// Voting credential share
    #[serde(with = "BigUintHex")]
    pub x: BigUint,

    /// Confirmation credential share
    #[serde(with = "BigUintHex")]
    pub y: BigUint,

    /// Finalization code share, `l_f/8` bytes
    #[serde(with = "hex_serde")]
    pub f: Vec<u8>,

    /// Return code share per candidate, `l_r/8` bytes each
    pub rc: Vec<Vec<u8>>,
}

/// A voter's public identification credentials
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PublicCredentials {
    #[serde(with = "BigUintHex")]
    pub x_circ: BigUint,
    #[serde(with = "BigUintHex")]
    pub y_circ: BigUint,
}

/// Everything one authority generates for the electorate
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ElectorateData {
    pub secret_voter_data: Vec<SecretVoterData>,
    pub public_voter_data: Vec<PublicCredentials>,

    /// `P[voter][candidate]`: the OT database of each voter
    pub points: Vec<Vec<Point>>,

    /// `K[voter][election]`: allowed number of selections
    pub k: Vec<Vec<usize>>,
}

/// Generate one authority's electorate data
pub fn gen_electorate_data(
    election_set: &ElectionSet,
    params: &PublicParameters,
    rng: &mut RandomGenerator,
) -> ElectorateData {
    let n = election_set.candidate_counts();
    let voters = election_set.voters.len();

    let mut data = ElectorateData {
        secret_voter_data: Vec::with_capacity(voters),
        public_voter_data: Vec::with_capacity(voters),
        points: Vec::with_capacity(voters),
        k: Vec::with_capacity(voters),
    };

    for i in 0..voters {
        let k_i = election_set.selection_counts(i);
        let PointsAndZeroImages { points, y0s } = gen_points(&n, &k_i, &params.prime_field, rng);

        let secret = gen_secret_voter_data(&points, params, rng);
        let public = get_public_voter_data(&secret.x, &secret.y, &y0s, params);

        data.secret_voter_data.push(secret);
        data.public_voter_data.push(public);
        data.points.push(points);
        data.k.push(k_i);
    }

    debug!("generated electorate data for {} voters", voters);
    data
}

/// Sample a voter's credentials and derive the code shares from their points
pub fn gen_secret_voter_data(
    points: &[Point],
    params: &PublicParameters,
    rng: &mut RandomGenerator,
) -> SecretVoterData {
    let x = rng.random_in_zq(&params.q_x());
    let y = rng.random_in_zq(&params.q_y());

    let f = finalization_code_part(points, params);
    let rc = points
        .iter()
        .map(|point| return_code_part(point, params))
        .collect();

    SecretVoterData { x, y, f, rc }
}

/// `F = truncate(hash(points), l_f/8)`
pub fn finalization_code_part(points: &[Point], params: &PublicParameters) -> Vec<u8> {
    let value = HashValue::tuple(points.iter().map(Point::to_hash_value));
    truncate(
        &rec_hash(&value, params.hash_length()),
        params.finalization_code_length(),
    )
}

/// `rc = truncate(hash(point), l_r/8)`
pub fn return_code_part(point: &Point, params: &PublicParameters) -> Vec<u8> {
    truncate(
        &rec_hash(&point.to_hash_value(), params.hash_length()),
        params.return_code_length(),
    )
}

/// The confirmation credential offset contributed by the polynomials' zero images
pub fn zero_images_hash(y0s: &[BigUint], params: &PublicParameters) -> BigUint {
    to_integer(&rec_hash(&HashValue::integers(y0s), params.hash_length()))
        % &params.identification_group.q_circ
}

/// `x_circ = g_circ^x`, `y_circ = g_circ^(y + hash(y0s))`
pub fn get_public_voter_data(
    x: &BigUint,
    y: &BigUint,
    y0s: &[BigUint],
    params: &PublicParameters,
) -> PublicCredentials {
    let group = &params.identification_group;
    let y_prime = y.mod_add(&zero_images_hash(y0s, params), &group.q_circ);

    PublicCredentials {
        x_circ: group.g_circ.modpow(x, &group.p_circ),
        y_circ: group.g_circ.modpow(&y_prime, &group.p_circ),
    }
}

/// Combine all authorities' public credentials voter by voter
pub fn get_public_credentials(
    parts: &[Vec<PublicCredentials>],
    group: &IdentificationGroup,
) -> Result<Vec<PublicCredentials>, Error> {
    let voters = match parts.first() {
        Some(first) => first.len(),
        None => return Err(Error::InvalidState("no public credential parts")),
    };
    if parts.iter().any(|part| part.len() != voters) {
        return Err(Error::InvalidState(
            "public credential parts cover different electorates",
        ));
    }

    Ok((0..voters)
        .map(|i| PublicCredentials {
            x_circ: mod_product(parts.iter().map(|part| &part[i].x_circ), &group.p_circ),
            y_circ: mod_product(parts.iter().map(|part| &part[i].y_circ), &group.p_circ),
        })
        .collect())
}
