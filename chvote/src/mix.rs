use crate::*;
use num_traits::One;

/// ElGamal ciphertext `(m * pk^r, g^r)`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Encryption {
    #[serde(with = "BigUintHex")]
    pub a: BigUint,
    #[serde(with = "BigUintHex")]
    pub b: BigUint,
}

impl Encryption {
    /// Re-encrypt with randomization `r`
    pub fn re_encrypt(&self, r: &BigUint, public_key: &BigUint, group: &EncryptionGroup) -> Self {
        Encryption {
            a: self.a.mod_mul(&public_key.modpow(r, &group.p), &group.p),
            b: self.b.mod_mul(&group.g.modpow(r, &group.p), &group.p),
        }
    }

    fn to_hash_value(&self) -> HashValue {
        HashValue::integers(&[self.a.clone(), self.b.clone()])
    }
}

/// A re-encryption mix: `encryptions[i] = re_encrypt(input[permutation[i]], randomizations[i])`
#[derive(Clone, Debug)]
pub struct Shuffle {
    pub encryptions: Vec<Encryption>,
    pub randomizations: Vec<BigUint>,
    pub permutation: Vec<usize>,
}

/// Proof that a list of ciphertexts is a re-encryption of a permutation of another list
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ShuffleProof {
    #[serde(with = "BigUintHex")]
    pub t_1: BigUint,
    #[serde(with = "BigUintHex")]
    pub t_2: BigUint,
    #[serde(with = "BigUintHex")]
    pub t_3: BigUint,
    #[serde(with = "BigUintHex")]
    pub t_4_1: BigUint,
    #[serde(with = "BigUintHex")]
    pub t_4_2: BigUint,
    #[serde(with = "biguint_vec_hex")]
    pub t_hat: Vec<BigUint>,

    #[serde(with = "BigUintHex")]
    pub s_1: BigUint,
    #[serde(with = "BigUintHex")]
    pub s_2: BigUint,
    #[serde(with = "BigUintHex")]
    pub s_3: BigUint,
    #[serde(with = "BigUintHex")]
    pub s_4: BigUint,
    #[serde(with = "biguint_vec_hex")]
    pub s_hat: Vec<BigUint>,
    #[serde(with = "biguint_vec_hex")]
    pub s_prime: Vec<BigUint>,

    /// Permutation commitment
    #[serde(with = "biguint_vec_hex")]
    pub c: Vec<BigUint>,

    /// Commitment chain `c_hat_1..c_hat_N`
    #[serde(with = "biguint_vec_hex")]
    pub c_hat: Vec<BigUint>,
}

/// A random permutation of `0..n` (Knuth shuffle)
pub fn gen_permutation(n: usize, rng: &mut RandomGenerator) -> Vec<usize> {
    let mut psi: Vec<usize> = (0..n).collect();
    for i in 0..n {
        let k = i + rng.random_index(n - i);
        psi.swap(i, k);
    }
    psi
}

/// The ciphertexts of all confirmed ballots, ordered by voter index.
///
/// Each ballot's OT query is folded into a single encryption of the product of the selected primes.
pub fn get_encryptions(
    ballots: &[BallotEntry],
    confirmations: &[ConfirmationEntry],
    group: &EncryptionGroup,
) -> Vec<Encryption> {
    let mut confirmed: Vec<&BallotEntry> = ballots
        .iter()
        .filter(|entry| {
            confirmations
                .iter()
                .any(|confirmation| confirmation.voter_index == entry.voter_index)
        })
        .collect();
    confirmed.sort_by_key(|entry| entry.voter_index);

    confirmed
        .into_iter()
        .map(|entry| Encryption {
            a: entry.ballot.aggregate(group),
            b: entry.ballot.b.clone(),
        })
        .collect()
}

/// Re-encrypt and permute
pub fn gen_shuffle(
    encryptions: &[Encryption],
    public_key: &BigUint,
    group: &EncryptionGroup,
    rng: &mut RandomGenerator,
) -> Shuffle {
    let permutation = gen_permutation(encryptions.len(), rng);
    let mut shuffled = Vec::with_capacity(encryptions.len());
    let mut randomizations = Vec::with_capacity(encryptions.len());

    for psi_i in &permutation {
        let r = rng.random_in_zq(&group.q);
        shuffled.push(encryptions[*psi_i].re_encrypt(&r, public_key, group));
        randomizations.push(r);
    }

    debug!("shuffled {} encryptions", encryptions.len());
    Shuffle {
        encryptions: shuffled,
        randomizations,
        permutation,
    }
}

/// `n` independent generators of `G_q`, derived by hashing so nobody knows their discrete logarithms
pub fn get_generators(n: usize, params: &PublicParameters) -> Vec<BigUint> {
    let p = &params.encryption_group.p;
    (0..n)
        .map(|i| {
            let mut counter = 0usize;
            loop {
                let value = HashValue::tuple(vec![
                    HashValue::from("chvote-generator"),
                    HashValue::from(i),
                    HashValue::from(counter),
                ]);
                let x = to_integer(&rec_hash(&value, params.hash_length())) % p;
                let h = x.modpow(&BigUint::from(2u32), p);
                if h > BigUint::one() {
                    return h;
                }
                counter += 1;
            }
        })
        .collect()
}

/// Commit to `permutation`: `c[psi(i)] = g^r[psi(i)] * h_i`
pub fn gen_permutation_commitment(
    permutation: &[usize],
    generators: &[BigUint],
    group: &EncryptionGroup,
    rng: &mut RandomGenerator,
) -> (Vec<BigUint>, Vec<BigUint>) {
    let n = permutation.len();
    let mut c = vec![BigUint::one(); n];
    let mut r = vec![BigUint::one(); n];

    for (i, psi_i) in permutation.iter().enumerate() {
        let r_i = rng.random_in_zq(&group.q);
        c[*psi_i] = group.g.modpow(&r_i, &group.p).mod_mul(&generators[i], &group.p);
        r[*psi_i] = r_i;
    }
    (c, r)
}

/// Commitment chain `c_hat_i = g^r_hat_i * c_hat_{i-1}^u_i`, starting from `h`
pub fn gen_commitment_chain(
    u: &[BigUint],
    group: &EncryptionGroup,
    rng: &mut RandomGenerator,
) -> (Vec<BigUint>, Vec<BigUint>) {
    let mut previous = group.h.clone();
    let mut c_hat = Vec::with_capacity(u.len());
    let mut r_hat = Vec::with_capacity(u.len());

    for u_i in u {
        let r_i = rng.random_in_zq(&group.q);
        let c_i = group
            .g
            .modpow(&r_i, &group.p)
            .mod_mul(&previous.modpow(u_i, &group.p), &group.p);
        previous = c_i.clone();
        c_hat.push(c_i);
        r_hat.push(r_i);
    }
    (c_hat, r_hat)
}

/// Public values the shuffle challenges are bound to
fn shuffle_public_values(
    input: &[Encryption],
    output: &[Encryption],
    c: &[BigUint],
    public_key: &BigUint,
) -> Vec<HashValue> {
    vec![
        HashValue::tuple(input.iter().map(Encryption::to_hash_value)),
        HashValue::tuple(output.iter().map(Encryption::to_hash_value)),
        HashValue::integers(c),
        HashValue::from(public_key),
    ]
}

fn shuffle_challenges(
    input: &[Encryption],
    output: &[Encryption],
    c: &[BigUint],
    public_key: &BigUint,
    params: &PublicParameters,
) -> Vec<BigUint> {
    get_challenges(
        input.len(),
        HashValue::Tuple(shuffle_public_values(input, output, c, public_key)),
        &params.encryption_group.q,
        params.hash_length(),
    )
}

#[allow(clippy::too_many_arguments)]
fn shuffle_challenge(
    input: &[Encryption],
    output: &[Encryption],
    c: &[BigUint],
    c_hat: &[BigUint],
    public_key: &BigUint,
    t: &[&BigUint],
    t_hat: &[BigUint],
    params: &PublicParameters,
) -> BigUint {
    let mut public_values = shuffle_public_values(input, output, c, public_key);
    public_values.insert(3, HashValue::integers(c_hat));

    let commitments = HashValue::tuple(vec![
        HashValue::integers(t[..3].iter().cloned()),
        HashValue::integers(t[3..].iter().cloned()),
        HashValue::integers(t_hat),
    ]);

    get_nizkp_challenge(
        HashValue::Tuple(public_values),
        commitments,
        &params.encryption_group.q,
        params.hash_length(),
    )
}

/// `x^(-e)` for `x` in `G_q`
fn pow_neg(x: &BigUint, e: &BigUint, group: &EncryptionGroup) -> BigUint {
    let e = e % &group.q;
    x.modpow(&((&group.q - e) % &group.q), &group.p)
}

/// `∏ bases_i^exponents_i mod p`
fn multi_pow(bases: &[BigUint], exponents: &[BigUint], p: &BigUint) -> BigUint {
    bases
        .iter()
        .zip(exponents.iter())
        .fold(BigUint::one(), |acc, (base, e)| acc.mod_mul(&base.modpow(e, p), p))
}

/// Prove that `output` is a re-encryption shuffle of `input`
pub fn gen_shuffle_proof(
    input: &[Encryption],
    shuffle: &Shuffle,
    public_key: &BigUint,
    params: &PublicParameters,
    rng: &mut RandomGenerator,
) -> ShuffleProof {
    let group = &params.encryption_group;
    let (p, q, g) = (&group.p, &group.q, &group.g);
    let output = &shuffle.encryptions;
    let psi = &shuffle.permutation;
    let n = input.len();

    let h = get_generators(n, params);
    let (c, r) = gen_permutation_commitment(psi, &h, group, rng);
    let u = shuffle_challenges(input, output, &c, public_key, params);
    let u_prime: Vec<BigUint> = psi.iter().map(|psi_i| u[*psi_i].clone()).collect();
    let (c_hat, r_hat) = gen_commitment_chain(&u_prime, group, rng);

    let omega_1 = rng.random_in_zq(q);
    let omega_2 = rng.random_in_zq(q);
    let omega_3 = rng.random_in_zq(q);
    let omega_4 = rng.random_in_zq(q);
    let omega_hat: Vec<BigUint> = (0..n).map(|_| rng.random_in_zq(q)).collect();
    let omega_prime: Vec<BigUint> = (0..n).map(|_| rng.random_in_zq(q)).collect();

    let output_a: Vec<BigUint> = output.iter().map(|e| e.a.clone()).collect();
    let output_b: Vec<BigUint> = output.iter().map(|e| e.b.clone()).collect();

    let t_1 = g.modpow(&omega_1, p);
    let t_2 = g.modpow(&omega_2, p);
    let t_3 = g.modpow(&omega_3, p).mod_mul(&multi_pow(&h, &omega_prime, p), p);
    let t_4_1 = pow_neg(public_key, &omega_4, group).mod_mul(&multi_pow(&output_a, &omega_prime, p), p);
    let t_4_2 = pow_neg(g, &omega_4, group).mod_mul(&multi_pow(&output_b, &omega_prime, p), p);
    let t_hat: Vec<BigUint> = (0..n)
        .map(|i| {
            let previous = if i == 0 { &group.h } else { &c_hat[i - 1] };
            g.modpow(&omega_hat[i], p)
                .mod_mul(&previous.modpow(&omega_prime[i], p), p)
        })
        .collect();

    let challenge = shuffle_challenge(
        input,
        output,
        &c,
        &c_hat,
        public_key,
        &[&t_1, &t_2, &t_3, &t_4_1, &t_4_2],
        &t_hat,
        params,
    );

    // v_i = ∏_{k > i} u'_k
    let mut v = vec![BigUint::one(); n];
    for i in (1..n).rev() {
        v[i - 1] = u_prime[i].mod_mul(&v[i], q);
    }

    let r_bar = mod_sum(&r, q);
    let r_hat_sum = r_hat
        .iter()
        .zip(v.iter())
        .fold(BigUint::from(0u32), |acc, (r_i, v_i)| acc.mod_add(&r_i.mod_mul(v_i, q), q));
    let r_tilde = r
        .iter()
        .zip(u.iter())
        .fold(BigUint::from(0u32), |acc, (r_i, u_i)| acc.mod_add(&r_i.mod_mul(u_i, q), q));
    let r_prime = shuffle
        .randomizations
        .iter()
        .zip(u_prime.iter())
        .fold(BigUint::from(0u32), |acc, (r_i, u_i)| acc.mod_add(&r_i.mod_mul(u_i, q), q));

    let respond = |omega: &BigUint, secret: &BigUint| omega.mod_add(&challenge.mod_mul(secret, q), q);

    ShuffleProof {
        s_1: respond(&omega_1, &r_bar),
        s_2: respond(&omega_2, &r_hat_sum),
        s_3: respond(&omega_3, &r_tilde),
        s_4: respond(&omega_4, &r_prime),
        s_hat: omega_hat
            .iter()
            .zip(r_hat.iter())
            .map(|(omega, r_i)| respond(omega, r_i))
            .collect(),
        s_prime: omega_prime
            .iter()
            .zip(u_prime.iter())
            .map(|(omega, u_i)| respond(omega, u_i))
            .collect(),
        t_1,
        t_2,
        t_3,
        t_4_1,
        t_4_2,
        t_hat,
        c,
        c_hat,
    }
}

/// Verify a shuffle proof
pub fn check_shuffle_proof(
    pi: &ShuffleProof,
    input: &[Encryption],
    output: &[Encryption],
    public_key: &BigUint,
    params: &PublicParameters,
) -> bool {
    let group = &params.encryption_group;
    let (p, q, g) = (&group.p, &group.q, &group.g);
    let n = input.len();

    let lengths_match = output.len() == n
        && pi.t_hat.len() == n
        && pi.s_hat.len() == n
        && pi.s_prime.len() == n
        && pi.c.len() == n
        && pi.c_hat.len() == n;
    if !lengths_match {
        return false;
    }

    let all_members = is_member(public_key, group)
        && input
            .iter()
            .chain(output.iter())
            .all(|e| is_member(&e.a, group) && is_member(&e.b, group))
        && pi.c.iter().chain(pi.c_hat.iter()).all(|x| is_member(x, group));
    if !all_members {
        return false;
    }

    let responses_in_range = [&pi.s_1, &pi.s_2, &pi.s_3, &pi.s_4]
        .iter()
        .cloned()
        .chain(pi.s_hat.iter())
        .chain(pi.s_prime.iter())
        .all(|s| s < q);
    if !responses_in_range {
        return false;
    }

    let h = get_generators(n, params);
    let u = shuffle_challenges(input, output, &pi.c, public_key, params);
    let challenge = shuffle_challenge(
        input,
        output,
        &pi.c,
        &pi.c_hat,
        public_key,
        &[&pi.t_1, &pi.t_2, &pi.t_3, &pi.t_4_1, &pi.t_4_2],
        &pi.t_hat,
        params,
    );

    let u_product = u.iter().fold(BigUint::one(), |acc, u_i| acc.mod_mul(u_i, q));
    let h_product = mod_product(&h, p);
    let c_bar = mod_product(&pi.c, p).mod_mul(&pow_neg(&h_product, &BigUint::one(), group), p);
    let c_hat_last = pi.c_hat.last().unwrap_or(&group.h);
    let c_hat = c_hat_last.mod_mul(&pow_neg(&group.h, &u_product, group), p);
    let c_tilde = multi_pow(&pi.c, &u, p);

    let input_a: Vec<BigUint> = input.iter().map(|e| e.a.clone()).collect();
    let input_b: Vec<BigUint> = input.iter().map(|e| e.b.clone()).collect();
    let output_a: Vec<BigUint> = output.iter().map(|e| e.a.clone()).collect();
    let output_b: Vec<BigUint> = output.iter().map(|e| e.b.clone()).collect();
    let a_tilde = multi_pow(&input_a, &u, p);
    let b_tilde = multi_pow(&input_b, &u, p);

    let t_1 = pow_neg(&c_bar, &challenge, group).mod_mul(&g.modpow(&pi.s_1, p), p);
    let t_2 = pow_neg(&c_hat, &challenge, group).mod_mul(&g.modpow(&pi.s_2, p), p);
    let t_3 = pow_neg(&c_tilde, &challenge, group)
        .mod_mul(&g.modpow(&pi.s_3, p), p)
        .mod_mul(&multi_pow(&h, &pi.s_prime, p), p);
    let t_4_1 = pow_neg(&a_tilde, &challenge, group)
        .mod_mul(&pow_neg(public_key, &pi.s_4, group), p)
        .mod_mul(&multi_pow(&output_a, &pi.s_prime, p), p);
    let t_4_2 = pow_neg(&b_tilde, &challenge, group)
        .mod_mul(&pow_neg(g, &pi.s_4, group), p)
        .mod_mul(&multi_pow(&output_b, &pi.s_prime, p), p);

    let t_hat_valid = (0..n).all(|i| {
        let previous = if i == 0 { &group.h } else { &pi.c_hat[i - 1] };
        let t_hat_i = pow_neg(&pi.c_hat[i], &challenge, group)
            .mod_mul(&g.modpow(&pi.s_hat[i], p), p)
            .mod_mul(&previous.modpow(&pi.s_prime[i], p), p);
        t_hat_i == pi.t_hat[i]
    });

    t_hat_valid
        && pi.t_1 == t_1
        && pi.t_2 == t_2
        && pi.t_3 == t_3
        && pi.t_4_1 == t_4_1
        && pi.t_4_2 == t_4_2
}

/// Verify the whole mixing chain starting from `encryptions`.
///
/// `shuffles[j]` is authority `j`'s output and proof.
pub fn check_shuffle_proofs(
    shuffles: &[(Vec<Encryption>, ShuffleProof)],
    encryptions: &[Encryption],
    public_key: &BigUint,
    params: &PublicParameters,
) -> Result<(), ValidationError> {
    let mut input = encryptions;
    for (j, (output, proof)) in shuffles.iter().enumerate() {
        if !check_shuffle_proof(proof, input, output, public_key, params) {
            warn!("shuffle proof of authority {} failed to verify", j);
            return Err(ValidationError::InvalidShuffleProof(j));
        }
        input = output;
    }
    Ok(())
}
