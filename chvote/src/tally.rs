use crate::*;
use indexmap::IndexMap;
use num_integer::Integer;
use num_traits::Zero;

/// Everything published during the tally phase
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TallyData {
    #[serde(with = "biguint_vec_hex")]
    pub public_key_shares: Vec<BigUint>,
    pub final_shuffle: Vec<Encryption>,

    /// `partial_decryptions[j]`: authority `j`'s partial decryptions of the final shuffle
    pub partial_decryptions: Vec<Vec<BigUint>>,
    pub decryption_proofs: Vec<NonInteractiveZkp>,
}

/// Number of votes per candidate, in candidate order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    pub votes: Vec<u64>,
}

impl Tally {
    /// Totals keyed by candidate description
    pub fn totals(&self, election_set: &ElectionSet) -> IndexMap<String, u64> {
        let mut totals = IndexMap::with_capacity(self.votes.len());
        for (candidate, votes) in election_set.candidates.iter().zip(self.votes.iter()) {
            *totals.entry(candidate.description.clone()).or_insert(0) += *votes;
        }
        totals
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.iter().sum()
    }
}

/// Count, for each of the first `n` primes, how many plaintexts it divides
pub fn get_tally(plaintexts: &[BigUint], n: usize, group: &EncryptionGroup) -> Result<Tally, Error> {
    let primes = get_primes(n, group)?;
    let votes = primes
        .iter()
        .map(|prime| {
            plaintexts
                .iter()
                .filter(|m| m.mod_floor(prime).is_zero())
                .count() as u64
        })
        .collect();
    Ok(Tally { votes })
}

/// Verify the decryption proofs of the tally data and extract the tally
pub fn compute_tally(
    data: &TallyData,
    n: usize,
    params: &PublicParameters,
) -> Result<Tally, Error> {
    check_decryption_proofs(
        &data.decryption_proofs,
        &data.public_key_shares,
        &data.final_shuffle,
        &data.partial_decryptions,
        params,
    )?;
    let plaintexts = get_decryptions(
        &data.final_shuffle,
        &data.partial_decryptions,
        &params.encryption_group,
    )?;
    get_tally(&plaintexts, n, &params.encryption_group)
}
