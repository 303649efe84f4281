use crate::*;
use num_traits::Zero;

/// What a voter receives on paper before the election
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CodeSheet {
    pub voter_index: usize,
    pub voting_code: String,
    pub confirmation_code: String,

    /// One return code per candidate, in candidate order
    pub return_codes: Vec<String>,
    pub finalization_code: String,

    /// Allowed number of selections per election
    pub selection_counts: Vec<usize>,
}

/// Combine the authorities' secret voter data into code sheets.
///
/// `secret_data[j][i]` is authority `j`'s data for voter `i`.
pub fn get_code_sheets(
    params: &PublicParameters,
    election_set: &ElectionSet,
    secret_data: &[Vec<SecretVoterData>],
) -> Result<Vec<CodeSheet>, Error> {
    if secret_data.len() != params.s {
        return Err(Error::InvalidState("secret voter data missing for some authorities"));
    }
    let voters = election_set.voters.len();
    if secret_data.iter().any(|d| d.len() != voters) {
        return Err(Error::InvalidState("secret voter data does not cover the electorate"));
    }

    (0..voters)
        .map(|i| get_code_sheet(i, params, election_set, secret_data))
        .collect()
}

fn get_code_sheet(
    voter_index: usize,
    params: &PublicParameters,
    election_set: &ElectionSet,
    secret_data: &[Vec<SecretVoterData>],
) -> Result<CodeSheet, Error> {
    let alphabet = params.alphabet();
    let parts: Vec<&SecretVoterData> = secret_data.iter().map(|d| &d[voter_index]).collect();

    let x = parts.iter().fold(BigUint::zero(), |acc, d| acc + &d.x);
    let y = parts.iter().fold(BigUint::zero(), |acc, d| acc + &d.y);

    let return_codes = (0..election_set.total_candidates())
        .map(|c| {
            let rc = xor_all(
                parts.iter().map(|d| d.rc[c].as_slice()),
                params.return_code_length(),
            );
            bytes_to_code_string(&rc, &alphabet)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let f = xor_all(
        parts.iter().map(|d| d.f.as_slice()),
        params.finalization_code_length(),
    );

    Ok(CodeSheet {
        voter_index,
        voting_code: to_code_string(&x, params.voting_code_length(), &alphabet)?,
        confirmation_code: to_code_string(&y, params.confirmation_code_length(), &alphabet)?,
        return_codes,
        finalization_code: bytes_to_code_string(&f, &alphabet)?,
        selection_counts: election_set.selection_counts(voter_index),
    })
}
