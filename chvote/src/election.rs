use crate::*;

/// A political or administrative unit that elections are held for
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainOfInfluence(pub String);

impl DomainOfInfluence {
    pub fn new<S: Into<String>>(id: S) -> Self {
        DomainOfInfluence(id.into())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Voter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub domains: Vec<DomainOfInfluence>,
}

impl Voter {
    pub fn new(domains: Vec<DomainOfInfluence>) -> Self {
        Voter {
            description: None,
            domains,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub description: String,
}

impl Candidate {
    pub fn new<S: Into<String>>(description: S) -> Self {
        Candidate {
            description: description.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Election {
    pub number_of_candidates: usize,
    pub number_of_selections: usize,
    pub domain: DomainOfInfluence,
}

/// All elections of one voting event, the electorate, and the candidates of all elections in order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ElectionSet {
    pub voters: Vec<Voter>,
    pub elections: Vec<Election>,
    pub candidates: Vec<Candidate>,
}

impl ElectionSet {
    pub fn new(
        voters: Vec<Voter>,
        elections: Vec<Election>,
        candidates: Vec<Candidate>,
    ) -> Result<Self, Error> {
        let set = ElectionSet {
            voters,
            elections,
            candidates,
        };
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.elections.is_empty() {
            return Err(Error::InvalidElectionSet(
                "at least one election is required".to_owned(),
            ));
        }
        for (j, election) in self.elections.iter().enumerate() {
            if election.number_of_selections == 0
                || election.number_of_selections >= election.number_of_candidates
            {
                return Err(Error::InvalidElectionSet(format!(
                    "election {} must allow between 1 and {} selections",
                    j,
                    election.number_of_candidates.saturating_sub(1)
                )));
            }
        }
        if self.candidates.len() != self.total_candidates() {
            return Err(Error::InvalidElectionSet(format!(
                "expected {} candidates, got {}",
                self.total_candidates(),
                self.candidates.len()
            )));
        }
        Ok(())
    }

    pub fn is_eligible(&self, voter: usize, election: usize) -> bool {
        match (self.voters.get(voter), self.elections.get(election)) {
            (Some(v), Some(e)) => v.domains.contains(&e.domain),
            _ => false,
        }
    }

    /// Number of candidates per election
    pub fn candidate_counts(&self) -> Vec<usize> {
        self.elections
            .iter()
            .map(|e| e.number_of_candidates)
            .collect()
    }

    /// Number of selections the voter may make per election (zero where ineligible)
    pub fn selection_counts(&self, voter: usize) -> Vec<usize> {
        self.elections
            .iter()
            .enumerate()
            .map(|(j, e)| {
                if self.is_eligible(voter, j) {
                    e.number_of_selections
                } else {
                    0
                }
            })
            .collect()
    }

    /// Selection count matrix `K[voter][election]`
    pub fn selection_matrix(&self) -> Vec<Vec<usize>> {
        (0..self.voters.len())
            .map(|i| self.selection_counts(i))
            .collect()
    }

    pub fn total_candidates(&self) -> usize {
        self.elections.iter().map(|e| e.number_of_candidates).sum()
    }

    /// Index of the first candidate of each election in the flat candidate list
    pub fn candidate_offsets(&self) -> Vec<usize> {
        self.elections
            .iter()
            .scan(0, |offset, e| {
                let start = *offset;
                *offset += e.number_of_candidates;
                Some(start)
            })
            .collect()
    }

    /// Check that every voter's largest possible vote, the product of the top primes of each
    /// election, stays below `p` and so survives decryption
    pub fn check_encoding(&self, group: &EncryptionGroup) -> Result<(), Error> {
        let primes = get_primes(self.total_candidates(), group)?;
        let offsets = self.candidate_offsets();

        for voter in 0..self.voters.len() {
            let largest = self
                .selection_counts(voter)
                .into_iter()
                .zip(offsets.iter().zip(self.elections.iter()))
                .flat_map(|(k, (offset, election))| {
                    let end = offset + election.number_of_candidates;
                    primes[end - k..end].iter()
                })
                .fold(BigUint::from(1u32), |product, prime| product * prime);

            if largest >= group.p {
                return Err(Error::IncompatibleParameters(format!(
                    "the votes of voter {} do not fit in the encryption group",
                    voter
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ElectionSet {
        let federal = DomainOfInfluence::new("federal");
        let canton = DomainOfInfluence::new("canton");
        ElectionSet::new(
            vec![
                Voter::new(vec![federal.clone(), canton.clone()]),
                Voter::new(vec![federal.clone()]),
            ],
            vec![
                Election {
                    number_of_candidates: 3,
                    number_of_selections: 1,
                    domain: federal,
                },
                Election {
                    number_of_candidates: 4,
                    number_of_selections: 2,
                    domain: canton,
                },
            ],
            (0..7).map(|i| Candidate::new(format!("candidate {}", i))).collect(),
        )
        .unwrap()
    }

    #[test]
    fn eligibility() {
        let set = sample();
        assert_eq!(set.selection_counts(0), vec![1, 2]);
        assert_eq!(set.selection_counts(1), vec![1, 0]);
        assert!(!set.is_eligible(2, 0));
        assert_eq!(set.candidate_counts(), vec![3, 4]);
        assert_eq!(set.candidate_offsets(), vec![0, 3]);
        assert_eq!(set.total_candidates(), 7);
    }

    #[test]
    fn invalid_sets() {
        let mut set = sample();
        set.candidates.pop();
        assert!(set.validate().is_err());

        let mut set = sample();
        set.elections[0].number_of_selections = 3;
        assert!(set.validate().is_err());

        let mut set = sample();
        set.elections[1].number_of_selections = 0;
        assert!(set.validate().is_err());
    }

    #[test]
    fn vote_encoding_fits_the_group() {
        let group = PublicParameters::testing(1).unwrap().encryption_group;
        assert!(sample().check_encoding(&group).is_ok());

        // Thirty of the primes from 79 upwards exceed a 128-bit p
        let domain = DomainOfInfluence::new("federal");
        let large = ElectionSet::new(
            vec![Voter::new(vec![domain.clone()])],
            vec![Election {
                number_of_candidates: 40,
                number_of_selections: 30,
                domain,
            }],
            (0..40).map(|i| Candidate::new(format!("candidate {}", i))).collect(),
        )
        .unwrap();
        assert!(matches!(
            large.check_encoding(&group),
            Err(Error::IncompatibleParameters(_))
        ));

        // Ineligible voters cast the empty product
        let mut ineligible = large;
        ineligible.voters[0].domains.clear();
        assert!(ineligible.check_encoding(&group).is_ok());
    }
}
