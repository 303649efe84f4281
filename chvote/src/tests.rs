use crate::*;
use num_integer::Integer;

fn election_set(voter_domains: Vec<Vec<&str>>, elections: &[(usize, usize, &str)]) -> ElectionSet {
    let voters = voter_domains
        .into_iter()
        .map(|domains| Voter::new(domains.into_iter().map(DomainOfInfluence::new).collect()))
        .collect();
    let elections: Vec<Election> = elections
        .iter()
        .map(|(n, k, domain)| Election {
            number_of_candidates: *n,
            number_of_selections: *k,
            domain: DomainOfInfluence::new(*domain),
        })
        .collect();
    let candidates = (0..elections.iter().map(|e| e.number_of_candidates).sum())
        .map(|c| Candidate::new(format!("candidate {}", c + 1)))
        .collect();
    ElectionSet::new(voters, elections, candidates).unwrap()
}

fn setup<A: AuthorityService>(
    authorities: Vec<A>,
    election_set: ElectionSet,
) -> (BulletinBoard<A>, Vec<CodeSheet>) {
    let params = PublicParameters::testing(authorities.len()).unwrap();
    let mut board = BulletinBoard::new(params, election_set, authorities).unwrap();
    board.run_key_generation().unwrap();
    board.run_electorate_preparation().unwrap();
    let sheets = board.print_code_sheets().unwrap();
    (board, sheets)
}

fn authorities(s: usize, seed: u8) -> Vec<Authority> {
    let mut rng = RandomGenerator::from_seed([seed; 32]);
    (0..s).map(|j| Authority::new(j, rng.fork())).collect()
}

// Vote with a fresh client, checking the return codes and finalization code against the code sheet
fn cast<A: AuthorityService>(
    board: &mut BulletinBoard<A>,
    sheet: &CodeSheet,
    selections: &[usize],
    confirm: bool,
    seed: u8,
) {
    let mut client = VotingClient::new(board, RandomGenerator::from_seed([seed; 32]));
    let page = client.start_vote_session(sheet.voter_index).unwrap();
    assert_eq!(page.selection_counts, sheet.selection_counts);

    let return_codes = client.submit_vote(&sheet.voting_code, selections).unwrap();
    let expected: Vec<String> = selections
        .iter()
        .map(|s| sheet.return_codes[s - 1].clone())
        .collect();
    assert_eq!(return_codes, expected);

    if confirm {
        let finalization_code = client.confirm_vote(&sheet.confirmation_code).unwrap();
        assert_eq!(finalization_code, sheet.finalization_code);
    }
}

fn finish<A: AuthorityService>(board: &mut BulletinBoard<A>) -> Tally {
    board.run_mixing().unwrap();
    board.run_decryption().unwrap();
    board.run_tally().unwrap()
}

#[test]
fn single_voter_end_to_end() {
    let set = election_set(vec![vec!["national"]], &[(3, 1, "national")]);
    let (mut board, sheets) = setup(authorities(2, 1), set);

    cast(&mut board, &sheets[0], &[2], true, 2);
    let tally = finish(&mut board);

    assert_eq!(tally.votes, vec![0, 1, 0]);
    assert_eq!(board.get_tally().unwrap(), tally);

    let totals = tally.totals(&board.get_election_set().unwrap());
    assert_eq!(totals.get("candidate 2"), Some(&1));
}

#[test]
fn several_voters_and_elections() {
    // Voter 2 is not eligible for the regional election
    let set = election_set(
        vec![
            vec!["national", "regional"],
            vec!["national", "regional"],
            vec!["national"],
            vec!["national", "regional"],
        ],
        &[(3, 1, "national"), (4, 2, "regional")],
    );
    let (mut board, sheets) = setup(authorities(3, 10), set);
    assert_eq!(sheets[2].selection_counts, vec![1, 0]);

    cast(&mut board, &sheets[0], &[1, 4, 6], true, 11);
    cast(&mut board, &sheets[1], &[3, 5, 7], true, 12);
    cast(&mut board, &sheets[2], &[3], true, 13);

    // Cast but never confirmed, so not counted
    cast(&mut board, &sheets[3], &[2, 4, 5], false, 14);

    let tally = finish(&mut board);
    assert_eq!(tally.votes, vec![1, 0, 2, 1, 1, 1, 1]);
    assert_eq!(tally.total_votes(), 7);
}

#[test]
fn ballot_guards() {
    let set = election_set(vec![vec!["d"], vec!["d"]], &[(3, 1, "d")]);
    let (mut board, sheets) = setup(authorities(2, 20), set);

    // Someone else's voting code does not match the voter's credential
    {
        let mut client = VotingClient::new(&mut board, RandomGenerator::from_seed([21u8; 32]));
        client.start_vote_session(0).unwrap();
        match client.submit_vote(&sheets[1].voting_code, &[1]) {
            Err(Error::Validation(ValidationError::CredentialMismatch(0))) => {}
            other => panic!("unexpected result {:?}", other),
        }
        match client.submit_vote(&sheets[0].voting_code, &[1, 2]) {
            Err(Error::InvalidSelection(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
    assert!(board.get_ballot(0).is_err());

    cast(&mut board, &sheets[0], &[1], false, 22);

    // A second session for the same voter cannot vote again
    let mut client = VotingClient::new(&mut board, RandomGenerator::from_seed([23u8; 32]));
    client.start_vote_session(0).unwrap();
    match client.submit_vote(&sheets[0].voting_code, &[3]) {
        Err(Error::Validation(e)) => {
            assert_eq!(e, ValidationError::DuplicateBallot(0));
            assert!(!e.aborts_tally());
        }
        other => panic!("unexpected result {:?}", other),
    }

    // Nor can it confirm before submitting in this session
    match client.confirm_vote(&sheets[0].confirmation_code) {
        Err(Error::Validation(ValidationError::BallotNotFound(0))) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn confirmation_guards() {
    let set = election_set(vec![vec!["d"], vec!["d"]], &[(3, 1, "d")]);
    let (mut board, sheets) = setup(authorities(2, 30), set);

    let confirmation = Confirmation {
        y_circ: board.get_public_credentials().unwrap()[1].y_circ.clone(),
        pi: NonInteractiveZkp {
            t: vec![BigUint::from(1u32)],
            s: vec![BigUint::from(1u32)],
        },
    };
    match board.publish_confirmation(1, confirmation) {
        Err(Error::Validation(ValidationError::BallotNotFound(1))) => {}
        other => panic!("unexpected result {:?}", other),
    }

    let mut client = VotingClient::new(&mut board, RandomGenerator::from_seed([31u8; 32]));
    client.start_vote_session(0).unwrap();
    client.submit_vote(&sheets[0].voting_code, &[3]).unwrap();
    match client.confirm_vote(&sheets[1].confirmation_code) {
        Err(Error::Validation(ValidationError::CredentialMismatch(0))) => {}
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(
        client.confirm_vote(&sheets[0].confirmation_code).unwrap(),
        sheets[0].finalization_code
    );
    match client.confirm_vote(&sheets[0].confirmation_code) {
        Err(Error::Validation(ValidationError::DuplicateConfirmation(0))) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn empty_election_tallies_to_zero() {
    let set = election_set(vec![vec!["d"]], &[(2, 1, "d")]);
    let (mut board, _) = setup(authorities(1, 40), set);
    let tally = finish(&mut board);
    assert_eq!(tally.votes, vec![0, 0]);
}

#[test]
fn slots_cannot_be_republished() {
    let set = election_set(vec![vec!["d"]], &[(2, 1, "d")]);
    let (mut board, _) = setup(authorities(2, 50), set);

    assert!(matches!(
        board.publish_public_key_part(0, BigUint::from(4u32)),
        Err(Error::AlreadyPublished(_))
    ));
    assert!(matches!(
        board.publish_public_parameters(PublicParameters::testing(2).unwrap()),
        Err(Error::AlreadyPublished(_))
    ));
    assert!(matches!(
        board.run_tally(),
        Err(Error::InvalidState(_))
    ));
}

#[derive(Clone, Copy, PartialEq)]
enum Fault {
    /// Swaps the first two ciphertexts of its shuffle after proving it
    SwappedShuffle,
    /// Refuses every confirmation
    RejectedConfirmation,
    /// Passes confirmation checks but fails to record them
    LostConfirmation,
    /// Publishes `p - b^sk` with a proof that satisfies the proof equations
    NegatedDecryption,
}

/// An authority that misbehaves in one way
struct FaultyAuthority {
    inner: Authority,
    fault: Option<Fault>,
    key_pair: Option<KeyPair>,
    rng: RandomGenerator,
}

fn faulty_authorities(s: usize, seed: u8, faulty: usize, fault: Fault) -> Vec<FaultyAuthority> {
    authorities(s, seed)
        .into_iter()
        .enumerate()
        .map(|(j, inner)| FaultyAuthority {
            inner,
            fault: if j == faulty { Some(fault) } else { None },
            key_pair: None,
            rng: RandomGenerator::from_seed([seed.wrapping_add(j as u8 + 1); 32]),
        })
        .collect()
}

impl FaultyAuthority {
    fn has(&self, fault: Fault) -> bool {
        self.fault == Some(fault)
    }

    fn negated_decryption(&mut self, store: &dyn Store) -> Result<(Vec<BigUint>, NonInteractiveZkp), Error> {
        let params = store.get_public_parameters()?;
        let group = &params.encryption_group;
        let key_pair = self.key_pair.as_ref().ok_or(Error::InvalidState("keys not generated"))?;
        let (final_shuffle, _) = store.get_shuffle(params.s - 1)?;

        let negated: Vec<BigUint> = get_partial_decryptions(&final_shuffle, &key_pair.secret_key, group)
            .iter()
            .map(|b| &group.p - b)
            .collect();

        // An even challenge cancels the sign in every proof equation
        loop {
            let proof = gen_decryption_proof(
                &key_pair.secret_key,
                &key_pair.public_key,
                &final_shuffle,
                &negated,
                &params,
                &mut self.rng,
            );
            let c = get_nizkp_challenge(
                decryption_public_values(&key_pair.public_key, &final_shuffle, &negated),
                HashValue::integers(&proof.t),
                &group.q,
                params.hash_length(),
            );
            if c.is_even() {
                return Ok((negated, proof));
            }
        }
    }
}

impl AuthorityService for FaultyAuthority {
    fn index(&self) -> usize {
        self.inner.index()
    }

    fn generate_keys(&mut self, store: &dyn Store) -> Result<BigUint, Error> {
        let share = self.inner.generate_keys(store)?;
        if !self.has(Fault::NegatedDecryption) {
            return Ok(share);
        }
        let params = store.get_public_parameters()?;
        let key_pair = generate_key_pair(&params.encryption_group, &mut self.rng);
        let share = key_pair.public_key.clone();
        self.key_pair = Some(key_pair);
        Ok(share)
    }

    fn build_public_key(&mut self, store: &dyn Store) -> Result<BigUint, Error> {
        self.inner.build_public_key(store)
    }

    fn generate_electorate_data(&mut self, store: &dyn Store) -> Result<Vec<PublicCredentials>, Error> {
        self.inner.generate_electorate_data(store)
    }

    fn get_private_credentials(&self) -> Result<Vec<SecretVoterData>, Error> {
        self.inner.get_private_credentials()
    }

    fn build_public_credentials(&mut self, store: &dyn Store) -> Result<(), Error> {
        self.inner.build_public_credentials(store)
    }

    fn verify_ballot(&self, voter_index: usize, ballot: &BallotAndQuery) -> Result<(), Error> {
        self.inner.verify_ballot(voter_index, ballot)
    }

    fn handle_ballot(
        &mut self,
        voter_index: usize,
        ballot: &BallotAndQuery,
    ) -> Result<ObliviousTransferResponse, Error> {
        self.inner.handle_ballot(voter_index, ballot)
    }

    fn verify_confirmation(&self, voter_index: usize, confirmation: &Confirmation) -> Result<(), Error> {
        if self.has(Fault::RejectedConfirmation) {
            return Err(Error::InvalidState("confirmations are closed"));
        }
        self.inner.verify_confirmation(voter_index, confirmation)
    }

    fn handle_confirmation(
        &mut self,
        voter_index: usize,
        confirmation: &Confirmation,
    ) -> Result<FinalizationCodePart, Error> {
        if self.has(Fault::RejectedConfirmation) || self.has(Fault::LostConfirmation) {
            return Err(Error::InvalidState("confirmations are closed"));
        }
        self.inner.handle_confirmation(voter_index, confirmation)
    }

    fn mix(&mut self, store: &dyn Store) -> Result<(Vec<Encryption>, ShuffleProof), Error> {
        let (mut encryptions, proof) = self.inner.mix(store)?;
        if self.has(Fault::SwappedShuffle) && encryptions.len() >= 2 {
            encryptions.swap(0, 1);
        }
        Ok((encryptions, proof))
    }

    fn partial_decrypt(&mut self, store: &dyn Store) -> Result<(Vec<BigUint>, NonInteractiveZkp), Error> {
        if self.has(Fault::NegatedDecryption) {
            return self.negated_decryption(store);
        }
        self.inner.partial_decrypt(store)
    }
}

#[test]
fn invalid_shuffle_aborts_tally() {
    let set = election_set(vec![vec!["d"], vec!["d"]], &[(3, 1, "d")]);
    let (mut board, sheets) = setup(faulty_authorities(2, 60, 0, Fault::SwappedShuffle), set);

    cast(&mut board, &sheets[0], &[1], true, 61);
    cast(&mut board, &sheets[1], &[3], true, 62);

    match board.run_mixing() {
        Err(Error::Validation(e)) => {
            assert_eq!(e, ValidationError::InvalidShuffleProof(0));
            assert!(e.aborts_tally());
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert!(board.get_shuffle(0).is_ok());
    assert!(board.get_shuffle(1).is_err());
    assert!(board.run_tally().is_err());
}

#[test]
fn rejected_confirmation_is_recorded_by_no_authority() {
    let set = election_set(vec![vec!["d"], vec!["d"]], &[(3, 1, "d")]);
    let (mut board, sheets) = setup(faulty_authorities(2, 63, 1, Fault::RejectedConfirmation), set);

    cast(&mut board, &sheets[0], &[2], false, 64);
    {
        let mut client = VotingClient::new(&mut board, RandomGenerator::from_seed([65u8; 32]));
        client.start_vote_session(1).unwrap();
        client.submit_vote(&sheets[1].voting_code, &[3]).unwrap();
        assert!(client.confirm_vote(&sheets[1].confirmation_code).is_err());
    }

    let authorities = board.authorities();
    assert_eq!(authorities[0].inner.ballots().len(), 2);
    assert!(authorities[0].inner.confirmations().is_empty());
    assert!(authorities[1].inner.confirmations().is_empty());
    assert!(board.get_confirmations().is_empty());

    let tally = finish(&mut board);
    assert_eq!(tally.votes, vec![0, 0, 0]);
}

#[test]
fn mixing_starts_from_the_board() {
    let set = election_set(vec![vec!["d"], vec!["d"]], &[(3, 1, "d")]);
    let (mut board, sheets) = setup(faulty_authorities(2, 66, 1, Fault::LostConfirmation), set);

    cast(&mut board, &sheets[0], &[1], false, 67);
    {
        let mut client = VotingClient::new(&mut board, RandomGenerator::from_seed([69u8; 32]));
        client.start_vote_session(1).unwrap();
        client.submit_vote(&sheets[1].voting_code, &[2]).unwrap();
        assert!(client.confirm_vote(&sheets[1].confirmation_code).is_err());
    }

    // Authority 0 recorded the confirmation that never reached the board
    #[cfg(not(feature = "parallel"))]
    assert_eq!(board.authorities()[0].inner.confirmations().len(), 1);
    assert!(board.get_confirmations().is_empty());
    assert!(board.get_confirmed_encryptions().unwrap().is_empty());

    let tally = finish(&mut board);
    assert_eq!(tally.votes, vec![0, 0, 0]);
}

#[test]
fn negated_partial_decryptions_are_refused() {
    let set = election_set(vec![vec!["d"], vec!["d"]], &[(3, 1, "d")]);
    let (mut board, sheets) = setup(faulty_authorities(2, 70, 1, Fault::NegatedDecryption), set);

    cast(&mut board, &sheets[0], &[1], true, 71);
    cast(&mut board, &sheets[1], &[3], true, 72);
    board.run_mixing().unwrap();

    match board.run_decryption() {
        Err(Error::Validation(e)) => {
            assert_eq!(e, ValidationError::InvalidDecryptionProof(1));
            assert!(e.aborts_tally());
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert!(board.get_partial_decryption(0).is_ok());
    assert!(board.get_partial_decryption(1).is_err());
    assert!(board.run_tally().is_err());
}

#[test]
fn oversized_vote_encoding_is_rejected() {
    let set = election_set(vec![vec!["d"]], &[(40, 30, "d")]);
    match BulletinBoard::new(PublicParameters::testing(1).unwrap(), set, authorities(1, 73)) {
        Err(Error::IncompatibleParameters(_)) => {}
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
}
