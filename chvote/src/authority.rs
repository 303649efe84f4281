use crate::*;

/// The operations an election authority performs.
///
/// Every authority keeps its secrets (key share, electorate data, OT randomizations) to itself
/// and only reads public values from the bulletin board.
pub trait AuthorityService: Send + Sync {
    /// Position of this authority in `0..s`
    fn index(&self) -> usize;

    /// Generate this authority's key pair, returning the public key share to publish
    fn generate_keys(&mut self, store: &dyn Store) -> Result<BigUint, Error>;

    /// Combine every published key share into the election public key
    fn build_public_key(&mut self, store: &dyn Store) -> Result<BigUint, Error>;

    /// Generate the secret data of every voter, returning this authority's public credential shares
    fn generate_electorate_data(&mut self, store: &dyn Store) -> Result<Vec<PublicCredentials>, Error>;

    /// The secret voter data handed to the printing authority
    fn get_private_credentials(&self) -> Result<Vec<SecretVoterData>, Error>;

    /// Combine every published credential share into the voters' public credentials
    fn build_public_credentials(&mut self, store: &dyn Store) -> Result<(), Error>;

    /// Validate a ballot without accepting it
    fn verify_ballot(&self, voter_index: usize, ballot: &BallotAndQuery) -> Result<(), Error>;

    /// Validate a ballot and answer its OT query
    fn handle_ballot(
        &mut self,
        voter_index: usize,
        ballot: &BallotAndQuery,
    ) -> Result<ObliviousTransferResponse, Error>;

    /// Validate a confirmation without accepting it
    fn verify_confirmation(&self, voter_index: usize, confirmation: &Confirmation) -> Result<(), Error>;

    /// Validate a confirmation and release this authority's finalization part
    fn handle_confirmation(
        &mut self,
        voter_index: usize,
        confirmation: &Confirmation,
    ) -> Result<FinalizationCodePart, Error>;

    /// Verify the mixing chain so far and shuffle its last output.
    ///
    /// The chain starts from the confirmed ballots published on the board.
    fn mix(&mut self, store: &dyn Store) -> Result<(Vec<Encryption>, ShuffleProof), Error>;

    /// Verify the complete mixing chain and partially decrypt its output
    fn partial_decrypt(&mut self, store: &dyn Store) -> Result<(Vec<BigUint>, NonInteractiveZkp), Error>;
}

/// An election authority and its private state
pub struct Authority {
    index: usize,
    rng: RandomGenerator,
    params: Option<PublicParameters>,
    election_set: Option<ElectionSet>,
    key_pair: Option<KeyPair>,
    public_key: Option<BigUint>,
    electorate_data: Option<ElectorateData>,
    public_credentials: Option<Vec<PublicCredentials>>,
    ballots: Vec<BallotEntry>,
    confirmations: Vec<ConfirmationEntry>,
}

fn require<'a, T>(value: &'a Option<T>, missing: &'static str) -> Result<&'a T, Error> {
    value.as_ref().ok_or(Error::InvalidState(missing))
}

impl Authority {
    pub fn new(index: usize, rng: RandomGenerator) -> Self {
        Authority {
            index,
            rng,
            params: None,
            election_set: None,
            key_pair: None,
            public_key: None,
            electorate_data: None,
            public_credentials: None,
            ballots: vec![],
            confirmations: vec![],
        }
    }

    pub fn from_entropy(index: usize) -> Self {
        Self::new(index, RandomGenerator::from_entropy())
    }

    /// Ballots accepted so far, in arrival order
    pub fn ballots(&self) -> &[BallotEntry] {
        &self.ballots
    }

    /// Confirmations accepted so far, in arrival order
    pub fn confirmations(&self) -> &[ConfirmationEntry] {
        &self.confirmations
    }

    fn load_parameters(&mut self, store: &dyn Store) -> Result<(), Error> {
        let params = store.get_public_parameters()?;
        if self.index >= params.s {
            return Err(Error::InvalidState("authority index out of range"));
        }
        self.params = Some(params);
        Ok(())
    }

    fn ballot_of(&self, voter_index: usize) -> Option<&BallotEntry> {
        self.ballots.iter().find(|b| b.voter_index == voter_index)
    }

    fn verified_chain(&self, store: &dyn Store) -> Result<Vec<(Vec<Encryption>, ShuffleProof)>, Error> {
        let params = require(&self.params, "public parameters not loaded")?;
        let public_key = require(&self.public_key, "public key not built")?;

        let shuffles = store.get_shuffles();
        let input = store.get_confirmed_encryptions()?;
        check_shuffle_proofs(&shuffles, &input, public_key, params)?;
        Ok(shuffles)
    }
}

impl AuthorityService for Authority {
    fn index(&self) -> usize {
        self.index
    }

    fn generate_keys(&mut self, store: &dyn Store) -> Result<BigUint, Error> {
        self.load_parameters(store)?;
        let params = require(&self.params, "public parameters not loaded")?;

        let key_pair = generate_key_pair(&params.encryption_group, &mut self.rng);
        let share = key_pair.public_key.clone();
        self.key_pair = Some(key_pair);

        info!("authority {} generated its key share", self.index);
        Ok(share)
    }

    fn build_public_key(&mut self, store: &dyn Store) -> Result<BigUint, Error> {
        let public_key = store.get_public_key()?;
        self.public_key = Some(public_key.clone());
        Ok(public_key)
    }

    fn generate_electorate_data(&mut self, store: &dyn Store) -> Result<Vec<PublicCredentials>, Error> {
        if self.params.is_none() {
            self.load_parameters(store)?;
        }
        let params = require(&self.params, "public parameters not loaded")?;
        let election_set = store.get_election_set()?;
        election_set.validate()?;

        let data = gen_electorate_data(&election_set, params, &mut self.rng);
        let public_voter_data = data.public_voter_data.clone();

        info!(
            "authority {} generated electorate data for {} voters",
            self.index,
            election_set.voters.len()
        );
        self.election_set = Some(election_set);
        self.electorate_data = Some(data);
        Ok(public_voter_data)
    }

    fn get_private_credentials(&self) -> Result<Vec<SecretVoterData>, Error> {
        let data = require(&self.electorate_data, "electorate data not generated")?;
        Ok(data.secret_voter_data.clone())
    }

    fn build_public_credentials(&mut self, store: &dyn Store) -> Result<(), Error> {
        require(&self.electorate_data, "electorate data not generated")?;
        self.public_credentials = Some(store.get_public_credentials()?);
        Ok(())
    }

    fn verify_ballot(&self, voter_index: usize, ballot: &BallotAndQuery) -> Result<(), Error> {
        let params = require(&self.params, "public parameters not loaded")?;
        let public_key = require(&self.public_key, "public key not built")?;
        let data = require(&self.electorate_data, "electorate data not generated")?;
        let public_credentials = require(&self.public_credentials, "public credentials not built")?;

        let already_cast = self.ballot_of(voter_index).is_some();
        if let Err(e) = check_ballot(
            voter_index,
            ballot,
            already_cast,
            public_key,
            &data.k,
            public_credentials,
            params,
        ) {
            warn!("authority {} rejected a ballot: {}", self.index, e);
            return Err(e.into());
        }
        Ok(())
    }

    fn handle_ballot(
        &mut self,
        voter_index: usize,
        ballot: &BallotAndQuery,
    ) -> Result<ObliviousTransferResponse, Error> {
        self.verify_ballot(voter_index, ballot)?;

        let params = require(&self.params, "public parameters not loaded")?;
        let election_set = require(&self.election_set, "election set not loaded")?;
        let public_key = require(&self.public_key, "public key not built")?;
        let data = require(&self.electorate_data, "electorate data not generated")?;

        let (response, randomizations) = gen_response(
            &ballot.a,
            public_key,
            &election_set.candidate_counts(),
            &data.k[voter_index],
            &data.points[voter_index],
            params,
            &mut self.rng,
        )?;

        debug!("authority {} accepted the ballot of voter {}", self.index, voter_index);
        self.ballots.push(BallotEntry {
            voter_index,
            ballot: ballot.clone(),
            randomizations,
        });
        Ok(response)
    }

    fn verify_confirmation(&self, voter_index: usize, confirmation: &Confirmation) -> Result<(), Error> {
        let params = require(&self.params, "public parameters not loaded")?;
        let public_credentials = require(&self.public_credentials, "public credentials not built")?;

        let already_confirmed = self
            .confirmations
            .iter()
            .any(|c| c.voter_index == voter_index);
        if let Err(e) = check_confirmation(
            voter_index,
            confirmation,
            self.ballot_of(voter_index).is_some(),
            already_confirmed,
            public_credentials,
            params,
        ) {
            warn!("authority {} rejected a confirmation: {}", self.index, e);
            return Err(e.into());
        }
        Ok(())
    }

    fn handle_confirmation(
        &mut self,
        voter_index: usize,
        confirmation: &Confirmation,
    ) -> Result<FinalizationCodePart, Error> {
        self.verify_confirmation(voter_index, confirmation)?;

        let data = require(&self.electorate_data, "electorate data not generated")?;
        let ballot = self
            .ballot_of(voter_index)
            .ok_or(ValidationError::BallotNotFound(voter_index))?;
        let part = get_finalization(&data.secret_voter_data[voter_index], ballot);

        debug!("authority {} accepted the confirmation of voter {}", self.index, voter_index);
        self.confirmations.push(ConfirmationEntry {
            voter_index,
            confirmation: confirmation.clone(),
        });
        Ok(part)
    }

    fn mix(&mut self, store: &dyn Store) -> Result<(Vec<Encryption>, ShuffleProof), Error> {
        let shuffles = self.verified_chain(store)?;
        if shuffles.len() != self.index {
            return Err(Error::InvalidState("mixing out of order"));
        }

        let params = require(&self.params, "public parameters not loaded")?;
        let public_key = require(&self.public_key, "public key not built")?;
        let input = match shuffles.last() {
            Some((encryptions, _)) => encryptions.clone(),
            None => store.get_confirmed_encryptions()?,
        };

        let shuffle = gen_shuffle(&input, public_key, &params.encryption_group, &mut self.rng);
        let proof = gen_shuffle_proof(&input, &shuffle, public_key, params, &mut self.rng);

        info!("authority {} mixed {} encryptions", self.index, input.len());
        Ok((shuffle.encryptions, proof))
    }

    fn partial_decrypt(&mut self, store: &dyn Store) -> Result<(Vec<BigUint>, NonInteractiveZkp), Error> {
        let shuffles = self.verified_chain(store)?;
        let params = require(&self.params, "public parameters not loaded")?;
        let key_pair = require(&self.key_pair, "keys not generated")?;
        if shuffles.len() != params.s {
            return Err(Error::InvalidState("mixing is not complete"));
        }
        let final_shuffle = match shuffles.last() {
            Some((encryptions, _)) => encryptions,
            None => return Err(Error::InvalidState("mixing is not complete")),
        };

        let partial_decryptions = get_partial_decryptions(
            final_shuffle,
            &key_pair.secret_key,
            &params.encryption_group,
        );
        let proof = gen_decryption_proof(
            &key_pair.secret_key,
            &key_pair.public_key,
            final_shuffle,
            &partial_decryptions,
            params,
            &mut self.rng,
        );

        info!("authority {} partially decrypted the final shuffle", self.index);
        Ok((partial_decryptions, proof))
    }
}
