use crate::*;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The public, write-once bulletin board all parties communicate through
pub trait BulletinBoardService: Store {
    fn publish_public_parameters(&mut self, params: PublicParameters) -> Result<(), Error>;

    fn publish_election_set(&mut self, election_set: ElectionSet) -> Result<(), Error>;

    fn publish_public_key_part(&mut self, authority: usize, public_key: BigUint) -> Result<(), Error>;

    fn publish_public_credential_part(
        &mut self,
        authority: usize,
        credentials: Vec<PublicCredentials>,
    ) -> Result<(), Error>;

    /// Publish a ballot and collect every authority's OT response
    fn publish_ballot(
        &mut self,
        voter_index: usize,
        ballot: BallotAndQuery,
    ) -> Result<Vec<ObliviousTransferResponse>, Error>;

    /// Publish a confirmation and collect every authority's finalization part
    fn publish_confirmation(
        &mut self,
        voter_index: usize,
        confirmation: Confirmation,
    ) -> Result<Vec<FinalizationCodePart>, Error>;

    fn publish_shuffle(
        &mut self,
        authority: usize,
        encryptions: Vec<Encryption>,
        proof: ShuffleProof,
    ) -> Result<(), Error>;

    fn publish_partial_decryption(
        &mut self,
        authority: usize,
        partial_decryptions: Vec<BigUint>,
        proof: NonInteractiveZkp,
    ) -> Result<(), Error>;

    fn publish_tally(&mut self, tally: Tally) -> Result<(), Error>;
}

/// A bulletin board backed by a `MemStore`, driving the authorities through each phase
pub struct BulletinBoard<A: AuthorityService = Authority> {
    store: MemStore,
    authorities: Vec<A>,
}

impl<A: AuthorityService> BulletinBoard<A> {
    /// Create a board for an election. Authorities must be given in index order.
    pub fn new(
        params: PublicParameters,
        election_set: ElectionSet,
        authorities: Vec<A>,
    ) -> Result<Self, Error> {
        params.validate()?;
        election_set.validate()?;
        election_set.check_encoding(&params.encryption_group)?;
        if authorities.len() != params.s {
            return Err(Error::IncompatibleParameters(format!(
                "{} authorities configured but s = {}",
                authorities.len(),
                params.s
            )));
        }
        if authorities.iter().enumerate().any(|(j, a)| a.index() != j) {
            return Err(Error::InvalidState("authorities are not in index order"));
        }

        let mut board = BulletinBoard {
            store: MemStore::default(),
            authorities,
        };
        board.publish_public_parameters(params)?;
        board.publish_election_set(election_set)?;
        Ok(board)
    }

    pub fn authorities(&self) -> &[A] {
        &self.authorities
    }

    pub fn store(&self) -> &MemStore {
        &self.store
    }

    /// Every authority generates and publishes its key share, then builds the public key
    pub fn run_key_generation(&mut self) -> Result<BigUint, Error> {
        for authority in self.authorities.iter_mut() {
            let share = authority.generate_keys(&self.store)?;
            self.store.publish(Entry::PublicKeyPart {
                authority: authority.index(),
                public_key: share,
            })?;
        }
        for authority in self.authorities.iter_mut() {
            authority.build_public_key(&self.store)?;
        }

        info!("public key established by {} authorities", self.authorities.len());
        self.store.get_public_key()
    }

    /// Every authority generates electorate data and publishes its credential shares
    pub fn run_electorate_preparation(&mut self) -> Result<(), Error> {
        for authority in self.authorities.iter_mut() {
            let credentials = authority.generate_electorate_data(&self.store)?;
            self.store.publish(Entry::PublicCredentialPart {
                authority: authority.index(),
                credentials,
            })?;
        }
        for authority in self.authorities.iter_mut() {
            authority.build_public_credentials(&self.store)?;
        }

        info!("public voter credentials established");
        Ok(())
    }

    /// Combine the authorities' secret voter data into printable code sheets
    pub fn print_code_sheets(&self) -> Result<Vec<CodeSheet>, Error> {
        let params = self.store.get_public_parameters()?;
        let election_set = self.store.get_election_set()?;
        let secret_data = self
            .authorities
            .iter()
            .map(|a| a.get_private_credentials())
            .collect::<Result<Vec<_>, _>>()?;
        get_code_sheets(&params, &election_set, &secret_data)
    }

    /// Mixing chain: each authority in turn verifies the chain so far and publishes its shuffle
    pub fn run_mixing(&mut self) -> Result<(), Error> {
        for authority in self.authorities.iter_mut() {
            let (encryptions, proof) = authority.mix(&self.store)?;
            self.store.publish(Entry::Shuffle {
                authority: authority.index(),
                encryptions,
                proof,
            })?;
        }
        Ok(())
    }

    /// Every authority verifies the complete chain and publishes its partial decryptions
    pub fn run_decryption(&mut self) -> Result<(), Error> {
        for j in 0..self.authorities.len() {
            let (partial_decryptions, proof) = self.authorities[j].partial_decrypt(&self.store)?;
            self.publish_partial_decryption(j, partial_decryptions, proof)?;
        }
        Ok(())
    }

    /// Verify the mixing chain and every decryption proof, then publish the tally
    pub fn run_tally(&mut self) -> Result<Tally, Error> {
        let params = self.store.get_public_parameters()?;
        let election_set = self.store.get_election_set()?;
        let public_key = self.store.get_public_key()?;

        let shuffles = self.store.get_shuffles();
        if shuffles.len() != params.s {
            return Err(Error::InvalidState("mixing is not complete"));
        }
        let input = self.store.get_confirmed_encryptions()?;
        check_shuffle_proofs(&shuffles, &input, &public_key, &params)?;

        let data = self.store.get_tally_data()?;
        let tally = compute_tally(&data, election_set.total_candidates(), &params)?;
        self.publish_tally(tally.clone())?;

        info!("tally published: {} votes", tally.total_votes());
        Ok(tally)
    }
}

impl<A: AuthorityService> Store for BulletinBoard<A> {
    fn get_entry(&self, key: SlotKey) -> Option<Entry> {
        self.store.get_entry(key)
    }

    fn get_entries(&self, slot: Slot) -> Vec<Entry> {
        self.store.get_entries(slot)
    }
}

impl<A: AuthorityService> BulletinBoardService for BulletinBoard<A> {
    fn publish_public_parameters(&mut self, params: PublicParameters) -> Result<(), Error> {
        self.store.publish(Entry::PublicParameters(params))
    }

    fn publish_election_set(&mut self, election_set: ElectionSet) -> Result<(), Error> {
        self.store.publish(Entry::ElectionSet(election_set))
    }

    fn publish_public_key_part(&mut self, authority: usize, public_key: BigUint) -> Result<(), Error> {
        self.store.publish(Entry::PublicKeyPart {
            authority,
            public_key,
        })
    }

    fn publish_public_credential_part(
        &mut self,
        authority: usize,
        credentials: Vec<PublicCredentials>,
    ) -> Result<(), Error> {
        self.store.publish(Entry::PublicCredentialPart {
            authority,
            credentials,
        })
    }

    fn publish_ballot(
        &mut self,
        voter_index: usize,
        ballot: BallotAndQuery,
    ) -> Result<Vec<ObliviousTransferResponse>, Error> {
        if self.store.is_published(SlotKey::new(Slot::Ballot, voter_index)) {
            warn!("ballot of voter {} already on the board", voter_index);
            return Err(ValidationError::DuplicateBallot(voter_index).into());
        }

        // Every authority must accept the ballot before any of them records it
        #[cfg(not(feature = "parallel"))]
        let iter = self.authorities.iter();
        #[cfg(feature = "parallel")]
        let iter = self.authorities.par_iter();
        iter.map(|authority| authority.verify_ballot(voter_index, &ballot))
            .collect::<Result<Vec<()>, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let iter = self.authorities.iter_mut();
        #[cfg(feature = "parallel")]
        let iter = self.authorities.par_iter_mut();

        let responses = iter
            .map(|authority| authority.handle_ballot(voter_index, &ballot))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!("ballot of voter {} accepted by only some authorities: {}", voter_index, e);
                e
            })?;

        self.store.publish(Entry::Ballot {
            voter_index,
            ballot,
        })?;
        Ok(responses)
    }

    fn publish_confirmation(
        &mut self,
        voter_index: usize,
        confirmation: Confirmation,
    ) -> Result<Vec<FinalizationCodePart>, Error> {
        if !self.store.is_published(SlotKey::new(Slot::Ballot, voter_index)) {
            warn!("confirmation of voter {} without a ballot", voter_index);
            return Err(ValidationError::BallotNotFound(voter_index).into());
        }

        #[cfg(not(feature = "parallel"))]
        let iter = self.authorities.iter();
        #[cfg(feature = "parallel")]
        let iter = self.authorities.par_iter();
        iter.map(|authority| authority.verify_confirmation(voter_index, &confirmation))
            .collect::<Result<Vec<()>, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let iter = self.authorities.iter_mut();
        #[cfg(feature = "parallel")]
        let iter = self.authorities.par_iter_mut();

        let parts = iter
            .map(|authority| authority.handle_confirmation(voter_index, &confirmation))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!(
                    "confirmation of voter {} accepted by only some authorities: {}",
                    voter_index, e
                );
                e
            })?;

        self.store.publish(Entry::Confirmation(ConfirmationEntry {
            voter_index,
            confirmation,
        }))?;
        Ok(parts)
    }

    fn publish_shuffle(
        &mut self,
        authority: usize,
        encryptions: Vec<Encryption>,
        proof: ShuffleProof,
    ) -> Result<(), Error> {
        self.store.publish(Entry::Shuffle {
            authority,
            encryptions,
            proof,
        })
    }

    fn publish_partial_decryption(
        &mut self,
        authority: usize,
        partial_decryptions: Vec<BigUint>,
        proof: NonInteractiveZkp,
    ) -> Result<(), Error> {
        let params = self.store.get_public_parameters()?;
        let public_key_share = self.store.get_public_key_part(authority)?;
        let (final_shuffle, _) = self.store.get_shuffle(params.s - 1)?;
        if !check_decryption_proof(
            &proof,
            &public_key_share,
            &final_shuffle,
            &partial_decryptions,
            &params,
        ) {
            warn!("rejected the partial decryptions of authority {}", authority);
            return Err(ValidationError::InvalidDecryptionProof(authority).into());
        }

        self.store.publish(Entry::PartialDecryption {
            authority,
            partial_decryptions,
            proof,
        })
    }

    fn publish_tally(&mut self, tally: Tally) -> Result<(), Error> {
        self.store.publish(Entry::Tally(tally))
    }
}
