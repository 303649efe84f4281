use crate::*;
use num_enum::TryFromPrimitive;
use std::collections::BTreeMap;
use std::fmt::Display;

/// A kind of bulletin-board slot
#[derive(
    Serialize, Deserialize, TryFromPrimitive, Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Slot {
    PublicParameters = 1,
    ElectionSet = 2,
    PublicKeyPart = 3,
    PublicCredentialPart = 4,
    Ballot = 5,
    Confirmation = 6,
    Shuffle = 7,
    PartialDecryption = 8,
    Tally = 9,
}

impl Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Slot::PublicParameters => "PublicParameters",
            Slot::ElectionSet => "ElectionSet",
            Slot::PublicKeyPart => "PublicKeyPart",
            Slot::PublicCredentialPart => "PublicCredentialPart",
            Slot::Ballot => "Ballot",
            Slot::Confirmation => "Confirmation",
            Slot::Shuffle => "Shuffle",
            Slot::PartialDecryption => "PartialDecryption",
            Slot::Tally => "Tally",
        };
        write!(f, "{}", name)
    }
}

/// A write-once bulletin-board location. The index is an authority or voter index, zero for singletons.
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub slot: Slot,
    pub index: usize,
}

impl SlotKey {
    pub fn new(slot: Slot, index: usize) -> Self {
        SlotKey { slot, index }
    }

    /// Key of a slot that exists once per election
    pub fn single(slot: Slot) -> Self {
        SlotKey { slot, index: 0 }
    }
}

impl Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.slot, self.index)
    }
}

/// A published bulletin-board entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Entry {
    PublicParameters(PublicParameters),
    ElectionSet(ElectionSet),
    PublicKeyPart {
        authority: usize,
        #[serde(with = "BigUintHex")]
        public_key: BigUint,
    },
    PublicCredentialPart {
        authority: usize,
        credentials: Vec<PublicCredentials>,
    },
    Ballot {
        voter_index: usize,
        ballot: BallotAndQuery,
    },
    Confirmation(ConfirmationEntry),
    Shuffle {
        authority: usize,
        encryptions: Vec<Encryption>,
        proof: ShuffleProof,
    },
    PartialDecryption {
        authority: usize,
        #[serde(with = "biguint_vec_hex")]
        partial_decryptions: Vec<BigUint>,
        proof: NonInteractiveZkp,
    },
    Tally(Tally),
}

impl Entry {
    pub fn key(&self) -> SlotKey {
        match self {
            Entry::PublicParameters(_) => SlotKey::single(Slot::PublicParameters),
            Entry::ElectionSet(_) => SlotKey::single(Slot::ElectionSet),
            Entry::PublicKeyPart { authority, .. } => SlotKey::new(Slot::PublicKeyPart, *authority),
            Entry::PublicCredentialPart { authority, .. } => {
                SlotKey::new(Slot::PublicCredentialPart, *authority)
            }
            Entry::Ballot { voter_index, .. } => SlotKey::new(Slot::Ballot, *voter_index),
            Entry::Confirmation(c) => SlotKey::new(Slot::Confirmation, c.voter_index),
            Entry::Shuffle { authority, .. } => SlotKey::new(Slot::Shuffle, *authority),
            Entry::PartialDecryption { authority, .. } => {
                SlotKey::new(Slot::PartialDecryption, *authority)
            }
            Entry::Tally(_) => SlotKey::single(Slot::Tally),
        }
    }

    pub fn slot(&self) -> Slot {
        self.key().slot
    }
}

/// Read access to the bulletin board
pub trait Store {
    /// Get an entry of an unknown type
    fn get_entry(&self, key: SlotKey) -> Option<Entry>;

    /// All entries of one kind, ordered by index
    fn get_entries(&self, slot: Slot) -> Vec<Entry>;

    fn get_public_parameters(&self) -> Result<PublicParameters, Error> {
        let key = SlotKey::single(Slot::PublicParameters);
        match self.get_entry(key) {
            Some(Entry::PublicParameters(params)) => Ok(params),
            _ => Err(Error::NotPublished(key)),
        }
    }

    fn get_election_set(&self) -> Result<ElectionSet, Error> {
        let key = SlotKey::single(Slot::ElectionSet);
        match self.get_entry(key) {
            Some(Entry::ElectionSet(set)) => Ok(set),
            _ => Err(Error::NotPublished(key)),
        }
    }

    fn get_public_key_part(&self, authority: usize) -> Result<BigUint, Error> {
        let key = SlotKey::new(Slot::PublicKeyPart, authority);
        match self.get_entry(key) {
            Some(Entry::PublicKeyPart { public_key, .. }) => Ok(public_key),
            _ => Err(Error::NotPublished(key)),
        }
    }

    /// Every authority's public key share
    fn get_public_key_parts(&self) -> Result<Vec<BigUint>, Error> {
        let s = self.get_public_parameters()?.s;
        (0..s).map(|j| self.get_public_key_part(j)).collect()
    }

    /// The combined election public key
    fn get_public_key(&self) -> Result<BigUint, Error> {
        let params = self.get_public_parameters()?;
        let shares = self.get_public_key_parts()?;
        Ok(get_public_key(&shares, &params.encryption_group))
    }

    fn get_public_credential_part(&self, authority: usize) -> Result<Vec<PublicCredentials>, Error> {
        let key = SlotKey::new(Slot::PublicCredentialPart, authority);
        match self.get_entry(key) {
            Some(Entry::PublicCredentialPart { credentials, .. }) => Ok(credentials),
            _ => Err(Error::NotPublished(key)),
        }
    }

    fn get_public_credential_parts(&self) -> Result<Vec<Vec<PublicCredentials>>, Error> {
        let s = self.get_public_parameters()?.s;
        (0..s).map(|j| self.get_public_credential_part(j)).collect()
    }

    /// The voters' combined public credentials
    fn get_public_credentials(&self) -> Result<Vec<PublicCredentials>, Error> {
        let params = self.get_public_parameters()?;
        let parts = self.get_public_credential_parts()?;
        get_public_credentials(&parts, &params.identification_group)
    }

    fn get_ballot(&self, voter_index: usize) -> Result<BallotAndQuery, Error> {
        let key = SlotKey::new(Slot::Ballot, voter_index);
        match self.get_entry(key) {
            Some(Entry::Ballot { ballot, .. }) => Ok(ballot),
            _ => Err(Error::NotPublished(key)),
        }
    }

    /// Every published ballot, ordered by voter index
    fn get_ballots(&self) -> Vec<BallotEntry> {
        self.get_entries(Slot::Ballot)
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Ballot {
                    voter_index,
                    ballot,
                } => Some(BallotEntry {
                    voter_index,
                    ballot,
                    randomizations: vec![],
                }),
                _ => None,
            })
            .collect()
    }

    /// The encryptions of the confirmed ballots, which is the input of the mixing chain
    fn get_confirmed_encryptions(&self) -> Result<Vec<Encryption>, Error> {
        let params = self.get_public_parameters()?;
        Ok(get_encryptions(
            &self.get_ballots(),
            &self.get_confirmations(),
            &params.encryption_group,
        ))
    }

    fn get_confirmations(&self) -> Vec<ConfirmationEntry> {
        self.get_entries(Slot::Confirmation)
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Confirmation(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    fn get_shuffle(&self, authority: usize) -> Result<(Vec<Encryption>, ShuffleProof), Error> {
        let key = SlotKey::new(Slot::Shuffle, authority);
        match self.get_entry(key) {
            Some(Entry::Shuffle {
                encryptions, proof, ..
            }) => Ok((encryptions, proof)),
            _ => Err(Error::NotPublished(key)),
        }
    }

    /// The mixing chain published so far, starting with authority 0
    fn get_shuffles(&self) -> Vec<(Vec<Encryption>, ShuffleProof)> {
        let mut shuffles = vec![];
        while let Ok(shuffle) = self.get_shuffle(shuffles.len()) {
            shuffles.push(shuffle);
        }
        shuffles
    }

    fn get_partial_decryption(
        &self,
        authority: usize,
    ) -> Result<(Vec<BigUint>, NonInteractiveZkp), Error> {
        let key = SlotKey::new(Slot::PartialDecryption, authority);
        match self.get_entry(key) {
            Some(Entry::PartialDecryption {
                partial_decryptions,
                proof,
                ..
            }) => Ok((partial_decryptions, proof)),
            _ => Err(Error::NotPublished(key)),
        }
    }

    /// Everything needed to compute and verify the tally
    fn get_tally_data(&self) -> Result<TallyData, Error> {
        let s = self.get_public_parameters()?.s;
        let public_key_shares = self.get_public_key_parts()?;
        let (final_shuffle, _) = self.get_shuffle(s - 1)?;

        let mut partial_decryptions = Vec::with_capacity(s);
        let mut decryption_proofs = Vec::with_capacity(s);
        for j in 0..s {
            let (partial, proof) = self.get_partial_decryption(j)?;
            partial_decryptions.push(partial);
            decryption_proofs.push(proof);
        }

        Ok(TallyData {
            public_key_shares,
            final_shuffle,
            partial_decryptions,
            decryption_proofs,
        })
    }

    fn get_tally(&self) -> Result<Tally, Error> {
        let key = SlotKey::single(Slot::Tally);
        match self.get_entry(key) {
            Some(Entry::Tally(tally)) => Ok(tally),
            _ => Err(Error::NotPublished(key)),
        }
    }
}

/// A simple store that uses an in-memory BTreeMap
#[derive(Default, Clone, Debug)]
pub struct MemStore {
    inner: BTreeMap<SlotKey, Entry>,
}

impl MemStore {
    /// Publish an entry into its slot. Every slot can be written exactly once.
    pub fn publish(&mut self, entry: Entry) -> Result<(), Error> {
        let key = entry.key();
        if self.inner.contains_key(&key) {
            return Err(match key.slot {
                Slot::Ballot => ValidationError::DuplicateBallot(key.index).into(),
                Slot::Confirmation => ValidationError::DuplicateConfirmation(key.index).into(),
                _ => Error::AlreadyPublished(key),
            });
        }
        if key.slot == Slot::Confirmation
            && !self.inner.contains_key(&SlotKey::new(Slot::Ballot, key.index))
        {
            return Err(ValidationError::BallotNotFound(key.index).into());
        }

        debug!("publishing {}", key);
        self.inner.insert(key, entry);
        Ok(())
    }

    pub fn is_published(&self, key: SlotKey) -> bool {
        self.inner.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Store for MemStore {
    fn get_entry(&self, key: SlotKey) -> Option<Entry> {
        self.inner.get(&key).cloned()
    }

    fn get_entries(&self, slot: Slot) -> Vec<Entry> {
        let start = SlotKey::new(slot, 0);
        let end = SlotKey::new(slot, usize::MAX);
        self.inner
            .range(start..=end)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    fn ballot_entry(voter_index: usize) -> Entry {
        Entry::Ballot {
            voter_index,
            ballot: BallotAndQuery {
                x_circ: BigUint::from(1u32),
                a: vec![],
                b: BigUint::from(1u32),
                pi: NonInteractiveZkp {
                    t: vec![],
                    s: vec![],
                },
            },
        }
    }

    fn confirmation_entry(voter_index: usize) -> Entry {
        Entry::Confirmation(ConfirmationEntry {
            voter_index,
            confirmation: Confirmation {
                y_circ: BigUint::from(1u32),
                pi: NonInteractiveZkp {
                    t: vec![],
                    s: vec![],
                },
            },
        })
    }

    #[test]
    fn slot_numbering() {
        assert_eq!(Slot::PublicParameters as u8, 1);
        assert_eq!(Slot::Tally as u8, 9);
        assert_eq!(Slot::try_from(5u8).unwrap(), Slot::Ballot);
        assert!(Slot::try_from(10u8).is_err());
        assert_eq!(SlotKey::new(Slot::Shuffle, 2).to_string(), "Shuffle 2");
    }

    #[test]
    fn slots_are_write_once() {
        let mut store = MemStore::default();
        let params = PublicParameters::testing(2).unwrap();
        store
            .publish(Entry::PublicParameters(params.clone()))
            .unwrap();
        assert!(matches!(
            store.publish(Entry::PublicParameters(params.clone())),
            Err(Error::AlreadyPublished(_))
        ));
        assert_eq!(store.get_public_parameters().unwrap(), params);

        store
            .publish(Entry::PublicKeyPart {
                authority: 0,
                public_key: BigUint::from(4u32),
            })
            .unwrap();
        assert!(store
            .publish(Entry::PublicKeyPart {
                authority: 0,
                public_key: BigUint::from(9u32),
            })
            .is_err());
        assert_eq!(store.get_public_key_part(0).unwrap(), BigUint::from(4u32));

        // Authority 1 has not published yet
        match store.get_public_key() {
            Err(Error::NotPublished(key)) => assert_eq!(key, SlotKey::new(Slot::PublicKeyPart, 1)),
            other => panic!("unexpected result {:?}", other),
        }
        store
            .publish(Entry::PublicKeyPart {
                authority: 1,
                public_key: BigUint::from(9u32),
            })
            .unwrap();
        assert_eq!(store.get_public_key().unwrap(), BigUint::from(36u32));
    }

    #[test]
    fn ballots_and_confirmations() {
        let mut store = MemStore::default();

        match store.publish(confirmation_entry(3)) {
            Err(Error::Validation(ValidationError::BallotNotFound(3))) => {}
            other => panic!("unexpected result {:?}", other),
        }

        store.publish(ballot_entry(3)).unwrap();
        store.publish(ballot_entry(1)).unwrap();
        match store.publish(ballot_entry(3)) {
            Err(Error::Validation(ValidationError::DuplicateBallot(3))) => {}
            other => panic!("unexpected result {:?}", other),
        }

        store.publish(confirmation_entry(3)).unwrap();
        match store.publish(confirmation_entry(3)) {
            Err(Error::Validation(ValidationError::DuplicateConfirmation(3))) => {}
            other => panic!("unexpected result {:?}", other),
        }

        assert_eq!(store.get_entries(Slot::Ballot).len(), 2);
        assert_eq!(store.get_confirmations().len(), 1);
        assert!(store.get_ballot(1).is_ok());
        assert!(store.get_ballot(2).is_err());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn entries_serialize_with_type_tag() {
        let entry = Entry::PublicKeyPart {
            authority: 1,
            public_key: BigUint::from(4u32),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"type":"public_key_part","authority":1,"public_key":"04"}"#);
        let decoded: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, entry);

        let entry = Entry::PartialDecryption {
            authority: 0,
            partial_decryptions: vec![BigUint::from(4u32), BigUint::from(0xc3a7u32)],
            proof: NonInteractiveZkp {
                t: vec![BigUint::from(9u32)],
                s: vec![],
            },
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""partial_decryptions":["04","c3a7"]"#));
        assert!(json.contains(r#""proof":{"t":["09"],"s":[]}"#));
        assert_eq!(serde_json::from_str::<Entry>(&json).unwrap(), entry);

        let point = Point::new(BigUint::from(1u32), BigUint::from(0xc3a7u32));
        assert_eq!(serde_json::to_string(&point).unwrap(), r#"{"x":"01","y":"c3a7"}"#);
    }
}
