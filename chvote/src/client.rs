use crate::*;

/// What the voting client shows a voter at the start of a session
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VotingPageData {
    pub voter_index: usize,

    /// Number of candidates per election
    pub candidate_counts: Vec<usize>,

    /// Number of selections the voter may make per election, zero where not eligible
    pub selection_counts: Vec<usize>,

    pub candidates: Vec<Candidate>,
}

/// The voter-facing operations
pub trait VotingClientService {
    fn start_vote_session(&mut self, voter_index: usize) -> Result<VotingPageData, Error>;

    /// Cast a ballot for the 1-based `selections`, returning one return code per selection
    fn submit_vote(&mut self, voting_code: &str, selections: &[usize]) -> Result<Vec<String>, Error>;

    /// Confirm the cast ballot, returning the finalization code
    fn confirm_vote(&mut self, confirmation_code: &str) -> Result<String, Error>;
}

struct VoteSession {
    voter_index: usize,
    params: PublicParameters,
    election_set: ElectionSet,
    public_key: BigUint,
    k_i: Vec<usize>,
    point_matrix: Option<Vec<Vec<Point>>>,
}

/// A voting client talking to a bulletin board
pub struct VotingClient<'a, B: BulletinBoardService> {
    board: &'a mut B,
    rng: RandomGenerator,
    session: Option<VoteSession>,
}

impl<'a, B: BulletinBoardService> VotingClient<'a, B> {
    pub fn new(board: &'a mut B, rng: RandomGenerator) -> Self {
        VotingClient {
            board,
            rng,
            session: None,
        }
    }
}

impl<'a, B: BulletinBoardService> VotingClientService for VotingClient<'a, B> {
    fn start_vote_session(&mut self, voter_index: usize) -> Result<VotingPageData, Error> {
        let params = self.board.get_public_parameters()?;
        let election_set = self.board.get_election_set()?;
        let public_key = self.board.get_public_key()?;

        if voter_index >= election_set.voters.len() {
            return Err(ValidationError::UnknownVoter(voter_index).into());
        }

        let page = VotingPageData {
            voter_index,
            candidate_counts: election_set.candidate_counts(),
            selection_counts: election_set.selection_counts(voter_index),
            candidates: election_set.candidates.clone(),
        };

        self.session = Some(VoteSession {
            voter_index,
            k_i: page.selection_counts.clone(),
            params,
            election_set,
            public_key,
            point_matrix: None,
        });
        Ok(page)
    }

    fn submit_vote(&mut self, voting_code: &str, selections: &[usize]) -> Result<Vec<String>, Error> {
        let session = self
            .session
            .as_mut()
            .ok_or(Error::InvalidState("no vote session started"))?;
        if session.point_matrix.is_some() {
            return Err(ValidationError::DuplicateBallot(session.voter_index).into());
        }
        check_selections(selections, &session.election_set, session.voter_index)?;

        let BallotQueryAndRand { ballot, r } = gen_ballot(
            voting_code,
            selections,
            &session.public_key,
            &session.params,
            &mut self.rng,
        )?;
        let responses = self.board.publish_ballot(session.voter_index, ballot)?;

        let point_matrix = get_point_matrix(
            &responses,
            selections,
            &r,
            &session.k_i,
            &session.params,
        )?;
        let return_codes = get_return_codes(&point_matrix, &session.params)?;
        session.point_matrix = Some(point_matrix);
        Ok(return_codes)
    }

    fn confirm_vote(&mut self, confirmation_code: &str) -> Result<String, Error> {
        let session = self
            .session
            .as_ref()
            .ok_or(Error::InvalidState("no vote session started"))?;
        let point_matrix = session
            .point_matrix
            .as_ref()
            .ok_or(ValidationError::BallotNotFound(session.voter_index))?;

        let confirmation = gen_confirmation(
            confirmation_code,
            point_matrix,
            &session.k_i,
            &session.params,
            &mut self.rng,
        )?;
        let parts = self
            .board
            .publish_confirmation(session.voter_index, confirmation)?;
        get_finalization_code(&parts, &session.params)
    }
}
