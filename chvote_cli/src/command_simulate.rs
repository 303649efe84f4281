use crate::config::Config;
use chvote::*;
use log::{info, warn};
use std::convert::TryInto;
use std::fmt::Display;

fn fail<E: Display>(context: &str, e: E) -> ! {
    eprintln!("chvote simulate: {}: {}", context, e);
    std::process::exit(1);
}

fn parse_list(input: &str, name: &str) -> Vec<usize> {
    input
        .split(',')
        .map(|n| {
            n.trim()
                .parse()
                .unwrap_or_else(|e| fail(&format!("invalid {} {}", name, n), e))
        })
        .collect()
}

fn parse_seed(input: &str) -> [u8; 32] {
    let bytes = hex::decode(input).unwrap_or_else(|e| fail("invalid seed", e));
    bytes
        .as_slice()
        .try_into()
        .unwrap_or_else(|_| fail("invalid seed", "expected 32 bytes"))
}

// Random 1-based selections honouring the voter's allowed selection counts
fn random_selections(
    election_set: &ElectionSet,
    selection_counts: &[usize],
    rng: &mut RandomGenerator,
) -> Vec<usize> {
    let offsets = election_set.candidate_offsets();
    let mut selections = vec![];
    for (j, election) in election_set.elections.iter().enumerate() {
        let mut chosen: Vec<usize> = gen_permutation(election.number_of_candidates, rng)
            .into_iter()
            .take(selection_counts[j])
            .map(|c| offsets[j] + c + 1)
            .collect();
        chosen.sort_unstable();
        selections.extend(chosen);
    }
    selections
}

pub fn command_simulate(matches: &clap::ArgMatches, config: &Config) {
    let params = config
        .load_params(matches.value_of("params"))
        .unwrap_or_else(|e| fail("parameters", e));

    let authorities: Option<usize> = matches
        .value_of("authorities")
        .map(|s| s.parse().unwrap_or_else(|e| fail("invalid number of authorities", e)));
    let params = match (params, authorities) {
        (Some(params), Some(s)) if params.s != s => fail(
            "parameters",
            format!("parameter file is for {} authorities, not {}", params.s, s),
        ),
        (Some(params), _) => params,
        (None, s) => PublicParameters::testing(s.unwrap_or(2)).unwrap_or_else(|e| fail("parameters", e)),
    };

    let voters: usize = matches
        .value_of("voters")
        .unwrap_or("5")
        .parse()
        .unwrap_or_else(|e| fail("invalid number of voters", e));
    let candidates = parse_list(matches.value_of("candidates").unwrap_or("3"), "candidates");
    let selections = parse_list(matches.value_of("selections").unwrap_or("1"), "selections");
    if candidates.len() != selections.len() {
        fail(
            "election set",
            "--candidates and --selections must list the same number of elections",
        );
    }

    let domain = DomainOfInfluence::new("all");
    let elections = candidates
        .iter()
        .zip(selections.iter())
        .map(|(n, k)| Election {
            number_of_candidates: *n,
            number_of_selections: *k,
            domain: domain.clone(),
        })
        .collect();
    let total: usize = candidates.iter().sum();
    let election_set = ElectionSet::new(
        (0..voters).map(|_| Voter::new(vec![domain.clone()])).collect(),
        elections,
        (0..total)
            .map(|c| Candidate::new(format!("Candidate {}", c + 1)))
            .collect(),
    )
    .unwrap_or_else(|e| fail("election set", e));

    let mut rng = match matches.value_of("seed") {
        Some(seed) => RandomGenerator::from_seed(parse_seed(seed)),
        None => RandomGenerator::from_entropy(),
    };

    let authorities: Vec<Authority> = (0..params.s)
        .map(|j| Authority::new(j, rng.fork()))
        .collect();
    let mut board = BulletinBoard::new(params, election_set.clone(), authorities)
        .unwrap_or_else(|e| fail("bulletin board", e));

    board
        .run_key_generation()
        .unwrap_or_else(|e| fail("key generation", e));
    board
        .run_electorate_preparation()
        .unwrap_or_else(|e| fail("electorate preparation", e));
    let sheets = board
        .print_code_sheets()
        .unwrap_or_else(|e| fail("code sheets", e));
    println!("> Printed {} code sheets", sheets.len());

    let mut expected = vec![0u64; total];
    for sheet in &sheets {
        let chosen = random_selections(&election_set, &sheet.selection_counts, &mut rng);
        let mut client = VotingClient::new(&mut board, rng.fork());

        client
            .start_vote_session(sheet.voter_index)
            .unwrap_or_else(|e| fail("vote session", e));
        let return_codes = client
            .submit_vote(&sheet.voting_code, &chosen)
            .unwrap_or_else(|e| fail("vote", e));
        let expected_codes: Vec<&String> = chosen.iter().map(|c| &sheet.return_codes[c - 1]).collect();
        if return_codes.iter().collect::<Vec<_>>() != expected_codes {
            fail("vote", format!("return codes of voter {} do not match", sheet.voter_index));
        }

        let finalization_code = client
            .confirm_vote(&sheet.confirmation_code)
            .unwrap_or_else(|e| fail("confirmation", e));
        if finalization_code != sheet.finalization_code {
            warn!("finalization code of voter {} does not match", sheet.voter_index);
            fail("confirmation", "finalization code does not match the code sheet");
        }

        info!("voter {} voted for {:?}", sheet.voter_index, chosen);
        for c in chosen {
            expected[c - 1] += 1;
        }
    }
    println!("> {} voters voted and confirmed", sheets.len());

    board.run_mixing().unwrap_or_else(|e| fail("mixing", e));
    board
        .run_decryption()
        .unwrap_or_else(|e| fail("decryption", e));
    let tally = board.run_tally().unwrap_or_else(|e| fail("tally", e));
    println!("> Election verified OK");

    println!("Tally:");
    for (candidate, num_votes) in tally.totals(&election_set).iter() {
        println!("  {} got {} votes", candidate, num_votes);
    }

    if tally.votes != expected {
        fail("tally", "tally does not match the votes cast");
    }
}
