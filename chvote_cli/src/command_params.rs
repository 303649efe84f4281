use chvote::PublicParameters;

pub fn command_params(matches: &clap::ArgMatches) {
    let authorities: usize = match matches.value_of("authorities").unwrap_or("2").parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("chvote params: invalid number of authorities: {}", e);
            std::process::exit(1);
        }
    };

    let json = PublicParameters::testing(authorities).and_then(|params| params.to_json());
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("chvote params: {}", e);
            std::process::exit(1);
        }
    }
}
