use clap::{App, Arg, SubCommand};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

mod command_params;
mod command_simulate;
mod config;

use command_params::command_params;
use command_simulate::command_simulate;
use config::Config;

fn main() {
    let matches = App::new("CHVote CLI")
        .version("1.0")
        .about("Runs the CHVote protocol against an in-memory bulletin board")
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(
            SubCommand::with_name("params")
                .about("Print the built-in testing parameters as JSON")
                .arg(
                    Arg::with_name("authorities")
                        .long("authorities")
                        .takes_value(true)
                        .default_value("2")
                        .help("Number of authorities"),
                ),
        )
        .subcommand(
            SubCommand::with_name("simulate")
                .about("Simulate a complete election")
                .arg(
                    Arg::with_name("authorities")
                        .long("authorities")
                        .takes_value(true)
                        .help("Number of authorities, defaults to 2 or to the parameter file's value"),
                )
                .arg(
                    Arg::with_name("voters")
                        .long("voters")
                        .takes_value(true)
                        .default_value("5")
                        .help("Number of voters"),
                )
                .arg(
                    Arg::with_name("candidates")
                        .long("candidates")
                        .takes_value(true)
                        .default_value("3")
                        .help("Comma separated number of candidates per election"),
                )
                .arg(
                    Arg::with_name("selections")
                        .long("selections")
                        .takes_value(true)
                        .default_value("1")
                        .help("Comma separated number of selections per election"),
                )
                .arg(
                    Arg::with_name("params")
                        .long("params")
                        .takes_value(true)
                        .help("Public parameters JSON file - can also be set with CHVOTE_PARAMS"),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .takes_value(true)
                        .help("32 byte hex seed for a reproducible run"),
                ),
        )
        .get_matches();

    let config = Config::from_env();

    let level = match matches.occurrences_of("v") {
        0 => config.log_level,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    init_logging(level);

    // Subcommands
    if let Some(matches) = matches.subcommand_matches("params") {
        command_params(matches);
        return;
    }
    if let Some(matches) = matches.subcommand_matches("simulate") {
        command_simulate(matches, &config);
        return;
    }

    eprintln!("chvote: a subcommand is required, see --help");
    std::process::exit(1);
}

fn init_logging(level: LevelFilter) {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();

    let config = log4rs::config::Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level));

    let result = match config {
        Ok(config) => log4rs::init_config(config).map(|_| ()).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    if let Err(e) = result {
        eprintln!("chvote: unable to initialise logging: {}", e);
    }
}

/// Expand `~` and environment variables in a path
pub fn expand(input: &str) -> String {
    match shellexpand::full(input) {
        Ok(expanded) => expanded.into_owned(),
        Err(e) => {
            eprintln!("chvote: unable to expand {}: {}", input, e);
            std::process::exit(1);
        }
    }
}
