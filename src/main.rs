use std::env;

use raidcomp::cli;
use raidcomp::telemetry;

fn main() {
    let args: Vec<String> = env::args().collect();

    let config = match cli::load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = telemetry::init(&config.log_level) {
        eprintln!("{err}");
    }

    std::process::exit(cli::run_with_config(&args, &config));
}
