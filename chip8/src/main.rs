use std::process::ExitCode;

use clap::Parser;
use log::error;
use simple_logger::SimpleLogger;

mod config;
mod keymap;
mod run;

use config::Config;

fn main() -> ExitCode {
    let config = Config::parse();

    if let Err(e) = SimpleLogger::new().with_level(config.log_level).init() {
        eprintln!("unable to start logging: {}", e);
    }

    match run::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
