mod cli;
mod composer;
mod delivery;
mod logging;
mod settings;


use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use lettre::transport::smtp::client::CertificateStore;
use log::error;

use crate::cli::Args;
use crate::composer::clock::SystemClock;
use crate::composer::input::Input;
use crate::delivery::session::SmtpConnector;
use crate::delivery::Server;
use crate::settings::Settings;

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = logging::init(args.debug) {
        eprintln!("Cannot initialise logging: {}", err);
    }

    // Every failure is reported once, here, and ends the run with status 1
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let settings = match &args.config {
        Some(path) => settings::load_settings(path)?,
        None => Settings::default(),
    };
    let mut options = args.into_options(settings).unwrap_or_else(|err| err.exit());

    if options.ask_password && options.password.is_empty() {
        options.password = rpassword::prompt_password(format!(
            "Password for {}@{}: ",
            options.username, options.host
        ))?;
    }

    let message = composer::build(&options.draft, &SystemClock, &mut Input::stdin())?;

    let server = Server {
        host: options.host,
        port: options.port,
        credentials: delivery::credentials(&options.username, &options.password),
        tls: options.tls,
    };
    let connector = SmtpConnector::new(CertificateStore::Default);
    let delivery = delivery::send(&connector, &server, &message)?;

    if options.verbose {
        println!(
            "Email successfully sent to: {}",
            delivery.recipients.iter().join(", ")
        );
    }
    Ok(())
}
