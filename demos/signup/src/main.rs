//! # formwise Signup Demo
//!
//! Drives the signup form from the command line the way a UI would: each
//! provided value is typed into its field and the field is blurred, then the
//! form is submitted.
//!
//! ## Running
//!
//! ```bash
//! cargo run --package signup-demo -- --email ann@example.com --name Ann
//! cargo run --package signup-demo -- --email llama@gmail.com
//! ```
//!
//! On success the submitted values are printed as JSON. On failure the error
//! map is printed as JSON and the process exits with status 1.

mod form;

use std::path::PathBuf;
use std::process::ExitCode;

use formwise_core::logging::setup_logging;
use formwise_core::{settings_loader, FormwiseResult, Settings, SETTINGS};
use formwise_forms::{HostSubmitEvent, SubmitOutcome};

use form::SignupForm;

fn cli() -> clap::Command {
    clap::Command::new("signup")
        .about("Fill in and submit the signup form")
        .arg(
            clap::Arg::new("email")
                .long("email")
                .help("Main email address"),
        )
        .arg(
            clap::Arg::new("emailCc")
                .long("email-cc")
                .help("Address to copy, must differ from the main email"),
        )
        .arg(
            clap::Arg::new("website")
                .long("website")
                .help("Personal website URL"),
        )
        .arg(clap::Arg::new("name").long("name").help("Full name"))
        .arg(
            clap::Arg::new("config")
                .long("config")
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML or JSON settings file"),
        )
}

fn load_settings(config: Option<&PathBuf>) -> FormwiseResult<Settings> {
    match config {
        Some(path) => settings_loader::from_file_with_env(path),
        None => Ok(settings_loader::from_env()),
    }
}

/// Reports where the settings came from; call once logging is installed.
fn log_settings_source(config: Option<&PathBuf>) {
    match config {
        Some(path) => tracing::info!(path = %path.display(), "loaded settings"),
        None => tracing::info!("loaded settings from the environment"),
    }
}

fn run() -> FormwiseResult<ExitCode> {
    let matches = cli().get_matches();

    let config = matches.get_one::<PathBuf>("config");
    let settings = load_settings(config)?;
    setup_logging(&settings);
    log_settings_source(config);
    SETTINGS.configure(settings);

    let mut form = SignupForm::mount()?;
    tracing::debug!(form = %form.session.id(), "mounted signup form");
    for name in form::FIELDS {
        let value = matches.get_one::<String>(name).map(String::as_str);
        form.fill(name, value);
    }

    match form.controller.submit(&mut HostSubmitEvent::new())? {
        SubmitOutcome::Submitted => {
            let values = form.submitted.borrow_mut().take().unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&values)?);
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Rejected {
            first_invalid,
            errors,
        } => {
            tracing::warn!(field = %first_invalid, "signup rejected");
            eprintln!("{}", serde_json::to_string_pretty(&errors)?);
            eprintln!("focused: {first_invalid}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("signup: {e}");
            ExitCode::from(2)
        }
    }
}
