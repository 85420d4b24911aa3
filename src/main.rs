use std::process::ExitCode;

use clap::Parser;

use composefe::cli::{self, CliArgs};
use composefe::logger;
use composefe::settings::EditorSettings;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Settings decide the log level, so load them before the logger exists
    // and report any problem once it does.
    let (settings, settings_err) = match args.settings.as_deref() {
        Some(path) => match EditorSettings::load(path) {
            Ok(s) => (s, None),
            Err(e) => (EditorSettings::default(), Some(e)),
        },
        None => (EditorSettings::load_or_default(None), None),
    };

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        logger::parse_level(&settings.log_level)
    };
    logger::init(level);

    if let Some(e) = settings_err {
        tracing::warn!(error = %e, "using default settings");
        eprintln!("warning: {}", e);
    }

    cli::run(args, settings)
}
