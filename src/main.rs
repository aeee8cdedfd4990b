use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, Log, Record};

use threegx::output::OutputFile;
use threegx::{convert, settings, ConvertOptions};

#[derive(Parser)]
#[command(name = "threegx", version, about)]
struct Cli {
    /// Don't store the symbol table in the plugin.
    #[arg(short, long)]
    discard_symbols: bool,
    /// Only report errors.
    #[arg(short, long)]
    silent: bool,
    /// Log more details; repeat for even more.
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
    #[arg(value_name = "INPUT.ELF")]
    input: PathBuf,
    #[arg(value_name = "SETTINGS.PLGINFO")]
    settings: PathBuf,
    #[arg(value_name = "OUTPUT.3GX")]
    output: PathBuf,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger(cli: &Cli) {
    let level = match (cli.silent, cli.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let say = |message: &str| {
        if !cli.silent {
            println!("{message}");
        }
    };

    say("Reading settings...");
    let metadata = settings::load(&cli.settings).map_err(|err| err.to_string())?;

    say("Reading executable...");
    let image = std::fs::read(&cli.input)
        .map_err(|err| format!("couldn't open {}: {err}", cli.input.display()))?;

    say("Writing plugin...");
    let mut output = OutputFile::create(&cli.output)
        .map_err(|err| format!("couldn't create {}: {err}", cli.output.display()))?;
    let options = ConvertOptions {
        include_symbols: !cli.discard_symbols,
        ..ConvertOptions::default()
    };
    convert(&image, &mut output, &metadata, &options).map_err(|err| err.to_string())?;
    output
        .commit()
        .map_err(|err| format!("couldn't write {}: {err}", cli.output.display()))?;

    say("Done");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(&cli);

    if !cli.silent {
        println!(
            "{} v{} - ELF to 3GX plugin converter",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
