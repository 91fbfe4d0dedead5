use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hermes_config::{Config, OverridableConfig};
use hermes_profiling::{
    CombinedProfileEvent, hermes, merge_android, merge_native, normalize, parse_android,
    parse_apple,
};

/// Converts a Hermes profile dump into the sample format.
///
/// This command takes the JSON dump of the Hermes sampling profiler on stdin and writes the
/// normalized profile to stdout. Optionally, the profile of the native platform sampler is merged
/// into the output.
#[derive(Debug, Parser)]
#[command(verbatim_doc_comment)]
struct Cli {
    /// Path to a Hermes profile dump (defaults to stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path to the folder containing the config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The platform the profile was recorded on, `ios` or `android`.
    #[arg(short, long)]
    platform: Option<String>,

    /// Path to a profile recorded by the Apple sampler.
    #[arg(long, conflicts_with = "android")]
    native: Option<PathBuf>,

    /// Path to a trace recorded by the Android sampler.
    #[arg(long)]
    android: Option<PathBuf>,

    /// Duration of the Android trace in nanoseconds.
    #[arg(long, default_value_t = 0, requires = "android")]
    duration_ns: u64,

    /// Pretty print the output JSON.
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::from_path(path).context("failed to load config")?,
            None => Config::default(),
        };

        config
            .apply_override(OverridableConfig {
                platform: self.platform.clone(),
                ..Default::default()
            })
            .context("invalid platform")?;

        Ok(config)
    }

    fn load_dump(&self) -> Result<hermes::Profile> {
        let payload = match self.input {
            Some(ref path) => fs::read(path).context("failed to read profile")?,
            None => {
                let mut payload = Vec::new();
                io::stdin()
                    .read_to_end(&mut payload)
                    .context("failed to read profile")?;
                payload
            }
        };

        hermes::parse(&payload).context("failed to parse profile")
    }

    fn write<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let mut stdout = io::stdout().lock();

        if self.pretty {
            serde_json::to_writer_pretty(&mut stdout, value)?;
        } else {
            serde_json::to_writer(&mut stdout, value)?;
        }

        writeln!(stdout)?;
        Ok(())
    }

    pub fn run(self) -> Result<()> {
        let config = self.load_config()?;
        hermes_log::init(config.logging());

        let platform = config.platform();
        let dump = self.load_dump()?;
        let profile = normalize(&dump, platform).context("failed to normalize profile")?;
        let js = CombinedProfileEvent::from_js(profile);

        if let Some(ref path) = self.android {
            let payload = fs::read(path).context("failed to read android trace")?;
            let android = parse_android(&payload).context("failed to parse android trace")?;
            return self.write(&merge_android(js, android, self.duration_ns));
        }

        if let Some(ref path) = self.native {
            let payload = fs::read(path).context("failed to read native profile")?;
            let native = parse_apple(&payload).context("failed to parse native profile")?;
            return self.write(&merge_native(js, native));
        }

        self.write(&js)
    }
}

#[allow(clippy::print_stderr)]
fn print_error(error: &anyhow::Error) {
    eprintln!("Error: {error}");

    let mut cause = error.source();
    while let Some(e) = cause {
        eprintln!("  caused by: {e}");
        cause = e.source();
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.run() {
        Ok(()) => (),
        Err(error) => {
            print_error(&error);
            std::process::exit(1);
        }
    }
}
