// File: ./src/cli.rs
//! Command-line parsing and help output for the sync binary.
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Alternate directory holding `config/config.toml`.
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub help: bool,
    pub version: bool,
}

impl CliArgs {
    /// Parses everything after the program name.
    pub fn parse<I, T>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" | "help" => parsed.help = true,
                "-V" | "--version" => parsed.version = true,
                "-v" | "--verbose" => parsed.verbose = true,
                "-r" | "--root" => {
                    let path = args
                        .next()
                        .ok_or_else(|| format!("{} requires a path", arg))?;
                    parsed.root = Some(PathBuf::from(path));
                }
                other => {
                    if let Some(path) = other.strip_prefix("--root=") {
                        parsed.root = Some(PathBuf::from(path));
                    } else {
                        return Err(format!("Unknown argument: {}", other));
                    }
                }
            }
        }
        Ok(parsed)
    }

    /// Level in force before the config file has been read.
    pub fn startup_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// `--verbose` wins over the configured level.
    pub fn run_level(&self, configured: LevelFilter) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            configured
        }
    }
}

pub fn print_version(binary_name: &str) {
    println!("{} {}", binary_name, env!("CARGO_PKG_VERSION"));
}

pub fn print_help(binary_name: &str) {
    println!(
        "{} v{} - Copy Todoist projects and tasks into CalDAV task lists",
        binary_name,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>] [--verbose]", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Read config from <path>/config/config.toml.");
    println!("    -v, --verbose         Log debug output.");
    println!("    -V, --version         Print the version.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("ENVIRONMENT:");
    println!("    CALDAV_URL, CALDAV_USERNAME, CALDAV_PASSWORD");
    println!("    TODOIST_API_TOKEN, TODOIST_API_URL");
    println!("    These override the matching keys of the config file.");
    println!();
    println!("NOTES:");
    println!("    Each project becomes a calendar holding only VTODOs, named after its");
    println!("    parents (\"Work - Clients - Acme\"). Tasks are written, never diffed:");
    println!("    running again overwrites each task's <id>.ics with a fresh copy.");
}
