use anyhow::Result;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::env;
use todoist_caldav::cli::{self, CliArgs};
use todoist_caldav::client::DavClient;
use todoist_caldav::config::Config;
use todoist_caldav::context::StandardContext;
use todoist_caldav::source::{SourceCache, TodoistApi};
use todoist_caldav::sync;

const BINARY_NAME: &str = "todoist-caldav";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = match CliArgs::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Try '{} --help'.", BINARY_NAME);
            std::process::exit(2);
        }
    };

    if args.help {
        cli::print_help(BINARY_NAME);
        return Ok(());
    }
    if args.version {
        cli::print_version(BINARY_NAME);
        return Ok(());
    }

    // The logger accepts everything; the global max level does the filtering so it can
    // be tightened once the config is known.
    let log_config = ConfigBuilder::new()
        .add_filter_allow_str("todoist_caldav")
        .build();
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        log_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Logger init failed: {}", e);
    }
    log::set_max_level(args.startup_level());

    let ctx = StandardContext::new(args.root.clone());
    let config = Config::resolve(&ctx)?;
    log::set_max_level(args.run_level(config.level_filter()));

    let source = TodoistApi::new(
        &config.todoist_url,
        &config.todoist_token,
        config.allow_insecure_certs,
    )?;
    let store = DavClient::new(
        &config.url,
        &config.username,
        &config.password,
        config.allow_insecure_certs,
    )?;

    let mut cache = SourceCache::new(source);
    match sync::run(&mut cache, &store).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_precondition() => {
            log::error!("{}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
