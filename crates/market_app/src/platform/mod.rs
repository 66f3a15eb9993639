//! Process wiring: logging, configuration, persistence, and the session loop.
mod app;
mod config;
mod effects;
mod logging;
mod persistence;
mod profiles;
mod render;

use engine_logging::engine_info;
use log::LevelFilter;

use crate::cli::{Cli, Command};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let destination = if cli.log_file {
        logging::LogDestination::Both
    } else {
        logging::LogDestination::Terminal
    };
    logging::initialize(destination, level);

    let data_dir = config::data_dir(cli.data_dir.as_deref());
    engine_info!("Profiles live in {:?}", data_dir);

    match cli.command {
        Command::Search(args) => {
            let mut settings = config::load_settings(cli.config.as_deref())?;
            config::apply_overrides(&mut settings, &args);
            let view = app::run_search(&args, settings, &data_dir)?;
            let output = if args.json {
                render::render_json(&view)?
            } else {
                let fetched = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
                render::render_table(&view, args.limit, &fetched)
            };
            println!("{output}");
        }
        Command::Profiles(command) => {
            let output = profiles::run(command, &data_dir)?;
            if !output.is_empty() {
                println!("{output}");
            }
        }
    }
    Ok(())
}
