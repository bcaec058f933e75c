use std::io::BufRead;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pandesk::actor::{self, dispatch, sampler};
use pandesk::common::config::{Config, config_file};
use pandesk::common::log;
use pandesk::engine::DesktopEngine;
use pandesk::sys::simulated::SimulatedDesktops;

#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the configuration file without starting anything.
    Validate,
    /// Drive the engine interactively against an in-memory desktop set.
    Simulate {
        /// Number of simulated desktops.
        #[arg(long, default_value_t = 4)]
        desktops: usize,
    },
}

fn main() {
    log::init_logging();
    let opt = Cli::parse();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let config = if config_path.exists() {
        match Config::read(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e:#}");
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    match opt.command {
        Commands::Validate => {
            let issues = config.validate();
            if issues.is_empty() {
                println!("Config validation passed");
            } else {
                for issue in issues {
                    eprintln!("{issue}");
                }
                process::exit(1);
            }
        }
        Commands::Simulate { desktops } => simulate(config, desktops),
    }
}

fn simulate(config: Config, desktops: usize) {
    let backend = Arc::new(SimulatedDesktops::with_desktops(desktops));
    // A couple of windows so shove and drag have something to grab.
    backend.open_window(4242, "notes - vault - Obsidian");
    backend.open_window(1337, "main.rs - pandesk - Visual Studio Code");

    let engine = match DesktopEngine::new(backend.clone(), &config.settings) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let (dispatch_tx, dispatch_rx) = actor::channel();
    let (sampler_tx, sampler_rx) = actor::channel();

    let stdin_dispatch_tx = dispatch_tx.clone();
    let stdin_sampler_tx = sampler_tx.clone();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "quit" || line == "exit" {
                break;
            }
            match line.parse::<dispatch::Command>() {
                Ok(command) => {
                    let _ = stdin_dispatch_tx.send(dispatch::Event::Command(command));
                }
                Err(e) => println!("error: {e}"),
            }
        }
        let _ = stdin_dispatch_tx.send(dispatch::Event::Shutdown);
        let _ = stdin_sampler_tx.send(sampler::Event::Shutdown);
    });

    let ctrlc_dispatch_tx = dispatch_tx.clone();
    let ctrlc_sampler_tx = sampler_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_dispatch_tx.send(dispatch::Event::Shutdown);
        let _ = ctrlc_sampler_tx.send(sampler::Event::Shutdown);
    })
    .expect("Error setting Ctrl+C handler");

    println!(
        "pandesk simulate: {desktops} desktops, currently on 1.
        commands: pan/shove/drag left|right|<slot>, undo, redo, history, quit"
    );

    let interval = Duration::from_millis(config.settings.poll_interval_ms);
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("failed to build runtime");
    rt.block_on(async {
        tokio::join!(
            dispatch::Dispatch::new(engine.clone(), dispatch_rx).run(),
            sampler::Sampler::new(engine.clone(), interval, sampler_rx).run(),
        );
    });
}
