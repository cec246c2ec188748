//! dvbtune: command line front end for Linux DVB adapters.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use log::info;

use dvbtune::config::{load_config, DEFAULT_CONFIG_FILE};
use dvbtune::{DvbConfig, DvbDevice, SystemBackend, TunerError};

mod commands;
mod context;

use context::{Cli, Commands};

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn base_config(path: Option<&PathBuf>) -> Result<DvbConfig, Box<dyn std::error::Error>> {
    // explicit path > ./dvbtune.toml > defaults
    let path = path.cloned().or_else(|| {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        default_path.exists().then_some(default_path)
    });
    let mut config = match path {
        Some(path) => {
            let config = load_config(&path)?;
            info!("Loaded config from: {}", path.display());
            config
        }
        None => DvbConfig::default(),
    };
    config.apply_env();
    Ok(config)
}

fn stop_flag() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        handler_stop.store(true, Ordering::Relaxed);
    })?;
    Ok(stop)
}

fn report(e: &TunerError) {
    if let Some(os) = e.os_error() {
        match os.kind() {
            ErrorKind::PermissionDenied => eprintln!(
                "{}",
                "Hint: the user needs read/write access to /dev/dvb (usually the 'video' group)."
                    .yellow()
            ),
            ErrorKind::NotFound => eprintln!(
                "{}",
                "Hint: check the adapter and device numbers under /dev/dvb.".yellow()
            ),
            _ => {}
        }
    }
}

fn reported(e: TunerError) -> TunerError {
    report(&e);
    e
}

fn open(config: &DvbConfig, tune: bool) -> Result<DvbDevice<SystemBackend>, TunerError> {
    DvbDevice::open(SystemBackend::default(), config, tune).map_err(reported)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = base_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info { device } => {
            commands::apply_device_args(&mut config, &device);
            let dev = open(&config, true)?;
            commands::print_info(&dev);
        }
        Commands::Checksignal { device, tuning } => {
            commands::apply_device_args(&mut config, &device);
            commands::apply_tuning_args(&mut config, &tuning);
            let stop = stop_flag()?;

            let dev = open(&config, true)?;
            commands::tune(&dev, &tuning).map_err(reported)?;
            commands::check_signal(&dev, &stop);
        }
        Commands::Tune {
            device,
            tuning,
            pids,
            time,
            output,
        } => {
            commands::apply_device_args(&mut config, &device);
            commands::apply_tuning_args(&mut config, &tuning);
            let stop = stop_flag()?;
            let duration = time
                .filter(|t| *t > 0.0)
                .and_then(|t| Duration::try_from_secs_f64(t).ok());

            let mut dev = open(&config, true)?;
            let system = commands::tune(&dev, &tuning).map_err(reported)?;
            for pid in pids {
                dev.add_pid(pid).map_err(reported)?;
            }

            let out = commands::open_output(&output)?;
            info!("Recording {:?} to {}", system, output);
            let total = commands::record(&dev, out, duration, stop)?;
            info!("Recorded {} bytes", total);
            dev.close();
        }
    }

    Ok(())
}
