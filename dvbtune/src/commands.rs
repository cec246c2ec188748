use std::fs::File;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use dvbtune::tuner::{AtscParams, CableParams, DvbBackend, SatelliteParams, TerrestrialParams};
use dvbtune::{Delsys, DvbConfig, DvbDevice, ReadOutcome, SecParams, TunerError};

use crate::context::{DeviceArgs, TuningArgs};

/// Transport stream packets per read.
const READ_BUFFER_SIZE: usize = 188 * 1024;

pub(crate) fn apply_device_args(config: &mut DvbConfig, args: &DeviceArgs) {
    if let Some(adapter) = args.adapter {
        config.adapter = adapter;
    }
    if let Some(device) = args.device {
        config.device = device;
    }
    config.budget |= args.budget;
    config.shared_filter |= args.shared_filter;
}

pub(crate) fn apply_tuning_args(config: &mut DvbConfig, args: &TuningArgs) {
    config.high_voltage |= args.high_voltage;
    if let Some(tone) = args.tone {
        config.tone = tone;
    }
    if let Some(satno) = args.satno {
        config.satno = satno;
    }
}

/// Submits the delivery system parameters, then starts tuning.
pub(crate) fn tune<B: DvbBackend>(
    dev: &DvbDevice<B>,
    args: &TuningArgs,
) -> Result<Delsys, TunerError> {
    let system = match args.system {
        Some(system) => system,
        None => dev.guess_system()?,
    };
    info!("tuning {:?} at {} kHz", system, args.frequency);

    match system {
        Delsys::Dvbc => dev.set_dvbc(&CableParams {
            frequency: args.frequency,
            modulation: args.modulation.clone(),
            symbol_rate: args.srate,
            fec: args.fec.clone(),
        })?,
        Delsys::Dvbt => dev.set_dvbt(&TerrestrialParams {
            frequency: args.frequency,
            modulation: args.modulation.clone(),
            fec_hp: args.fec.clone(),
            fec_lp: args.fec_lp.clone(),
            bandwidth: args.bandwidth,
            transmission_mode: args.transmission,
            guard: args.guard.clone(),
            hierarchy: args.hierarchy,
        })?,
        Delsys::Atsc | Delsys::Cqam => {
            let params = AtscParams {
                frequency: args.frequency,
                modulation: args.modulation.clone(),
            };
            if system == Delsys::Atsc {
                dev.set_atsc(&params)?
            } else {
                dev.set_cqam(&params)?
            }
        }
        Delsys::Dvbs | Delsys::Dvbs2 => {
            let params = SatelliteParams {
                frequency: args.frequency,
                modulation: args.modulation.clone(),
                symbol_rate: args.srate,
                fec: args.fec.clone(),
                pilot: args.pilot,
                rolloff: args.rolloff,
            };
            if system == Delsys::Dvbs {
                dev.set_dvbs(&params)?;
            } else {
                dev.set_dvbs2(&params)?;
            }
            dev.set_sec(&SecParams {
                frequency: args.frequency,
                polarization: args.polarization,
                lnb_low: args.lnb_low,
                lnb_high: args.lnb_high,
                lnb_switch: args.lnb_switch,
            })?;
        }
    }

    if let Some(inversion) = args.inversion {
        dev.set_inversion(inversion)?;
    }
    dev.tune()?;
    Ok(system)
}

pub(crate) fn print_info<B: DvbBackend>(dev: &DvbDevice<B>) {
    let Some(info) = dev.frontend_info() else {
        return;
    };
    println!("{}", info.name.bold());
    println!("  adapter:     {} device {}", dev.adapter(), dev.device());
    println!("  type:        {:?}", info.frontend_type());
    println!(
        "  frequency:   {} - {} (step {})",
        info.frequency_min, info.frequency_max, info.frequency_stepsize
    );
    println!(
        "  symbol rate: {} - {}",
        info.symbol_rate_min, info.symbol_rate_max
    );
    println!(
        "  caps:        0x{:08X}{}",
        info.caps,
        if info.supports_2g() { " (2G)" } else { "" }
    );
    match dev.guess_system() {
        Ok(system) => println!("  system:      {:?}", system),
        Err(e) => println!("  system:      {}", e.to_string().red()),
    }
    println!(
        "  CA:          {}",
        if dev.has_ca() { "available" } else { "not available" }
    );
}

pub(crate) fn check_signal<B: DvbBackend>(dev: &DvbDevice<B>, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        let status = dev.status().unwrap_or_default();
        let line = format!(
            "signal {:5.1}%  snr {:5.1}%  ber {:>8}  unc {:>8}  {}",
            dev.signal_strength() * 100.0,
            dev.snr() * 100.0,
            dev.ber(),
            dev.uncorrected_blocks(),
            status
        );
        if status.has_lock() {
            eprintln!("{}", line.green());
        } else {
            eprintln!("{}", line.red());
        }
        thread::sleep(Duration::from_secs(1));
    }
}

pub(crate) fn open_output(output: &str) -> io::Result<Box<dyn Write>> {
    if output == "-" {
        Ok(Box::new(io::stdout().lock()))
    } else {
        Ok(Box::new(File::create(output)?))
    }
}

pub(crate) fn record<B: DvbBackend>(
    dev: &DvbDevice<B>,
    mut out: Box<dyn Write>,
    duration: Option<Duration>,
    stop: Arc<AtomicBool>,
) -> io::Result<u64> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bytes} ({binary_bytes_per_sec})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let started = Instant::now();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut total = 0u64;

    while !stop.load(Ordering::Relaxed) {
        if duration.is_some_and(|d| started.elapsed() >= d) {
            break;
        }
        match dev.read(&mut buf) {
            ReadOutcome::Data(n) => {
                out.write_all(&buf[..n])?;
                total += n as u64;
                progress.inc(n as u64);
            }
            ReadOutcome::Retry => progress.tick(),
            ReadOutcome::EndOfStream => {
                warn!("transport stream ended");
                break;
            }
        }
    }

    out.flush()?;
    progress.finish();
    Ok(total)
}
