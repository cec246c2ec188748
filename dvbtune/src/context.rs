use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_num::maybe_hex;

use dvbtune::Delsys;

#[derive(Debug, Parser)]
#[clap(name = "dvbtune")]
#[clap(about = "dvbtune tunes Linux DVB adapters and records the transport stream. ", long_about = None)]
#[clap(author = "maleicacid")]
#[clap(version)]
pub(crate) struct Cli {
    /// Configuration file.{n}
    /// The `[dvb]` section of this TOML file provides the defaults
    /// for the adapter options.{n}
    /// If not specified, `dvbtune.toml` in the current directory is
    /// used when it exists.
    #[clap(short = 'f', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Show the frontend of an adapter.{n}
    /// This subcommand opens the frontend and prints its name,
    /// type, limits and the delivery system guessed from it.
    Info {
        #[clap(flatten)]
        device: DeviceArgs,
    },
    /// Signal test.{n}
    /// This subcommand tunes the frontend and prints the signal
    /// strength, the signal to noise ratio and the lock status
    /// every second until interrupted.
    #[clap(name = "checksignal")]
    Checksignal {
        #[clap(flatten)]
        device: DeviceArgs,

        #[clap(flatten)]
        tuning: TuningArgs,
    },
    /// Tune and record.{n}
    /// This subcommand tunes the frontend, filters the requested
    /// PIDs and writes the transport stream to the output.
    Tune {
        #[clap(flatten)]
        device: DeviceArgs,

        #[clap(flatten)]
        tuning: TuningArgs,

        /// PIDs to filter, decimal or hexadecimal (`0x`).{n}
        /// May be repeated. Ignored in budget mode.
        #[clap(short, long = "pid", value_parser = maybe_hex::<u16>)]
        pids: Vec<u16>,

        /// The duration of the recording in seconds.{n}
        /// If the duration is not specified, 0.0 or negative,
        /// the recording will continue until the user stops it.
        #[clap(short, long, value_name = "seconds", allow_negative_numbers = true)]
        time: Option<f64>,

        /// The location of the output.{n}
        /// If '-' is specified, the recording will be redirected to
        /// stdout.
        #[clap(required = true)]
        output: String,
    },
}

/// Adapter selection. Unset options fall back to the configuration file
/// and the `DVBTUNE_*` environment variables.
#[derive(Debug, Args)]
pub(crate) struct DeviceArgs {
    /// Adapter number (`/dev/dvb/adapter<N>`).
    #[clap(short, long)]
    pub adapter: Option<u8>,

    /// Device number inside the adapter (`frontend<N>`, `demux<N>`...).
    #[clap(short, long)]
    pub device: Option<u8>,

    /// Capture the whole transport stream with a single filter.
    #[clap(long)]
    pub budget: bool,

    /// Add PIDs to one shared demultiplexer filter instead of
    /// opening one descriptor per PID.
    #[clap(long)]
    pub shared_filter: bool,
}

#[derive(Debug, Args)]
pub(crate) struct TuningArgs {
    /// Delivery system.{n}
    /// If none, the system is guessed from the frontend type.
    #[clap(value_enum, short = 's', long)]
    pub system: Option<Delsys>,

    /// Frequency in kHz.
    #[clap(long, required = true)]
    pub frequency: u32,

    /// Modulation (QPSK, 8PSK, 16QAM, 64QAM, 256QAM, 8VSB, QAM, ...).
    #[clap(short, long)]
    pub modulation: Option<String>,

    /// Symbol rate in symbols per second.
    #[clap(long, default_value_t = 0)]
    pub srate: u32,

    /// Inner (or high priority) FEC code rate, e.g. `3/4`.
    #[clap(long)]
    pub fec: Option<String>,

    /// Low priority FEC code rate (DVB-T).
    #[clap(long)]
    pub fec_lp: Option<String>,

    /// Bandwidth in MHz (DVB-T).
    #[clap(long, default_value_t = 8)]
    pub bandwidth: u32,

    /// Transmission mode 2, 4 or 8 (k), -1 for automatic (DVB-T).
    #[clap(long, default_value_t = -1, allow_negative_numbers = true)]
    pub transmission: i32,

    /// Guard interval, e.g. `1/8` (DVB-T).
    #[clap(long)]
    pub guard: Option<String>,

    /// Hierarchy 0, 1, 2 or 4, -1 for automatic (DVB-T).
    #[clap(long, default_value_t = -1, allow_negative_numbers = true)]
    pub hierarchy: i32,

    /// Pilot: 0 off, 1 on, -1 automatic (DVB-S2).
    #[clap(long, default_value_t = -1, allow_negative_numbers = true)]
    pub pilot: i32,

    /// Roll-off factor in percent: 20, 25 or 35 (DVB-S2).
    #[clap(long, default_value_t = 35)]
    pub rolloff: i32,

    /// Spectral inversion: 0 off, 1 on, -1 automatic.{n}
    /// If none, the inversion is left to the driver.
    #[clap(long, allow_negative_numbers = true)]
    pub inversion: Option<i32>,

    /// Polarization: H, V, L or R (satellite).
    #[clap(long)]
    pub polarization: Option<char>,

    /// LNB low oscillator in kHz.{n}
    /// If 0, the oscillators are chosen from the frequency band.
    #[clap(long, default_value_t = 0)]
    pub lnb_low: u32,

    /// LNB high oscillator in kHz.
    #[clap(long, default_value_t = 0)]
    pub lnb_high: u32,

    /// LNB switch frequency in kHz.
    #[clap(long, default_value_t = 11_700_000)]
    pub lnb_switch: u32,

    /// Enable high LNB voltage.
    #[clap(long)]
    pub high_voltage: bool,

    /// 22 kHz tone: 0 off, 1 on, -1 automatic.
    #[clap(long, allow_negative_numbers = true)]
    pub tone: Option<i32>,

    /// DiSEqC satellite number (1-4), 0 for none.
    #[clap(long)]
    pub satno: Option<u32>,
}
