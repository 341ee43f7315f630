use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use clap::Parser;

// Local imports
mod data_format;
mod modem;
mod safe_mpsc;
mod sys_sensors;
mod uplink;

pub use data_format::Measurement;
use sys_sensors::sampler_thread;
use uplink::{UplinkConfig, uplink_thread};

/// Telemetry node: samples host sensors and sends them as Cayenne LPP frames over a LoRa modem
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Serial port of the LoRa modem (e.g., /dev/ttyUSB0). Frames are only logged if omitted
    #[arg(long)]
    serial: Option<String>,
    /// Baud rate of the modem serial port
    #[arg(long, default_value_t = 115200)]
    baud: u32,
    /// Maximum payload size in bytes
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u16).range(1..=222))]
    size: u16,
    /// Seconds between uplinks
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,
    /// Seconds between sensor samples
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    sample: u64,
    /// Keep the payload after a send instead of starting a new one
    #[arg(long, default_value_t = false)]
    keep_payload: bool,
    /// Maximum number of temperature channels to report
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(1..=254))]
    max_temps: u8,
    /// Seconds to wait for the modem to acknowledge a frame
    #[arg(long, default_value_t = 5)]
    modem_timeout: u64,
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    log::info!("Arguments: {args:#?}");
    // Synchronizer
    let running = Arc::new(AtomicBool::new(true));
    // Handle Ctrl+C to stop the node gracefully
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            log::info!("Received Ctrl+C, stopping the node...");
            running.store(false, Ordering::Relaxed);
        })
        .expect("Error setting Ctrl-C handler");
    }
    // Channel
    let (data_tx, data_rx) = safe_mpsc::channel();
    let sampler_hdl = {
        let running = running.clone();
        let period = Duration::from_secs(args.sample);
        let max_temps = args.max_temps as usize;
        thread::spawn(move || sampler_thread(running, period, max_temps, data_tx))
    };
    let uplink_hdl = {
        let running = running.clone();
        let cfg = UplinkConfig {
            serial: args.serial,
            baud: args.baud,
            size: args.size as usize,
            interval: Duration::from_secs(args.interval),
            reset_payload: !args.keep_payload,
            response_timeout: Duration::from_secs(args.modem_timeout),
        };
        thread::spawn(move || uplink_thread(cfg, running, data_rx))
    };
    while running.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_secs(1));
    }
    if sampler_hdl.join().is_err() {
        log::error!("[SYS] Sampler thread panicked");
    }
    if uplink_hdl.join().is_err() {
        log::error!("[LPP] Uplink thread panicked");
    }
}
