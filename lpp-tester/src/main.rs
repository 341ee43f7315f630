use std::process::ExitCode;

use cayenne_lpp::{CayenneLpp, Decoder, MAX_FRAME_SIZE, Reading};
use clap::{Parser, Subcommand};

/// Bench tool for Cayenne LPP frames
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a hex encoded frame (e.g., 6701 00EA 6801 6E)
    Decode {
        /// Frame bytes in hex, whitespace and 0x prefixes are ignored
        #[arg(required = true, num_args = 1..)]
        hex: Vec<String>,
    },
    /// Encode the demo frames and print them in hex
    Demo,
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    match args.command {
        Command::Decode { hex } => decode(&hex.join(" ")),
        Command::Demo => demo(),
    }
}

fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let digits = text
        .split_whitespace()
        .map(|word| {
            word.strip_prefix("0x")
                .or_else(|| word.strip_prefix("0X"))
                .unwrap_or(word)
        })
        .flat_map(str::chars)
        .collect::<Vec<_>>();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let byte = pair.iter().collect::<String>();
            u8::from_str_radix(&byte, 16).map_err(|e| format!("invalid hex byte {byte:?}: {e}"))
        })
        .collect()
}

fn describe(reading: &Reading) -> String {
    match reading {
        Reading::DigitalInput(v) => format!("digital input {v}"),
        Reading::DigitalOutput(v) => format!("digital output {v}"),
        Reading::AnalogInput(v) => format!("analog input {v:.2}"),
        Reading::AnalogOutput(v) => format!("analog output {v:.2}"),
        Reading::Luminosity(v) => format!("luminosity {v} lux"),
        Reading::Presence(v) => format!("presence {v}"),
        Reading::Temperature(v) => format!("temperature {v:.1} °C"),
        Reading::RelativeHumidity(v) => format!("relative humidity {v:.1} %"),
        Reading::Accelerometer { x, y, z } => {
            format!("accelerometer x={x:.3} y={y:.3} z={z:.3} G")
        }
        Reading::BarometricPressure(v) => format!("barometric pressure {v:.1} hPa"),
        Reading::Gyrometer { x, y, z } => format!("gyrometer x={x:.2} y={y:.2} z={z:.2} °/s"),
        Reading::Gps {
            latitude,
            longitude,
            altitude,
        } => format!("gps lat={latitude:.4} lon={longitude:.4} alt={altitude:.2} m"),
    }
}

fn hex(frame: &[u8]) -> String {
    frame.iter().map(|b| format!("{b:02X}")).collect()
}

fn decode(text: &str) -> ExitCode {
    let frame = match parse_hex(text) {
        Ok(frame) => frame,
        Err(e) => {
            log::error!("[LPP] Could not parse frame: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("[LPP] Decoding {} bytes", frame.len());
    for record in Decoder::new(&frame) {
        match record {
            Ok(record) => println!("channel {:3}: {}", record.channel, describe(&record.reading)),
            Err(e) => {
                log::error!("[LPP] Could not decode frame: {e:?}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

/// The demo frames, one per measurement family.
fn demo_frames() -> Result<Vec<Vec<u8>>, cayenne_lpp::Error> {
    let mut lpp = CayenneLpp::<MAX_FRAME_SIZE>::with_max_size(100)?;
    let mut frames = Vec::new();

    lpp.add_analog_input(102.34, None)?;
    lpp.add_analog_input(-89.34, Some(114))?;
    frames.push(lpp.serialize().to_vec());
    lpp.reset();

    lpp.add_temperature(-11.0, None)?;
    lpp.add_temperature(54.3, Some(118))?;
    frames.push(lpp.serialize().to_vec());
    lpp.reset();

    lpp.add_relative_humidity(100.0, None)?;
    lpp.add_relative_humidity(0.0, Some(119))?;
    frames.push(lpp.serialize().to_vec());
    lpp.reset();

    lpp.add_gps(50.5434, 4.4069, 100.98, None)?;
    frames.push(lpp.serialize().to_vec());
    Ok(frames)
}

fn demo() -> ExitCode {
    match demo_frames() {
        Ok(frames) => {
            for frame in frames {
                println!("{}", hex(&frame));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("[LPP] Could not encode demo frames: {e:?}");
            ExitCode::FAILURE
        }
    }
}
