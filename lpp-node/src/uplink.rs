use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::RecvTimeoutError,
    },
    thread,
    time::{Duration, Instant},
};

use cayenne_lpp::{CayenneLpp, Error, MAX_FRAME_SIZE, Transport};

use crate::{
    Measurement,
    data_format::Snapshot,
    modem::{Link, ModemError},
    safe_mpsc,
};

#[derive(Debug, Clone)]
pub struct UplinkConfig {
    pub serial: Option<String>,
    pub baud: u32,
    pub size: usize,
    pub interval: Duration,
    pub reset_payload: bool,
    pub response_timeout: Duration,
}

/// What became of one uplink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Skipped,
    Sent(usize),
    Failed,
    /// The link has to be reopened.
    LinkLost,
}

/// Encode `snapshot` into `lpp` and send the frame over `link`.
///
/// A failed frame is dropped when `reset_payload` is set, so the next uplink starts over
/// with fresh readings.
fn send_snapshot<T, const N: usize>(
    lpp: &mut CayenneLpp<N>,
    snapshot: &Snapshot,
    link: &mut T,
    reset_payload: bool,
) -> Outcome
where
    T: Transport<Error = ModemError>,
{
    if snapshot.is_empty() {
        log::warn!("[LPP] No readings yet, skipping uplink");
        return Outcome::Skipped;
    }
    let added = snapshot.encode_into(lpp);
    log::info!(
        "[LPP] Encoded {added} readings, payload is {}/{} bytes",
        lpp.len(),
        lpp.max_size()
    );
    if lpp.is_empty() {
        return Outcome::Skipped;
    }
    let outcome = match lpp.send(link, reset_payload) {
        Ok(sent) => {
            log::info!("[LPP] Sent {sent} bytes");
            return Outcome::Sent(sent);
        }
        Err(Error::Transport(e)) => {
            log::error!("[LPP] Failed to send frame: {e:?}");
            if e.is_link_error() {
                Outcome::LinkLost
            } else {
                Outcome::Failed
            }
        }
        Err(e) => {
            log::error!("[LPP] Failed to send frame: {e:?}");
            Outcome::Failed
        }
    };
    if reset_payload {
        lpp.reset();
    }
    outcome
}

pub fn uplink_thread(
    cfg: UplinkConfig,
    running: Arc<AtomicBool>,
    source: safe_mpsc::SafeReceiver<Measurement>,
) {
    log::info!("[LPP] Uplink thread started");
    let mut lpp = match CayenneLpp::<MAX_FRAME_SIZE>::with_max_size(cfg.size) {
        Ok(lpp) => lpp,
        Err(e) => {
            log::error!("[LPP] Invalid payload size {}: {e:?}", cfg.size);
            running.store(false, Ordering::Relaxed);
            return;
        }
    };
    let mut snapshot = Snapshot::default();
    'root: while running.load(Ordering::Relaxed) {
        source.set_ready(false);
        let mut link = match Link::open(cfg.serial.as_deref(), cfg.baud, cfg.response_timeout) {
            Ok(link) => {
                log::info!("[LPP] Link opened successfully");
                link
            }
            Err(e) => {
                log::error!("[LPP] Failed to open link: {e:?}");
                thread::sleep(Duration::from_secs(1));
                continue 'root;
            }
        };
        source.set_ready(true); // samplers may feed us from here on
        let mut next_uplink = Instant::now() + cfg.interval;
        'readout: while running.load(Ordering::Relaxed) {
            let wait = next_uplink
                .saturating_duration_since(Instant::now())
                .min(Duration::from_secs(1));
            match source.recv_timeout(wait) {
                Ok(measurement) => snapshot.update(measurement),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("[LPP] Data sources disconnected");
                    break 'root;
                }
            }
            if Instant::now() < next_uplink {
                continue 'readout;
            }
            next_uplink = Instant::now() + cfg.interval;
            if send_snapshot(&mut lpp, &snapshot, &mut link, cfg.reset_payload)
                == Outcome::LinkLost
            {
                break 'readout;
            }
        }
        log::info!("[LPP] Closing link");
    }
    source.set_ready(false);
    running.store(false, Ordering::Relaxed);
    log::info!("[LPP] Uplink thread exiting");
}
