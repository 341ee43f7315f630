use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    Measurement,
    safe_mpsc::{self, SafeSendError},
};

/// Pair each of the first `max_temps` components with channel index + 1, skipping
/// those without a reading so a sensor keeps its channel from tick to tick.
fn channel_temperatures(
    temps: impl IntoIterator<Item = Option<f32>>,
    max_temps: usize,
) -> Vec<(u8, f32)> {
    temps
        .into_iter()
        .enumerate()
        .take(max_temps)
        .filter_map(|(idx, temp)| temp.map(|t| ((idx + 1) as u8, t)))
        .collect()
}

pub fn sampler_thread(
    running: Arc<AtomicBool>,
    period: Duration,
    max_temps: usize,
    sink: safe_mpsc::SafeSender<Measurement>,
) {
    log::info!("[SYS] Sampler thread started");
    'sample: while running.load(Ordering::Relaxed) {
        let start = Instant::now();
        let components = sysinfo::Components::new_with_refreshed_list();
        let meas = channel_temperatures(
            components.iter().map(|component| component.temperature()),
            max_temps,
        );
        let load = sysinfo::System::load_average().one as f32;
        let mut batch = vec![Measurement::Load(load)];
        if meas.is_empty() {
            log::warn!("[SYS] No temperature data available");
        } else {
            batch.push(Measurement::Temperature(meas));
        }
        for measurement in batch {
            match sink.send(measurement) {
                Ok(()) => {}
                Err(SafeSendError::NotReady(_)) => {
                    log::debug!("[SYS] Uplink not ready, dropping sample");
                }
                Err(SafeSendError::SendError(e)) => {
                    log::error!("[SYS] Failed to send measurement: {e:?}");
                    break 'sample; // the uplink is gone
                }
            }
        }
        let elapsed = start.elapsed();
        if elapsed < period {
            thread::sleep(period - elapsed);
        }
    }
    log::info!("[SYS] Sampler thread exiting");
}
