use cayenne_lpp::{CayenneLpp, Error, Reading};

#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    /// Component temperatures in °C, keyed by LPP channel.
    Temperature(Vec<(u8, f32)>),
    /// One minute load average.
    Load(f32),
}

/// Latest value of every measurement, encoded into one frame per uplink.
#[derive(Debug, Default)]
pub struct Snapshot {
    temperatures: Vec<(u8, f32)>,
    load: Option<f32>,
}

impl Snapshot {
    pub fn update(&mut self, measurement: Measurement) {
        match measurement {
            Measurement::Temperature(data) => self.temperatures = data,
            Measurement::Load(load) => self.load = Some(load),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty() && self.load.is_none()
    }

    fn readings(&self) -> impl Iterator<Item = (Reading, Option<u8>)> + '_ {
        self.temperatures
            .iter()
            .map(|(chan, temp)| (Reading::Temperature(*temp), Some(*chan)))
            .chain(self.load.map(|load| (Reading::AnalogInput(load), None)))
    }

    /// Append the snapshot to `lpp`, returning the number of records added.
    ///
    /// Readings that cannot be represented are skipped; once the payload is full the rest
    /// of the snapshot is dropped.
    pub fn encode_into<const N: usize>(&self, lpp: &mut CayenneLpp<N>) -> usize {
        let mut added = 0;
        for (reading, channel) in self.readings() {
            match lpp.add(reading, channel) {
                Ok(_) => added += 1,
                Err(Error::CapacityExceeded) => {
                    log::warn!(
                        "[LPP] Payload full at {} bytes, dropping {reading:?} and the rest of the snapshot",
                        lpp.len()
                    );
                    break;
                }
                Err(e) => log::warn!("[LPP] Skipping {reading:?}: {e:?}"),
            }
        }
        added
    }
}
