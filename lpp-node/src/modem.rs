use std::{
    io::{self, Read, Write},
    time::{Duration, Instant},
};

use cayenne_lpp::Transport;

#[derive(Debug)]
pub enum ModemError {
    Serial(serialport::Error),
    Io(io::Error),
    /// The modem answered the transmit command with an error line.
    Rejected(String),
    Timeout,
}

impl From<serialport::Error> for ModemError {
    fn from(e: serialport::Error) -> Self {
        ModemError::Serial(e)
    }
}

impl From<io::Error> for ModemError {
    fn from(e: io::Error) -> Self {
        ModemError::Io(e)
    }
}

impl ModemError {
    /// Whether the link has to be reopened before the next frame.
    pub fn is_link_error(&self) -> bool {
        matches!(self, ModemError::Serial(_) | ModemError::Io(_))
    }
}

pub fn hex(frame: &[u8]) -> String {
    frame.iter().map(|b| format!("{b:02X}")).collect()
}

/// A LoRa modem driven with `AT+TX=<hex>` line commands.
pub struct Modem<P> {
    port: P,
    response_timeout: Duration,
}

impl Modem<Box<dyn serialport::SerialPort>> {
    pub fn open(path: &str, baud: u32, response_timeout: Duration) -> Result<Self, ModemError> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(250))
            .open()?;
        Ok(Self::new(port, response_timeout))
    }
}

impl<P: Read + Write> Modem<P> {
    pub fn new(port: P, response_timeout: Duration) -> Self {
        Self {
            port,
            response_timeout,
        }
    }

    fn read_reply(&mut self) -> Result<String, ModemError> {
        let deadline = Instant::now() + self.response_timeout;
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        while Instant::now() < deadline {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) if byte[0] == b'\n' => {
                    let text = String::from_utf8_lossy(&line).trim().to_string();
                    line.clear();
                    if text.is_empty() {
                        continue;
                    }
                    log::debug!("[MDM] < {text}");
                    if text.starts_with("+SENT")
                        || text == "OK"
                        || text.starts_with("+FAIL")
                        || text.starts_with("ERROR")
                    {
                        return Ok(text);
                    }
                }
                Ok(_) => line.push(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ModemError::Timeout)
    }
}

impl<P: Read + Write> Transport for Modem<P> {
    type Error = ModemError;

    fn transmit(&mut self, frame: &[u8]) -> Result<usize, Self::Error> {
        let cmd = format!("AT+TX={}\r\n", hex(frame));
        log::debug!("[MDM] > {}", cmd.trim_end());
        self.port.write_all(cmd.as_bytes())?;
        self.port.flush()?;
        let reply = self.read_reply()?;
        if reply.starts_with("+FAIL") || reply.starts_with("ERROR") {
            return Err(ModemError::Rejected(reply));
        }
        Ok(frame.len())
    }
}

/// Logs frames instead of sending them.
#[derive(Debug, Default)]
pub struct DryRun;

impl Transport for DryRun {
    type Error = ModemError;

    fn transmit(&mut self, frame: &[u8]) -> Result<usize, Self::Error> {
        log::info!("[LPP] Dry run, frame ({} bytes): {}", frame.len(), hex(frame));
        Ok(frame.len())
    }
}

/// The link the uplink thread sends frames over.
pub enum Link {
    Modem(Modem<Box<dyn serialport::SerialPort>>),
    DryRun(DryRun),
}

impl Link {
    pub fn open(
        serial: Option<&str>,
        baud: u32,
        response_timeout: Duration,
    ) -> Result<Self, ModemError> {
        match serial {
            Some(path) => Ok(Link::Modem(Modem::open(path, baud, response_timeout)?)),
            None => Ok(Link::DryRun(DryRun)),
        }
    }
}

impl Transport for Link {
    type Error = ModemError;

    fn transmit(&mut self, frame: &[u8]) -> Result<usize, Self::Error> {
        match self {
            Link::Modem(modem) => modem.transmit(frame),
            Link::DryRun(dry) => dry.transmit(frame),
        }
    }
}
