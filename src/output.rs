use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use serialport::SerialPort;
use tracing::warn;

/// Baud rate Hanover signs ship configured for
pub const DEFAULT_BAUD_RATE: u32 = 4800;

/// Destination for encoded frames
///
/// A write either sends every byte of the frame or reports failure.
pub trait ByteSink {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()>;
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).write_frame(frame)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).write_frame(frame)
    }
}

/// Frames are appended back to back
impl ByteSink for Vec<u8> {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.extend_from_slice(frame);
        Ok(())
    }
}

/// RS-485 adapter driving the sign bus
pub struct SerialSink {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialSink {
    /// Open a serial port 8N1 without flow control
    pub fn open(name: &str, baud_rate: u32) -> io::Result<Self> {
        let mut port = serialport::new(name, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(1000))
            .open()?;

        // Some USB adapters only power their transceiver with DTR set
        if let Err(e) = port.write_data_terminal_ready(true) {
            warn!(port = name, error = %e, "failed to set DTR");
        }

        // Allow device to initialize
        thread::sleep(Duration::from_millis(100));

        Ok(SerialSink {
            name: name.to_string(),
            port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ByteSink for SerialSink {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()
    }
}

/// Keeps every frame written, one entry per write
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    frames: Vec<Vec<u8>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Hand over the recorded frames, leaving the sink empty
    pub fn take_frames(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.frames)
    }
}

impl ByteSink for RecordingSink {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.frames.push(frame.to_vec());
        Ok(())
    }
}
