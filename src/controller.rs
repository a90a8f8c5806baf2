use tracing::{debug, trace};

use crate::bitmap::Bitmap;
use crate::error::Result;
use crate::output::ByteSink;
use crate::protocol::{to_payload, Command, BROADCAST_ADDRESS};
use crate::sign::{Sign, SignRegistry};

/// Drives one or more Hanover signs sharing a single bus
///
/// Every operation writes at most one frame per addressed sign and never
/// retries. Validation failures happen before anything reaches the sink.
/// Calls take `&mut self`, so frames from one controller never interleave.
pub struct HanoverController<S: ByteSink> {
    sink: S,
    signs: SignRegistry,
}

impl<S: ByteSink> HanoverController<S> {
    /// Create a controller with no signs registered
    pub fn new(sink: S) -> Self {
        Self::with_registry(sink, SignRegistry::new())
    }

    /// Create a controller around an existing registry
    pub fn with_registry(sink: S, signs: SignRegistry) -> Self {
        HanoverController { sink, signs }
    }

    /// Register a sign, replacing any sign with the same name
    pub fn add_sign(&mut self, sign: Sign) {
        debug!(
            sign = sign.name(),
            address = sign.address(),
            width = sign.width(),
            height = sign.height(),
            "registered sign"
        );
        self.signs.register(sign);
    }

    pub fn signs(&self) -> &SignRegistry {
        &self.signs
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Broadcast the test-sequence start command.
    /// Every sign on the bus responds, registered or not.
    pub fn start_test_signs(&mut self) -> Result<()> {
        self.send(BROADCAST_ADDRESS, &Command::StartTestSigns)
    }

    /// Broadcast the test-sequence stop command
    pub fn stop_test_signs(&mut self) -> Result<()> {
        self.send(BROADCAST_ADDRESS, &Command::StopTestSigns)
    }

    /// Send an image to the named sign
    pub fn draw_image(&mut self, sign_name: &str, image: &Bitmap) -> Result<()> {
        let sign = self.signs.get(sign_name)?;
        let address = sign.address();
        let command = Command::DrawImage(to_payload(image, sign)?);
        self.send(address, &command)
    }

    /// Send an image to the only registered sign
    pub fn draw_image_to_only_sign(&mut self, image: &Bitmap) -> Result<()> {
        let sign = self.signs.only()?;
        let address = sign.address();
        let command = Command::DrawImage(to_payload(image, sign)?);
        self.send(address, &command)
    }

    /// Blank every registered sign, in registration order.
    /// All frames are encoded before the first write.
    pub fn clear_all(&mut self) -> Result<()> {
        let frames = self
            .signs
            .all()
            .map(|sign| {
                let command = Command::DrawImage(to_payload(&sign.blank_image(), sign)?);
                command.to_frame(sign.address())
            })
            .collect::<Result<Vec<_>>>()?;

        for frame in frames {
            self.write(&frame)?;
        }
        Ok(())
    }

    fn send(&mut self, address: u8, command: &Command) -> Result<()> {
        let frame = command.to_frame(address)?;
        debug!(
            address,
            command = command.code(),
            bytes = frame.len(),
            "sending frame"
        );
        self.write(&frame)
    }

    fn write(&mut self, frame: &[u8]) -> Result<()> {
        trace!(frame = %frame.escape_ascii(), "frame bytes");
        self.sink.write_frame(frame)?;
        Ok(())
    }
}
