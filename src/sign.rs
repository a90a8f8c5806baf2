use crate::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::protocol::{BROADCAST_ADDRESS, MAX_ADDRESS, MAX_IMAGE_BYTES};

/// A Hanover sign on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sign {
    name: String,
    address: u8,
    width: usize,
    height: usize,
    flip: bool,
}

impl Sign {
    /// Validate and create a sign
    pub fn new(name: &str, address: u8, width: usize, height: usize) -> Result<Self> {
        Self::with_flip(name, address, width, height, false)
    }

    /// Create a sign, `flip` marking one mounted upside-down
    pub fn with_flip(name: &str, address: u8, width: usize, height: usize, flip: bool) -> Result<Self> {
        let reject = |reason: String| Error::Configuration {
            sign: name.to_string(),
            reason,
        };

        if address == BROADCAST_ADDRESS || address > MAX_ADDRESS {
            return Err(reject(format!(
                "address {} out of range (1-{})",
                address, MAX_ADDRESS
            )));
        }
        if width == 0 || height == 0 {
            return Err(reject(format!("{}x{} has no dots", width, height)));
        }

        let fits = width
            .checked_mul(height.div_ceil(8))
            .is_some_and(|image_bytes| image_bytes <= MAX_IMAGE_BYTES);
        if !fits {
            return Err(reject(format!(
                "{}x{} needs more image bytes than the {} a frame carries",
                width, height, MAX_IMAGE_BYTES
            )));
        }

        Ok(Sign {
            name: name.to_string(),
            address,
            width,
            height,
            flip,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn flip(&self) -> bool {
        self.flip
    }

    /// All-clear image sized for this sign
    pub fn blank_image(&self) -> Bitmap {
        Bitmap::new(self.width, self.height)
    }
}

/// Signs known to a controller, kept in registration order
#[derive(Debug, Default, Clone)]
pub struct SignRegistry {
    signs: Vec<Sign>,
}

impl SignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sign, replacing any entry with the same name.
    /// A replaced sign keeps its position in iteration order.
    /// Address collisions between names are not checked.
    pub fn register(&mut self, sign: Sign) {
        match self.signs.iter_mut().find(|s| s.name == sign.name) {
            Some(existing) => *existing = sign,
            None => self.signs.push(sign),
        }
    }

    /// Look up a sign by name
    pub fn get(&self, name: &str) -> Result<&Sign> {
        self.signs
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// All signs in registration order
    pub fn all(&self) -> impl Iterator<Item = &Sign> {
        self.signs.iter()
    }

    /// The single registered sign, if there is exactly one
    pub fn only(&self) -> Result<&Sign> {
        match self.signs.as_slice() {
            [sign] => Ok(sign),
            signs => Err(Error::AmbiguousSign(signs.len())),
        }
    }

    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }
}
