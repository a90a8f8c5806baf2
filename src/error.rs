use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while registering signs, encoding frames or writing them out
#[derive(Debug, Error)]
pub enum Error {
    /// A sign registration was rejected (bad address or geometry)
    #[error("invalid configuration for sign '{sign}': {reason}")]
    Configuration { sign: String, reason: String },

    #[error("sign '{0}' is not registered")]
    NotFound(String),

    #[error("{image_width}x{image_height} image incompatible with sign '{sign}' ({sign_width}x{sign_height})")]
    DimensionMismatch {
        sign: String,
        sign_width: usize,
        sign_height: usize,
        image_width: usize,
        image_height: usize,
    },

    /// Address, command or payload does not fit the wire format
    #[error("cannot encode frame: {0}")]
    Encoding(String),

    /// The byte sink failed; the bus state is unknown afterwards
    #[error("write to byte sink failed: {0}")]
    Write(#[from] io::Error),

    #[error("cannot determine which sign the image is for ({0} signs registered)")]
    AmbiguousSign(usize),

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),
}
