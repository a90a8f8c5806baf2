//! Hanover serial protocol: frame codec and image packing

pub mod frame;
pub mod image;

pub use frame::{
    checksum, decode, encode, Command, DecodedFrame, BROADCAST_ADDRESS, END_BYTE, MAX_ADDRESS,
    MAX_IMAGE_BYTES, MAX_PAYLOAD_LEN, START_BYTE,
};
pub use image::{pack_columns, to_payload};
