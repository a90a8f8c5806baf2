use crate::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::sign::Sign;

/// Pack an image for `sign` into column-major bytes
///
/// Each column is padded at the top to a whole number of bytes and packed
/// most-significant bit first, so the bottom row lands in bit 0 of the
/// column's last byte. Flipped signs get the image turned upside-down first.
pub fn to_payload(image: &Bitmap, sign: &Sign) -> Result<Vec<u8>> {
    if image.width() != sign.width() || image.height() != sign.height() {
        return Err(Error::DimensionMismatch {
            sign: sign.name().to_string(),
            sign_width: sign.width(),
            sign_height: sign.height(),
            image_width: image.width(),
            image_height: image.height(),
        });
    }

    if sign.flip() {
        Ok(pack_columns(&image.flipped_vertically()))
    } else {
        Ok(pack_columns(image))
    }
}

/// Column-major packing with top padding
pub fn pack_columns(image: &Bitmap) -> Vec<u8> {
    let height = image.height();
    let bytes_per_column = height.div_ceil(8);
    let padding = bytes_per_column * 8 - height;

    let mut data = Vec::with_capacity(image.width() * bytes_per_column);

    for col in 0..image.width() {
        for chunk in 0..bytes_per_column {
            let mut byte = 0u8;
            for bit in 0..8 {
                // Padded row index; the first `padding` rows are always clear
                let padded_row = chunk * 8 + bit;
                if padded_row >= padding && image.get(padded_row - padding, col) {
                    byte |= 0x80 >> bit;
                }
            }
            data.push(byte);
        }
    }

    data
}
