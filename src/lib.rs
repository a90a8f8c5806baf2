//! Drive Hanover flipdot signs over a shared serial bus.
//!
//! Images and control commands are encoded into ASCII-hex Hanover frames and
//! written to a [`ByteSink`]. Several signs can share one bus; each is
//! registered with its rotary-switch address and dot geometry.
//!
//! ```
//! use hanover_flipdot::{HanoverController, RecordingSink, Sign};
//!
//! let mut controller = HanoverController::new(RecordingSink::new());
//! controller.add_sign(Sign::new("dev", 1, 86, 7)?);
//!
//! let mut image = controller.signs().get("dev")?.blank_image();
//! image.set(3, 10, true);
//! controller.draw_image("dev", &image)?;
//! controller.start_test_signs()?;
//!
//! assert_eq!(controller.sink().frames().len(), 2);
//! # Ok::<(), hanover_flipdot::Error>(())
//! ```

pub mod bitmap;
pub mod config;
pub mod controller;
pub mod error;
pub mod output;
pub mod protocol;
pub mod sign;

pub use bitmap::Bitmap;
pub use config::Config;
pub use controller::HanoverController;
pub use error::{Error, Result};
pub use output::{ByteSink, RecordingSink, SerialSink};
pub use sign::{Sign, SignRegistry};
