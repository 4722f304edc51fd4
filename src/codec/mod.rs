pub mod color;
pub mod radix;

pub use color::{int_to_rgb, rgb_to_int, Rgb};
pub use radix::RadixError;
