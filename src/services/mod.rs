//! Stateless helpers shared by the client and its consumers
//!
//! - [`value_parsers`]: raw device text → typed [`Reading`]
//! - [`key_builder`]: nested item names → stable snapshot key
//! - [`sensor_descriptor`]: presentation metadata per reading

pub mod key_builder;
pub mod sensor_descriptor;
pub mod value_parsers;

pub use key_builder::build_key;
pub use sensor_descriptor::{describe_snapshot, SensorClass, SensorDescriptor};
pub use value_parsers::{parse_value, Reading, ReadingValue, Unit};
