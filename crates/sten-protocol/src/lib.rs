//! Exchange Line Protocol Library
//!
//! This crate decodes the line-oriented traffic of a legacy analog
//! paging/intercom exchange as seen on its serial maintenance port.
//!
//! - [`ProtocolCode`]: station/code numbers and their `F`-padded wire tokens
//! - [`LineParser`]: turns a raw line into a [`CallRecord`] or a [`Rejection`]
//!
//! # Example
//!
//! ```rust
//! use sten_protocol::{parse_line, ProtocolCode};
//!
//! let record = parse_line("0501 F023 F089 X Y").unwrap();
//! assert_eq!(record.source, ProtocolCode(23));
//! assert_eq!(record.target, ProtocolCode(89));
//! ```

pub mod code;
pub mod error;
pub mod parser;

pub use code::ProtocolCode;
pub use error::{CodeField, DecodeError, Rejection};
pub use parser::{parse_line, CallRecord, DecodePolicy, LineParser};
