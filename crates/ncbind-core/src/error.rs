#![forbid(unsafe_code)]

//! Error taxonomy.
//!
//! Discovery failures ([`Error::UnsupportedPlatform`], [`Error::ProbeFailed`],
//! [`Error::CorruptAbi`]) are fatal and surface once at startup. Encoding and
//! length failures describe bad caller input and are local to one call.
//! [`Error::NativeCall`] means the native library itself rejected the call.
//!
//! Releasing a native handle never produces an error value; release reports
//! a `bool` and logs instead.

use thiserror::Error;

use crate::{ERR, OK};

/// Errors surfaced by every ncbind crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No known configuration matches this OS family, word size, and build.
    #[error("unsupported platform: {os} ({word_size}-bit, wide build: {wide})")]
    UnsupportedPlatform {
        os: &'static str,
        word_size: u32,
        wide: bool,
    },

    /// The native library could not be loaded, or a required symbol or the
    /// locale setup was unavailable.
    #[error("probe of `{library}` failed: {reason}")]
    ProbeFailed { library: String, reason: String },

    /// The resolved ABI facts cannot describe a real layout.
    #[error("corrupt ABI configuration: {0}")]
    CorruptAbi(String),

    /// A character could not be represented under the active text encoding.
    #[error("cannot {direction} {subject} under {encoding}")]
    Encoding {
        direction: &'static str,
        subject: String,
        encoding: &'static str,
    },

    /// A requested buffer length is negative or above the configured limit.
    #[error("invalid length {requested} (maximum {max})")]
    InvalidLength { requested: i64, max: usize },

    /// The native function reported failure through its return convention.
    #[error("{function} returned {}", describe_return(*.result))]
    NativeCall { function: &'static str, result: i64 },

    /// A process-wide component was used before it was initialized.
    #[error("{0} is not initialized")]
    NotInitialized(&'static str),
}

fn describe_return(result: i64) -> String {
    match result {
        0 => "NULL".to_string(),
        r if r == i64::from(ERR) => "ERR".to_string(),
        r => r.to_string(),
    }
}

impl Error {
    /// Build an encoding failure for a character that cannot be written.
    #[must_use]
    pub fn unencodable(ch: char, encoding: &'static str) -> Self {
        Self::Encoding {
            direction: "encode",
            subject: format!("U+{:04X}", u32::from(ch)),
            encoding,
        }
    }

    /// Build an encoding failure for a native unit that cannot be read back.
    #[must_use]
    pub fn undecodable(unit: u32, encoding: &'static str) -> Self {
        Self::Encoding {
            direction: "decode",
            subject: format!("native unit 0x{unit:X}"),
            encoding,
        }
    }

    /// `true` when the caller's input was bad (encoding or length), as
    /// opposed to a native rejection or a startup failure.
    #[must_use]
    pub const fn is_caller_input(&self) -> bool {
        matches!(self, Self::Encoding { .. } | Self::InvalidLength { .. })
    }

    /// `true` for failures that leave the process unable to use the native
    /// library at all.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform { .. } | Self::ProbeFailed { .. } | Self::CorruptAbi(_)
        )
    }
}

/// Standard result type for ncbind APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Map a native `int` status (`ERR` on failure) to a `Result`.
pub fn check_status(function: &'static str, result: i32) -> Result<i32> {
    if result == ERR {
        Err(Error::NativeCall {
            function,
            result: i64::from(result),
        })
    } else {
        Ok(result)
    }
}

/// Map a native pointer return (NULL on failure) to a `Result`.
pub fn check_ptr<T>(function: &'static str, ptr: *mut T) -> Result<*mut T> {
    if ptr.is_null() {
        Err(Error::NativeCall {
            function,
            result: i64::from(OK),
        })
    } else {
        Ok(ptr)
    }
}
