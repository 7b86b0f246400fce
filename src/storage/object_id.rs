use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// Length of the hex rendering of an identifier.
pub const OBJECT_ID_HEX_LEN: usize = 24;

const COUNTER_MASK: u32 = 0x00ff_ffff;

lazy_static! {
    static ref OBJECT_ID_REGEX: Regex = Regex::new(r"^[0-9a-fA-F]{24}$").unwrap();

    /// Random bytes fixed for the lifetime of the process
    static ref PROCESS_UNIQUE: [u8; 5] = rand::thread_rng().gen();

    static ref COUNTER: AtomicU32 = AtomicU32::new(rand::thread_rng().gen_range(0..=COUNTER_MASK));
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjectIdError {
    #[error("identifier '{value}' is not 24 hexadecimal characters")]
    InvalidFormat { value: String },
}

/// Document identifier assigned by the store.
///
/// Twelve bytes: seconds since the epoch, a per-process random value and a
/// rolling counter. Rendered as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub fn new() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Seconds since the Unix epoch at which the identifier was generated
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !OBJECT_ID_REGEX.is_match(s) {
            return Err(ObjectIdError::InvalidFormat {
                value: s.to_string(),
            });
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| {
                ObjectIdError::InvalidFormat {
                    value: s.to_string(),
                }
            })?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
