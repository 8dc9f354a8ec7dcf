use std::time::SystemTime;

use md5::{Digest, Md5};

use crate::origin::OriginId;

/// Maximum stream name length in characters.
pub const MAX_STREAM_NAME_LEN: usize = 128;
/// Maximum record payload size in bytes.
pub const MAX_DATA_SIZE: usize = 1_048_576;
/// Maximum partition key length in characters.
pub const MAX_PARTITION_KEY_LEN: usize = 256;

/// Known encryption type: no encryption. The set is open — the stream
/// service may report values this crate has never heard of.
pub const ENCRYPTION_NONE: &str = "NONE";
/// Known encryption type: server-side encryption by a KMS key.
pub const ENCRYPTION_KMS: &str = "KMS";

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::InboundRecord {}
    impl Sealed for super::OutboundRecord {}
}

/// Common capability set of stream records.
///
/// Sealed: only the two record types of this crate implement it. External
/// code consumes records, it never provides its own implementations.
///
/// Payload access is value-isolated: `data()` is a read-only view,
/// `data_to_vec()` is a fresh defensive copy on every call — mutating a
/// returned copy never affects the record.
pub trait StreamRecord: sealed::Sealed {
    /// Name of the stream this record belongs to.
    fn stream_name(&self) -> &str;

    /// Read-only view of the payload.
    fn data(&self) -> &[u8];

    /// Defensive copy of the payload.
    fn data_to_vec(&self) -> Vec<u8>;

    /// Key whose hash determines shard placement absent an explicit override.
    fn partition_key(&self) -> &str;
}

/// MD5 of the UTF-8 encoded key, interpreted as a big-endian 128-bit
/// integer. This is the shard placement hash the stream service applies
/// when no explicit hash key overrides it.
pub fn partition_hash(key: &str) -> u128 {
    let digest: [u8; 16] = Md5::digest(key.as_bytes()).into();
    u128::from_be_bytes(digest)
}

/// A record read from the stream. Created by the transport layer when
/// polling; immutable for its entire lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRecord {
    stream_name: String,
    data: Vec<u8>,
    partition_key: String,
    sequence_number: String,
    approximate_arrival_timestamp: SystemTime,
    encryption_type: String,
}

impl InboundRecord {
    pub fn new(
        stream_name: impl Into<String>,
        data: Vec<u8>,
        partition_key: impl Into<String>,
        sequence_number: impl Into<String>,
        approximate_arrival_timestamp: SystemTime,
        encryption_type: impl Into<String>,
    ) -> Self {
        Self {
            stream_name: stream_name.into(),
            data,
            partition_key: partition_key.into(),
            sequence_number: sequence_number.into(),
            approximate_arrival_timestamp,
            encryption_type: encryption_type.into(),
        }
    }

    /// Unique identifier of the record within its shard. Opaque.
    pub fn sequence_number(&self) -> &str {
        &self.sequence_number
    }

    /// Approximate time the record was inserted into the stream.
    pub fn approximate_arrival_timestamp(&self) -> SystemTime {
        self.approximate_arrival_timestamp
    }

    /// Encryption type reported by the stream service. Known values are
    /// [`ENCRYPTION_NONE`] and [`ENCRYPTION_KMS`]; never validated against
    /// a closed set.
    pub fn encryption_type(&self) -> &str {
        &self.encryption_type
    }
}

impl StreamRecord for InboundRecord {
    fn stream_name(&self) -> &str {
        &self.stream_name
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn data_to_vec(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn partition_key(&self) -> &str {
        &self.partition_key
    }
}

/// A record to be written to the stream. Constructible only through
/// [`crate::builder::OutboundRecordBuilder`]; immutable once built.
///
/// The same instance (or clones of it) may legitimately occupy multiple
/// positions in one output list — there is no uniqueness invariant.
#[derive(Debug, Clone)]
pub struct OutboundRecord {
    stream_name: String,
    data: Vec<u8>,
    partition_key: String,
    explicit_hash_key: Option<u128>,
    origin: OriginId,
}

impl OutboundRecord {
    pub(crate) fn new(
        stream_name: String,
        data: Vec<u8>,
        partition_key: String,
        explicit_hash_key: Option<u128>,
        origin: OriginId,
    ) -> Self {
        Self {
            stream_name,
            data,
            partition_key,
            explicit_hash_key,
            origin,
        }
    }

    pub(crate) fn origin(&self) -> OriginId {
        self.origin
    }

    /// Explicit shard placement override, if set.
    pub fn explicit_hash_key(&self) -> Option<u128> {
        self.explicit_hash_key
    }

    /// Effective shard placement hash: the explicit hash key when present,
    /// otherwise [`partition_hash`] of the partition key.
    pub fn shard_hash_key(&self) -> u128 {
        match self.explicit_hash_key {
            Some(key) => key,
            None => partition_hash(&self.partition_key),
        }
    }
}

impl StreamRecord for OutboundRecord {
    fn stream_name(&self) -> &str {
        &self.stream_name
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn data_to_vec(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn partition_key(&self) -> &str {
        &self.partition_key
    }
}

// Value equality — builder provenance is not part of the record's value.
impl PartialEq for OutboundRecord {
    fn eq(&self, other: &Self) -> bool {
        self.stream_name == other.stream_name
            && self.data == other.data
            && self.partition_key == other.partition_key
            && self.explicit_hash_key == other.explicit_hash_key
    }
}

impl Eq for OutboundRecord {}
