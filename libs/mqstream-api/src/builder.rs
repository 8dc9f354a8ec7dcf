use crate::error::RecordError;
use crate::origin::OriginId;
use crate::record::{MAX_DATA_SIZE, MAX_PARTITION_KEY_LEN, MAX_STREAM_NAME_LEN, OutboundRecord};

/// Mutable, reusable builder for [`OutboundRecord`]s.
///
/// Setters validate fail-fast and chain with `?`:
///
/// ```
/// # use mqstream_api::builder::OutboundRecordBuilder;
/// # fn demo() -> Result<(), mqstream_api::error::RecordError> {
/// let mut builder = OutboundRecordBuilder::new();
/// builder.stream_name("orders")?.partition_key("shard-a")?.data(b"hello")?;
/// let record = builder.build()?;
/// # Ok(()) }
/// # demo().unwrap();
/// ```
///
/// `build()` succeeds once `stream_name`, `data` and `partition_key` have
/// each been set at least once during the builder's lifetime. State is not
/// cleared after a build — the reuse pattern of configuring the fixed
/// fields once and driving a loop over the per-record ones is supported.
/// Slices are copied on entry, so later mutation of a caller buffer never
/// affects an already built record.
///
/// A builder is not meant to be shared across concurrent invocations;
/// sequential reuse within one transformer call is fine.
#[derive(Debug, Clone)]
pub struct OutboundRecordBuilder {
    stream_name: Option<String>,
    data: Option<Vec<u8>>,
    partition_key: Option<String>,
    explicit_hash_key: Option<u128>,
    origin: OriginId,
}

impl OutboundRecordBuilder {
    /// Standalone builder. Records built by it belong to no transformer
    /// output — inside a transformer, use the output's builder factory
    /// instead, or `set_outbound_records` will reject the results.
    pub fn new() -> Self {
        Self::with_origin(OriginId::next())
    }

    pub(crate) fn with_origin(origin: OriginId) -> Self {
        Self {
            stream_name: None,
            data: None,
            partition_key: None,
            explicit_hash_key: None,
            origin,
        }
    }

    /// Set the target stream name: 1-128 characters of `[A-Za-z0-9._-]`.
    pub fn stream_name(&mut self, stream_name: &str) -> Result<&mut Self, RecordError> {
        if !is_valid_stream_name(stream_name) {
            return Err(RecordError::InvalidStreamName(stream_name.to_owned()));
        }
        self.stream_name = Some(stream_name.to_owned());
        Ok(self)
    }

    /// Set the payload. Copied on entry; at most 1,048,576 bytes.
    pub fn data(&mut self, data: &[u8]) -> Result<&mut Self, RecordError> {
        if data.len() > MAX_DATA_SIZE {
            return Err(RecordError::DataTooLarge(data.len()));
        }
        self.data = Some(data.to_vec());
        Ok(self)
    }

    /// Set the payload from a string. The size limit applies to the UTF-8
    /// encoded byte length, not the character count.
    pub fn data_str(&mut self, data: &str) -> Result<&mut Self, RecordError> {
        self.data(data.as_bytes())
    }

    /// Set the partition key: 1-256 characters. Its MD5 hash determines the
    /// destination shard unless an explicit hash key overrides it; it is
    /// always transmitted either way.
    pub fn partition_key(&mut self, partition_key: &str) -> Result<&mut Self, RecordError> {
        let chars = partition_key.chars().count();
        if chars == 0 || chars > MAX_PARTITION_KEY_LEN {
            return Err(RecordError::InvalidPartitionKey(chars));
        }
        self.partition_key = Some(partition_key.to_owned());
        Ok(self)
    }

    /// Set the partition key to a random value: 128 bits of entropy,
    /// rendered as 32 hex characters. Effectively unique across records.
    pub fn random_partition_key(&mut self) -> &mut Self {
        self.partition_key = Some(format!("{:032x}", rand::random::<u128>()));
        self
    }

    /// Set the explicit hash key, overriding partition-key shard placement.
    /// `u128` is exactly the valid range `[0, 2^128)`.
    pub fn explicit_hash_key(&mut self, explicit_hash_key: u128) -> &mut Self {
        self.explicit_hash_key = Some(explicit_hash_key);
        self
    }

    /// Set the explicit hash key from the decimal string form the stream
    /// service uses on the wire. Rejects negative or out-of-range input.
    pub fn explicit_hash_key_str(&mut self, explicit_hash_key: &str) -> Result<&mut Self, RecordError> {
        let parsed = explicit_hash_key
            .parse::<u128>()
            .map_err(|_| RecordError::InvalidExplicitHashKey(explicit_hash_key.to_owned()))?;
        self.explicit_hash_key = Some(parsed);
        Ok(self)
    }

    /// Set the explicit hash key to a value drawn uniformly from `[0, 2^128)`.
    pub fn random_explicit_hash_key(&mut self) -> &mut Self {
        self.explicit_hash_key = Some(rand::random::<u128>());
        self
    }

    /// Snapshot the current state into a new immutable [`OutboundRecord`].
    ///
    /// Fails if `stream_name`, `data` or `partition_key` was never set.
    /// Builder state is untouched — a second `build()` without intervening
    /// setters produces an equal-valued record.
    pub fn build(&self) -> Result<OutboundRecord, RecordError> {
        let stream_name = self
            .stream_name
            .clone()
            .ok_or(RecordError::MissingField("stream_name"))?;
        let data = self.data.clone().ok_or(RecordError::MissingField("data"))?;
        let partition_key = self
            .partition_key
            .clone()
            .ok_or(RecordError::MissingField("partition_key"))?;

        Ok(OutboundRecord::new(
            stream_name,
            data,
            partition_key,
            self.explicit_hash_key,
            self.origin,
        ))
    }
}

impl Default for OutboundRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid_stream_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_STREAM_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{StreamRecord, partition_hash};

    fn complete_builder() -> OutboundRecordBuilder {
        let mut builder = OutboundRecordBuilder::new();
        builder
            .stream_name("orders")
            .unwrap()
            .partition_key("shard-a")
            .unwrap()
            .data(b"hello")
            .unwrap();
        builder
    }

    #[test]
    fn test_stream_name_valid_charset() {
        let mut builder = OutboundRecordBuilder::new();
        for name in ["a", "Orders-2024.eu_west", "A".repeat(128).as_str()] {
            assert!(builder.stream_name(name).is_ok(), "{name:?}");
        }
    }

    #[test]
    fn test_stream_name_rejected() {
        let mut builder = OutboundRecordBuilder::new();
        for name in ["", "orders/1", "orders 1", "örders", "A".repeat(129).as_str()] {
            assert!(
                matches!(builder.stream_name(name), Err(RecordError::InvalidStreamName(_))),
                "{name:?}"
            );
        }
    }

    #[test]
    fn test_data_size_boundaries() {
        let mut builder = OutboundRecordBuilder::new();
        assert!(builder.data(&[]).is_ok());
        assert!(builder.data(&vec![0u8; MAX_DATA_SIZE]).is_ok());
        assert_eq!(
            builder.data(&vec![0u8; MAX_DATA_SIZE + 1]).unwrap_err(),
            RecordError::DataTooLarge(MAX_DATA_SIZE + 1)
        );
    }

    #[test]
    fn test_data_str_checks_encoded_byte_length() {
        // 'ä' is 2 bytes in UTF-8: 524 289 characters exceed the byte limit.
        let oversize = "ä".repeat(MAX_DATA_SIZE / 2 + 1);
        let mut builder = OutboundRecordBuilder::new();
        assert!(matches!(
            builder.data_str(&oversize),
            Err(RecordError::DataTooLarge(_))
        ));

        // Exactly at the limit in bytes is fine.
        let at_limit = "ä".repeat(MAX_DATA_SIZE / 2);
        assert!(builder.data_str(&at_limit).is_ok());
    }

    #[test]
    fn test_partition_key_boundaries() {
        let mut builder = OutboundRecordBuilder::new();
        assert!(builder.partition_key("k").is_ok());
        assert!(builder.partition_key(&"k".repeat(256)).is_ok());
        assert_eq!(
            builder.partition_key("").unwrap_err(),
            RecordError::InvalidPartitionKey(0)
        );
        assert_eq!(
            builder.partition_key(&"k".repeat(257)).unwrap_err(),
            RecordError::InvalidPartitionKey(257)
        );
    }

    #[test]
    fn test_partition_key_counts_characters_not_bytes() {
        // 256 two-byte characters: 512 bytes, but within the 256-char limit.
        let mut builder = OutboundRecordBuilder::new();
        assert!(builder.partition_key(&"ä".repeat(256)).is_ok());
    }

    #[test]
    fn test_random_partition_key_satisfies_build() {
        let mut builder = OutboundRecordBuilder::new();
        builder
            .stream_name("orders")
            .unwrap()
            .data(b"x")
            .unwrap()
            .random_partition_key();
        let record = builder.build().unwrap();
        assert_eq!(record.partition_key().len(), 32);
        assert!(record.partition_key().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_random_partition_keys_differ() {
        let mut builder = OutboundRecordBuilder::new();
        builder.random_partition_key();
        let first = builder.clone();
        builder.random_partition_key();
        assert_ne!(first.partition_key, builder.partition_key);
    }

    #[test]
    fn test_explicit_hash_key_str_boundaries() {
        let mut builder = OutboundRecordBuilder::new();
        assert!(builder.explicit_hash_key_str("0").is_ok());
        // 2^128 - 1.
        assert!(builder
            .explicit_hash_key_str("340282366920938463463374607431768211455")
            .is_ok());
        for bad in ["-1", "340282366920938463463374607431768211456", "", "abc"] {
            assert!(
                matches!(
                    builder.explicit_hash_key_str(bad),
                    Err(RecordError::InvalidExplicitHashKey(_))
                ),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_build_missing_fields() {
        let mut builder = OutboundRecordBuilder::new();
        assert_eq!(
            builder.build().unwrap_err(),
            RecordError::MissingField("stream_name")
        );

        builder.stream_name("orders").unwrap();
        assert_eq!(builder.build().unwrap_err(), RecordError::MissingField("data"));

        // stream name and data set, but no partition key and no
        // random_partition_key call: still incomplete.
        builder.data(b"x").unwrap();
        assert_eq!(
            builder.build().unwrap_err(),
            RecordError::MissingField("partition_key")
        );
    }

    #[test]
    fn test_build_is_reusable_and_equal_valued() {
        let builder = complete_builder();
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_reuse_with_overwrite() {
        let mut builder = complete_builder();
        let first = builder.build().unwrap();

        builder.data(b"world").unwrap();
        let second = builder.build().unwrap();

        // Only the overwritten field changed.
        assert_eq!(first.data(), b"hello");
        assert_eq!(second.data(), b"world");
        assert_eq!(first.stream_name(), second.stream_name());
        assert_eq!(first.partition_key(), second.partition_key());
    }

    #[test]
    fn test_data_is_copied_at_set_time() {
        let mut payload = b"hello".to_vec();
        let mut builder = complete_builder();
        builder.data(&payload).unwrap();

        payload[0] = b'X';
        let record = builder.build().unwrap();
        assert_eq!(record.data(), b"hello");
    }

    #[test]
    fn test_explicit_hash_key_takes_placement_priority() {
        let mut builder = complete_builder();
        builder.explicit_hash_key(7);
        let record = builder.build().unwrap();
        assert_eq!(record.shard_hash_key(), 7);

        // Partition key is still carried as mandatory input.
        assert_eq!(record.partition_key(), "shard-a");
    }

    #[test]
    fn test_setting_explicit_hash_key_keeps_partition_key() {
        let mut builder = complete_builder();
        builder.random_explicit_hash_key();
        let record = builder.build().unwrap();
        assert!(record.explicit_hash_key().is_some());
        assert_ne!(record.shard_hash_key(), partition_hash("shard-a"));
    }
}
