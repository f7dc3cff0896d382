//! Hash Slot Algorithm - CRC16 mod 16384
//!
//! Redis-compatible hash slot calculation, hash tag extraction and
//! co-location analysis for groups of keys.

use super::crc16::crc16;
use super::types::{ClusterError, ClusterResult, HashSlotInfo, HashTagAnalysis, TOTAL_SLOTS};

/// Extract hash tag from key (Redis-compatible)
///
/// The tag is the content between the first `{` and the first `}` after it.
/// Only the first pair counts, so `{a}{b}` yields `a` and `{a{b}c}` yields
/// `a{b`. An unclosed brace or an empty `{}` yields no tag.
pub fn extract_hash_tag(key: &str) -> Option<&str> {
    let start = key.find('{')?;
    let end = key[start + 1..].find('}')?;
    let tag = &key[start + 1..start + 1 + end];
    if tag.is_empty() { None } else { Some(tag) }
}

/// Resolve the part of `key` that gets hashed, together with the tag it
/// came from (if any).
pub fn effective_key(key: &str) -> (&str, Option<&str>) {
    match extract_hash_tag(key) {
        Some(tag) => (tag, Some(tag)),
        None => (key, None),
    }
}

/// Calculate hash slot for a key (CRC16 mod 16384)
///
/// # Example
/// ```
/// use keyslot_server::cluster::hash_slot::hash_slot;
///
/// let slot = hash_slot("user:1001");
/// assert!(slot < 16384);
///
/// // Hash tags ensure same slot
/// let slot1 = hash_slot("user:{1001}:profile");
/// let slot2 = hash_slot("user:{1001}:settings");
/// assert_eq!(slot1, slot2);
/// ```
pub fn hash_slot(key: &str) -> u16 {
    let (hash_key, _) = effective_key(key);
    crc16(hash_key.as_bytes()) % TOTAL_SLOTS
}

/// Slot information for a single key
pub fn calculate_slot(key: &str) -> HashSlotInfo {
    let (hash_key, tag) = effective_key(key);
    HashSlotInfo {
        key: key.to_string(),
        slot: crc16(hash_key.as_bytes()) % TOTAL_SLOTS,
        hash_tag: tag.map(str::to_string),
    }
}

/// Decide whether a group of keys is guaranteed to live in one slot.
///
/// Keys are co-located only when every one of them carries the same
/// explicit, non-empty hash tag. Keys that merely hash to the same slot
/// are reported as not co-located.
pub fn analyze_hash_tag<S: AsRef<str>>(keys: &[S]) -> ClusterResult<HashTagAnalysis> {
    let Some((first, rest)) = keys.split_first() else {
        return Err(ClusterError::EmptyInput(
            "at least one key is required".to_string(),
        ));
    };

    let common_tag = extract_hash_tag(first.as_ref())
        .filter(|tag| rest.iter().all(|k| extract_hash_tag(k.as_ref()) == Some(*tag)));

    Ok(HashTagAnalysis {
        keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
        hash_tag: common_tag.map(str::to_string),
        co_located: common_tag.is_some(),
        slot: common_tag.map(|tag| crc16(tag.as_bytes()) % TOTAL_SLOTS),
    })
}

/// Hash slot type wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashSlot(u16);

impl HashSlot {
    /// Create a new hash slot (validates range)
    pub fn new(slot: u16) -> ClusterResult<Self> {
        if slot >= TOTAL_SLOTS {
            return Err(ClusterError::InvalidSlot(slot));
        }
        Ok(Self(slot))
    }

    /// Get the slot number
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Calculate hash slot from key
    pub fn from_key(key: &str) -> Self {
        Self(hash_slot(key))
    }
}

impl TryFrom<u16> for HashSlot {
    type Error = ClusterError;

    fn try_from(slot: u16) -> ClusterResult<Self> {
        Self::new(slot)
    }
}

impl From<HashSlot> for u16 {
    fn from(slot: HashSlot) -> Self {
        slot.0
    }
}
