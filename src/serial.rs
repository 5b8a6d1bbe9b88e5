//! Binary snapshots of a [`MemoryRuleStore`](crate::MemoryRuleStore).
//!
//! The format consists of a 32-byte fixed header followed by a
//! bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"RAST"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! decoding fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.
//!
//! Trees are stored node for node, so a restored document is structurally
//! identical to the one that was stored.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{self, DocumentError};
use crate::store::{RuleId, StoreState, StoredRule};
use crate::{ComparisonType, Condition, Node, Operator, Value};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"RAST";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when writing a store snapshot.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("stored rule {id} has an inconsistent document: {source}")]
    InvalidDocument {
        id: RuleId,
        #[source]
        source: DocumentError,
    },

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when reading a store snapshot.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a rule snapshot: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedStore {
    metadata: StoreMetadata,
    rules: Vec<SerializedRule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreMetadata {
    rule_count: usize,
    last_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRule {
    id: u64,
    name: String,
    root: SerializedNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SerializedNode {
    Compare {
        field: String,
        op: SerializedComparison,
        value: SerializedValue,
    },
    And(Box<SerializedNode>, Box<SerializedNode>),
    Or(Box<SerializedNode>, Box<SerializedNode>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SerializedValue {
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedComparison {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
    Neq,
}

// ---------------------------------------------------------------------------
// ComparisonType conversion
// ---------------------------------------------------------------------------

fn serialize_op(op: ComparisonType) -> SerializedComparison {
    match op {
        ComparisonType::Gt => SerializedComparison::Gt,
        ComparisonType::Lt => SerializedComparison::Lt,
        ComparisonType::Eq => SerializedComparison::Eq,
        ComparisonType::Gte => SerializedComparison::Gte,
        ComparisonType::Lte => SerializedComparison::Lte,
        ComparisonType::Neq => SerializedComparison::Neq,
    }
}

fn deserialize_op(op: SerializedComparison) -> ComparisonType {
    match op {
        SerializedComparison::Gt => ComparisonType::Gt,
        SerializedComparison::Lt => ComparisonType::Lt,
        SerializedComparison::Eq => ComparisonType::Eq,
        SerializedComparison::Gte => ComparisonType::Gte,
        SerializedComparison::Lte => ComparisonType::Lte,
        SerializedComparison::Neq => ComparisonType::Neq,
    }
}

// ---------------------------------------------------------------------------
// Tree conversion
// ---------------------------------------------------------------------------

fn serialize_node(node: &Node) -> SerializedNode {
    match node {
        Node::Operand(cond) => SerializedNode::Compare {
            field: cond.lvariable.clone(),
            op: serialize_op(cond.comparison_type),
            value: match &cond.rvalue {
                Value::Int(v) => SerializedValue::Int(*v),
                Value::Float(v) => SerializedValue::Float(*v),
                Value::String(v) => SerializedValue::Str(v.clone()),
            },
        },
        Node::Operator {
            op: Operator::And,
            left,
            right,
        } => SerializedNode::And(
            Box::new(serialize_node(left)),
            Box::new(serialize_node(right)),
        ),
        Node::Operator {
            op: Operator::Or,
            left,
            right,
        } => SerializedNode::Or(
            Box::new(serialize_node(left)),
            Box::new(serialize_node(right)),
        ),
    }
}

fn deserialize_node(node: SerializedNode) -> Node {
    match node {
        SerializedNode::Compare { field, op, value } => Node::Operand(Condition {
            lvariable: field,
            rvalue: match value {
                SerializedValue::Int(v) => Value::Int(v),
                SerializedValue::Float(v) => Value::Float(v),
                SerializedValue::Str(v) => Value::String(v),
            },
            comparison_type: deserialize_op(op),
        }),
        SerializedNode::And(left, right) => {
            Node::join(Operator::And, deserialize_node(*left), deserialize_node(*right))
        }
        SerializedNode::Or(left, right) => {
            Node::join(Operator::Or, deserialize_node(*left), deserialize_node(*right))
        }
    }
}

// ---------------------------------------------------------------------------
// StoreState <-> SerializedStore
// ---------------------------------------------------------------------------

fn state_to_serialized(state: &StoreState) -> Result<SerializedStore, SerializeError> {
    let rules = state
        .rules
        .values()
        .map(|rule| {
            let root = document::decode(&rule.document).map_err(|source| {
                SerializeError::InvalidDocument {
                    id: rule.id,
                    source,
                }
            })?;
            Ok(SerializedRule {
                id: rule.id.get(),
                name: rule.name.clone(),
                root: serialize_node(&root),
            })
        })
        .collect::<Result<Vec<_>, SerializeError>>()?;

    Ok(SerializedStore {
        metadata: StoreMetadata {
            rule_count: rules.len(),
            last_id: state.last_id,
        },
        rules,
    })
}

fn serialized_to_state(ser: SerializedStore) -> Result<StoreState, DeserializeError> {
    validate(&ser)?;

    let rules: BTreeMap<RuleId, StoredRule> = ser
        .rules
        .into_iter()
        .map(|sr| {
            let id = RuleId::new(sr.id);
            let root = deserialize_node(sr.root);
            (
                id,
                StoredRule {
                    id,
                    name: sr.name,
                    document: document::encode(&root),
                },
            )
        })
        .collect();

    Ok(StoreState {
        rules,
        last_id: ser.metadata.last_id,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(ser: &SerializedStore) -> Result<(), DeserializeError> {
    if ser.metadata.rule_count != ser.rules.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} rules but payload has {}",
            ser.metadata.rule_count,
            ser.rules.len()
        )));
    }

    let mut seen = HashSet::with_capacity(ser.rules.len());
    for rule in &ser.rules {
        if rule.id == 0 || rule.id > ser.metadata.last_id {
            return Err(DeserializeError::Validation(format!(
                "rule id {} out of range (last assigned id {})",
                rule.id, ser.metadata.last_id
            )));
        }
        if !seen.insert(rule.id) {
            return Err(DeserializeError::Validation(format!(
                "duplicate rule id {}",
                rule.id
            )));
        }
        validate_node(&rule.root, rule.id)?;
    }

    Ok(())
}

fn validate_node(node: &SerializedNode, rule_id: u64) -> Result<(), DeserializeError> {
    match node {
        SerializedNode::Compare { field, .. } => {
            if field.is_empty() {
                return Err(DeserializeError::Validation(format!(
                    "rule {rule_id} has a condition with an empty field name"
                )));
            }
            Ok(())
        }
        SerializedNode::And(left, right) | SerializedNode::Or(left, right) => {
            validate_node(left, rule_id)?;
            validate_node(right, rule_id)
        }
    }
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // snapshots stay far below 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(state: &StoreState) -> Result<Vec<u8>, SerializeError> {
    let serialized = state_to_serialized(state)?;
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    tracing::debug!(
        rules = serialized.metadata.rule_count,
        bytes = buf.len(),
        "encoded rule snapshot"
    );
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<StoreState, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_end = HEADER_SIZE + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[HEADER_SIZE..payload_end];

    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedStore, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    let state = serialized_to_state(serialized)?;
    tracing::debug!(rules = state.rules.len(), "decoded rule snapshot");
    Ok(state)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
