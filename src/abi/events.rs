//! Best-effort log decoding.
//!
//! Descriptors are kept in load order and scanned linearly; the first event
//! whose selector equals a log's first topic is used. Colliding selectors
//! from unrelated contracts are not told apart.

use alloy::dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy::json_abi::Event;
use alloy::primitives::{hex, Address, B256};
use std::fmt;

use crate::abi::artifacts::Artifact;
use crate::blockchain::types::LogEntry;

/// One decoded event field.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    pub name: String,
    pub indexed: bool,
    pub value: DynSolValue,
}

/// A log matched and decoded against a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
    pub address: Address,
    pub event: String,
    pub selector: B256,
    /// Fields in declared order.
    pub fields: Vec<DecodedField>,
}

impl fmt::Display for DecodedLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.event)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field.name, format_value(&field.value))?;
        }
        write!(f, ")")
    }
}

/// Result of decoding a single log.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Decoded(DecodedLog),
    /// No descriptor has this log's signature hash, or the log has no topics.
    NotMatched,
    /// A descriptor matched but the log does not fit its layout.
    Malformed { event: String, reason: String },
}

/// Immutable set of event descriptors.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    events: Vec<Event>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect events from artifacts, preserving artifact order.
    pub fn from_artifacts(artifacts: &[Artifact]) -> Self {
        let mut registry = Self::new();
        for artifact in artifacts {
            registry.extend(artifact.abi.events().cloned());
        }
        registry
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// First non-anonymous event with this selector.
    pub fn find(&self, selector: &B256) -> Option<&Event> {
        self.events
            .iter()
            .find(|event| !event.anonymous && event.selector() == *selector)
    }

    /// Match and decode a log.
    pub fn decode(&self, log: &LogEntry) -> DecodeOutcome {
        let outcome = self.match_and_decode(log);
        let label = match &outcome {
            DecodeOutcome::Decoded(_) => "decoded",
            DecodeOutcome::NotMatched => "not_matched",
            DecodeOutcome::Malformed { .. } => "malformed",
        };
        metrics::counter!("kettle_events_decoded_total", "outcome" => label).increment(1);
        outcome
    }

    fn match_and_decode(&self, log: &LogEntry) -> DecodeOutcome {
        let Some(selector) = log.signature_hash() else {
            return DecodeOutcome::NotMatched;
        };
        let Some(event) = self.find(&selector) else {
            return DecodeOutcome::NotMatched;
        };

        match decode_fields(event, log) {
            Ok(fields) => DecodeOutcome::Decoded(DecodedLog {
                address: log.address,
                event: event.name.clone(),
                selector,
                fields,
            }),
            Err(reason) => {
                tracing::warn!(
                    event = %event.name,
                    address = %log.address,
                    reason = %reason,
                    "Log matched event signature but failed to decode"
                );
                DecodeOutcome::Malformed {
                    event: event.name.clone(),
                    reason,
                }
            }
        }
    }

    /// Decoded rendering when possible, raw summary otherwise.
    pub fn render(&self, log: &LogEntry) -> String {
        render_outcome(log, &self.decode(log))
    }
}

impl Extend<Event> for EventRegistry {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

/// Render an outcome already decoded from `log`.
pub fn render_outcome(log: &LogEntry, outcome: &DecodeOutcome) -> String {
    match outcome {
        DecodeOutcome::Decoded(decoded) => decoded.to_string(),
        _ => render_raw(log),
    }
}

/// Raw summary: address, topic count and first topic if present.
pub fn render_raw(log: &LogEntry) -> String {
    match log.signature_hash() {
        Some(first) => format!(
            "log from {} ({} topics, topic0 {})",
            log.address,
            log.topics.len(),
            first
        ),
        None => format!("log from {} (0 topics)", log.address),
    }
}

/// Reference types are stored as their keccak hash when indexed.
fn hashed_when_indexed(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

fn decode_fields(event: &Event, log: &LogEntry) -> Result<Vec<DecodedField>, String> {
    let indexed = event.inputs.iter().filter(|p| p.indexed).count();
    if log.topics.len() != indexed + 1 {
        return Err(format!(
            "expected {} topics, found {}",
            indexed + 1,
            log.topics.len()
        ));
    }

    let mut body_types: Vec<DynSolType> = Vec::new();
    for param in event.inputs.iter().filter(|p| !p.indexed) {
        body_types.push(param.resolve().map_err(|e| e.to_string())?);
    }
    let body = if body_types.is_empty() {
        Vec::new()
    } else {
        match DynSolType::Tuple(body_types)
            .abi_decode_sequence(&log.data)
            .map_err(|e| e.to_string())?
        {
            DynSolValue::Tuple(values) => values,
            other => vec![other],
        }
    };

    let mut topics = log.topics[1..].iter();
    let mut body = body.into_iter();
    let mut fields = Vec::with_capacity(event.inputs.len());
    for param in &event.inputs {
        let value = if param.indexed {
            let topic = topics.next().ok_or("ran out of topics")?;
            let ty: DynSolType = param.resolve().map_err(|e| e.to_string())?;
            if hashed_when_indexed(&ty) {
                DynSolValue::FixedBytes(*topic, 32)
            } else {
                ty.abi_decode(topic.as_slice()).map_err(|e| e.to_string())?
            }
        } else {
            body.next().ok_or("ran out of data fields")?
        };
        fields.push(DecodedField {
            name: param.name.clone(),
            indexed: param.indexed,
            value,
        });
    }

    Ok(fields)
}

/// Human-readable rendering of an ABI value.
pub fn format_value(value: &DynSolValue) -> String {
    fn join(values: &[DynSolValue]) -> String {
        values.iter().map(format_value).collect::<Vec<_>>().join(", ")
    }

    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => hex::encode_prefixed(&word[..*size]),
        DynSolValue::Address(address) => address.to_string(),
        DynSolValue::Bytes(bytes) => hex::encode_prefixed(bytes),
        DynSolValue::String(s) => format!("{:?}", s),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
            format!("[{}]", join(values))
        }
        DynSolValue::Tuple(values) => format!("({})", join(values)),
        other => format!("{:?}", other),
    }
}
