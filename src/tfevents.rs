//! Reader for TensorBoard event files.
//!
//! Event files are TFRecord streams: each record is a length-prefixed,
//! checksummed protobuf `Event`. This module walks the framing, decodes the
//! events, and collects every scalar observation grouped by tag.

use crate::proto::{summary_value, Event};
use prost::Message;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Filename prefix that marks a TensorBoard event log.
pub const EVENT_FILE_PREFIX: &str = "events.out.tfevents";

/// CRC mask applied by the TFRecord format.
const CRC_MASK_DELTA: u32 = 0xa282_ead8;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record checksum mismatch at byte {offset}")]
    Checksum { offset: u64 },
    #[error("malformed event protobuf: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// One scalar observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarPoint {
    pub step: i64,
    pub value: f64,
    pub wall_time: f64,
}

/// Read every record in `path` and collect scalar observations by tag.
///
/// Point order within a tag preserves file order. A file that ends in the
/// middle of a record (a log still being written, or a truncated copy)
/// yields the records read so far; a failed checksum or protobuf decode
/// fails the whole file.
pub fn read_scalars(path: &Path) -> Result<BTreeMap<String, Vec<ScalarPoint>>, ReadError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut tags: BTreeMap<String, Vec<ScalarPoint>> = BTreeMap::new();

    let mut offset = 0u64;
    while let Some(payload) = next_record(&mut reader, &mut offset)? {
        let event = Event::decode(payload.as_slice())?;
        let Some(summary) = event.summary else {
            continue;
        };
        for value in summary.value {
            let Some(summary_value::Value::SimpleValue(v)) = value.value else {
                continue;
            };
            tags.entry(value.tag).or_default().push(ScalarPoint {
                step: event.step,
                value: f64::from(v),
                wall_time: event.wall_time,
            });
        }
    }

    Ok(tags)
}

/// Read one framed record: u64 length, masked CRC of the length bytes, the
/// payload, masked CRC of the payload. Returns `None` at end of stream.
///
/// The length checksum is verified before the payload allocation, so a
/// corrupt length can never trigger an oversized read.
fn next_record<R: Read>(reader: &mut R, offset: &mut u64) -> Result<Option<Vec<u8>>, ReadError> {
    let record_start = *offset;

    let mut len_buf = [0u8; 8];
    if !fill(reader, &mut len_buf)? {
        return Ok(None);
    }
    let mut crc_buf = [0u8; 4];
    if !fill(reader, &mut crc_buf)? {
        return Ok(None);
    }
    if masked_crc32c(&len_buf) != u32::from_le_bytes(crc_buf) {
        return Err(ReadError::Checksum { offset: record_start });
    }

    let len = u64::from_le_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    if !fill(reader, &mut payload)? {
        return Ok(None);
    }
    if !fill(reader, &mut crc_buf)? {
        return Ok(None);
    }
    if masked_crc32c(&payload) != u32::from_le_bytes(crc_buf) {
        return Err(ReadError::Checksum { offset: record_start });
    }

    *offset = record_start + 8 + 4 + len as u64 + 4;
    Ok(Some(payload))
}

/// Fill `buf` completely, returning false on end of stream.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(true)
}

fn masked_crc32c(bytes: &[u8]) -> u32 {
    crc32c::crc32c(bytes).rotate_right(15).wrapping_add(CRC_MASK_DELTA)
}

/// Builders for synthetic event files used across the test modules.
#[cfg(test)]
pub(crate) mod testdata {
    use super::masked_crc32c;
    use crate::proto::{summary_value, Event, Summary, SummaryValue};
    use prost::Message;
    use std::path::Path;

    pub(crate) fn scalar_event(tag: &str, step: i64, value: f32, wall_time: f64) -> Event {
        Event {
            wall_time,
            step,
            summary: Some(Summary {
                value: vec![SummaryValue {
                    tag: tag.to_string(),
                    value: Some(summary_value::Value::SimpleValue(value)),
                }],
            }),
        }
    }

    pub(crate) fn encode_records(events: &[Event]) -> Vec<u8> {
        let mut out = Vec::new();
        for event in events {
            let payload = event.encode_to_vec();
            let len_buf = (payload.len() as u64).to_le_bytes();
            out.extend_from_slice(&len_buf);
            out.extend_from_slice(&masked_crc32c(&len_buf).to_le_bytes());
            out.extend_from_slice(&payload);
            out.extend_from_slice(&masked_crc32c(&payload).to_le_bytes());
        }
        out
    }

    pub(crate) fn write_event_file(path: &Path, events: &[Event]) {
        std::fs::write(path, encode_records(events)).unwrap();
    }
}
