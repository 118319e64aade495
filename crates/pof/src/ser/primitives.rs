// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical encodings of the reserved primitive kinds.
//!
//! Integers and floats are fixed-width little-endian. `char` is one UTF-16
//! code unit. Strings are UTF-8 with a zero terminator. Guids use the
//! mixed-endian Microsoft layout. Datetimes and timespans count 100 ns ticks.

use byteorder::{LittleEndian, WriteBytesExt};
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use super::cursor::ByteCursor;
use crate::error::{PofError, PofResult};
use crate::types::ReservedTypeId;
use crate::value::PofValue;

// ============================================================================
// Tick arithmetic
// ============================================================================

pub const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;

/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch.
const UNIX_EPOCH_SECONDS: i64 = 62_135_596_800;

/// Ticks of 9999-12-31T23:59:59.9999999Z.
pub const MAX_DATETIME_TICKS: i64 = 3_155_378_975_999_999_999;

const TICKS_MASK: i64 = 0x3FFF_FFFF_FFFF_FFFF;
const KIND_SHIFT: u32 = 62;
const KIND_UNSPECIFIED: i64 = 0;
const KIND_UTC: i64 = 1;

fn out_of_range(what: &str) -> PofError {
    PofError::InvalidData(format!("{what} outside the representable tick range"))
}

fn nanos_to_ticks(what: &str, nanos: i64) -> PofResult<i64> {
    if nanos % NANOS_PER_TICK != 0 {
        return Err(PofError::InvalidData(format!(
            "{what} has {nanos} ns, finer than the 100 ns tick"
        )));
    }
    Ok(nanos / NANOS_PER_TICK)
}

/// Datetime as the 64-bit binary form (ticks plus UTC kind bits).
pub fn datetime_to_binary(value: &DateTime<Utc>) -> PofResult<i64> {
    let sub_ticks = nanos_to_ticks("datetime", i64::from(value.timestamp_subsec_nanos()))?;
    let ticks = value
        .timestamp()
        .checked_add(UNIX_EPOCH_SECONDS)
        .and_then(|s| s.checked_mul(TICKS_PER_SECOND))
        .and_then(|t| t.checked_add(sub_ticks))
        .filter(|t| (0..=MAX_DATETIME_TICKS).contains(t))
        .ok_or_else(|| out_of_range("datetime"))?;
    Ok(ticks | (KIND_UTC << KIND_SHIFT))
}

pub fn datetime_from_binary(binary: i64) -> PofResult<DateTime<Utc>> {
    let kind = (binary >> KIND_SHIFT) & 0b11;
    if kind != KIND_UTC && kind != KIND_UNSPECIFIED {
        return Err(PofError::Unsupported("local-kind datetime".to_string()));
    }
    let ticks = binary & TICKS_MASK;
    if ticks > MAX_DATETIME_TICKS {
        return Err(out_of_range("datetime"));
    }
    let seconds = ticks.div_euclid(TICKS_PER_SECOND) - UNIX_EPOCH_SECONDS;
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
    DateTime::from_timestamp(seconds, nanos as u32).ok_or_else(|| out_of_range("datetime"))
}

pub fn timespan_to_ticks(value: TimeDelta) -> PofResult<i64> {
    let sub_ticks = nanos_to_ticks("timespan", i64::from(value.subsec_nanos()))?;
    value
        .num_seconds()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|t| t.checked_add(sub_ticks))
        .ok_or_else(|| out_of_range("timespan"))
}

pub fn timespan_from_ticks(ticks: i64) -> PofResult<TimeDelta> {
    let seconds = ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
    TimeDelta::new(seconds, nanos as u32).ok_or_else(|| out_of_range("timespan"))
}

// ============================================================================
// Characters and strings
// ============================================================================

pub fn char_to_unit(value: char) -> PofResult<u16> {
    u16::try_from(u32::from(value)).map_err(|_| {
        PofError::InvalidData(format!(
            "char U+{:04X} does not fit one UTF-16 code unit",
            u32::from(value)
        ))
    })
}

pub fn char_from_unit(unit: u16) -> PofResult<char> {
    char::from_u32(u32::from(unit))
        .ok_or_else(|| PofError::InvalidData(format!("unpaired surrogate 0x{unit:04X}")))
}

pub fn encode_string(value: &str, sink: &mut Vec<u8>) -> PofResult<()> {
    if value.as_bytes().contains(&0) {
        return Err(PofError::InvalidData(
            "string contains an interior NUL".to_string(),
        ));
    }
    sink.extend_from_slice(value.as_bytes());
    sink.push(0);
    Ok(())
}

pub fn decode_string(cursor: &mut ByteCursor) -> PofResult<String> {
    let bytes = cursor.read_until_nul()?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| PofError::InvalidData(format!("string is not UTF-8: {e}")))
}

// ============================================================================
// Value dispatch
// ============================================================================

/// Encode a primitive value.
pub fn encode(value: &PofValue, sink: &mut Vec<u8>) -> PofResult<()> {
    match value {
        PofValue::S8(v) => sink.write_i8(*v)?,
        PofValue::U8(v) => sink.write_u8(*v)?,
        PofValue::S16(v) => sink.write_i16::<LittleEndian>(*v)?,
        PofValue::U16(v) => sink.write_u16::<LittleEndian>(*v)?,
        PofValue::S32(v) => sink.write_i32::<LittleEndian>(*v)?,
        PofValue::U32(v) => sink.write_u32::<LittleEndian>(*v)?,
        PofValue::S64(v) => sink.write_i64::<LittleEndian>(*v)?,
        PofValue::U64(v) => sink.write_u64::<LittleEndian>(*v)?,
        PofValue::Float(v) => sink.write_f32::<LittleEndian>(*v)?,
        PofValue::Double(v) => sink.write_f64::<LittleEndian>(*v)?,
        PofValue::Char(v) => sink.write_u16::<LittleEndian>(char_to_unit(*v)?)?,
        PofValue::String(v) => encode_string(v, sink)?,
        PofValue::Bool(v) => sink.write_u8(u8::from(*v))?,
        PofValue::Guid(v) => sink.extend_from_slice(&v.to_bytes_le()),
        PofValue::DateTime(v) => sink.write_i64::<LittleEndian>(datetime_to_binary(v)?)?,
        PofValue::TimeSpan(v) => sink.write_i64::<LittleEndian>(timespan_to_ticks(*v)?)?,
        PofValue::Bytes(v) => {
            let len = i32::try_from(v.len()).map_err(|_| PofError::LimitExceeded {
                what: "byte buffer length",
                limit: i32::MAX as usize,
            })?;
            sink.write_i32::<LittleEndian>(len)?;
            sink.extend_from_slice(v);
        }
        other => {
            return Err(PofError::Unsupported(format!(
                "{} is not a primitive",
                other.kind_name()
            )))
        }
    }
    Ok(())
}

/// Decode one primitive of kind `kind`.
///
/// `max_bytes` bounds the length prefix of raw byte buffers.
pub fn decode(kind: ReservedTypeId, cursor: &mut ByteCursor, max_bytes: usize) -> PofResult<PofValue> {
    Ok(match kind {
        ReservedTypeId::S8 => PofValue::S8(cursor.read_i8()?),
        ReservedTypeId::U8 => PofValue::U8(cursor.read_u8()?),
        ReservedTypeId::S16 => PofValue::S16(cursor.read_i16_le()?),
        ReservedTypeId::U16 => PofValue::U16(cursor.read_u16_le()?),
        ReservedTypeId::S32 => PofValue::S32(cursor.read_i32_le()?),
        ReservedTypeId::U32 => PofValue::U32(cursor.read_u32_le()?),
        ReservedTypeId::S64 => PofValue::S64(cursor.read_i64_le()?),
        ReservedTypeId::U64 => PofValue::U64(cursor.read_u64_le()?),
        ReservedTypeId::Float => PofValue::Float(cursor.read_f32_le()?),
        ReservedTypeId::Double => PofValue::Double(cursor.read_f64_le()?),
        ReservedTypeId::Char => PofValue::Char(char_from_unit(cursor.read_u16_le()?)?),
        ReservedTypeId::String => PofValue::String(decode_string(cursor)?),
        ReservedTypeId::Bool => PofValue::Bool(cursor.read_u8()? != 0),
        ReservedTypeId::Guid => PofValue::Guid(decode_guid(cursor)?),
        ReservedTypeId::DateTime => PofValue::DateTime(datetime_from_binary(cursor.read_i64_le()?)?),
        ReservedTypeId::TimeSpan => PofValue::TimeSpan(timespan_from_ticks(cursor.read_i64_le()?)?),
        ReservedTypeId::Bytes => {
            let len = cursor.read_len("byte buffer length", max_bytes)?;
            PofValue::Bytes(cursor.read_bytes(len)?)
        }
        other => {
            return Err(PofError::Unsupported(format!(
                "{} is not a primitive",
                other.name()
            )))
        }
    })
}

pub fn decode_guid(cursor: &mut ByteCursor) -> PofResult<Uuid> {
    let raw: Bytes = cursor.read_bytes(16)?;
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&raw);
    Ok(Uuid::from_bytes_le(bytes))
}
