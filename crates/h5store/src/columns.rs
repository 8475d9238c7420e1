// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Arrow column <-> HDF5 dataset conversion

use crate::layout::{column_dataset, mask_dataset};
use crate::options::SaveOptions;
use crate::{Result, StoreError};
use arrow::array::{
    Array, ArrayRef, ArrowPrimitiveType, AsArray, BooleanArray, LargeStringArray, PrimitiveArray,
    StringArray,
};
use arrow::buffer::{BooleanBuffer, NullBuffer};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Field, Float32Type, Float64Type, Int8Type, Int16Type,
    Int32Type, Int64Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use hdf5::types::VarLenUnicode;
use hdf5::{Group, H5Type};
use std::sync::Arc;

/// Whether a column of this type can be stored
pub fn is_supported(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Date32
            | DataType::Date64
            | DataType::Timestamp(_, _)
    )
}

/// Write one 1-D dataset, chunked and compressed as the options ask
pub(crate) fn write_values<T: H5Type>(
    group: &Group,
    name: &str,
    values: &[T],
    options: &SaveOptions,
) -> Result<()> {
    let n = values.len();
    let builder = group.new_dataset::<T>();
    let dataset = match (options.chunk_len(n), options.deflate_level()) {
        (Some(chunk), Some(level)) => builder.chunk(chunk).deflate(level).shape(n).create(name)?,
        (Some(chunk), None) => builder.chunk(chunk).shape(n).create(name)?,
        (None, _) => builder.shape(n).create(name)?,
    };
    if n > 0 {
        dataset.write_raw(values)?;
    }
    Ok(())
}

/// Read one 1-D dataset, checking its length
pub(crate) fn read_values<T: H5Type>(group: &Group, name: &str, expected: usize) -> Result<Vec<T>> {
    let dataset = group.dataset(name)?;
    let size = dataset.size();
    if size != expected {
        return Err(StoreError::corrupt(
            group.name(),
            format!("dataset {name} has {size} rows, expected {expected}"),
        ));
    }
    if size == 0 {
        return Ok(Vec::new());
    }
    Ok(dataset.read_raw::<T>()?)
}

pub(crate) fn to_varlen(column: &str, values: &[&str]) -> Result<Vec<VarLenUnicode>> {
    values
        .iter()
        .map(|s| {
            s.parse::<VarLenUnicode>().map_err(|e| StoreError::InvalidString {
                column: column.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn write_strings<'a, I>(group: &Group, name: &str, column: &str, values: I, options: &SaveOptions) -> Result<()>
where
    I: Iterator<Item = Option<&'a str>>,
{
    let plain: Vec<&str> = values.map(|v| v.unwrap_or_default()).collect();
    let encoded = to_varlen(column, &plain)?;
    write_values(group, name, &encoded, options)
}

/// Write column `idx` (and its validity mask when it has nulls)
pub(crate) fn write_column(
    group: &Group,
    idx: usize,
    field: &Field,
    array: &ArrayRef,
    options: &SaveOptions,
) -> Result<()> {
    let name = column_dataset(idx);

    macro_rules! primitive {
        ($t:ty) => {
            write_values(group, &name, &array.as_primitive::<$t>().values()[..], options)?
        };
    }

    match array.data_type() {
        DataType::Boolean => {
            let bools = array.as_boolean();
            let values: Vec<u8> = bools.values().iter().map(u8::from).collect();
            write_values(group, &name, &values, options)?
        }
        DataType::Int8 => primitive!(Int8Type),
        DataType::Int16 => primitive!(Int16Type),
        DataType::Int32 => primitive!(Int32Type),
        DataType::Int64 => primitive!(Int64Type),
        DataType::UInt8 => primitive!(UInt8Type),
        DataType::UInt16 => primitive!(UInt16Type),
        DataType::UInt32 => primitive!(UInt32Type),
        DataType::UInt64 => primitive!(UInt64Type),
        DataType::Float32 => primitive!(Float32Type),
        DataType::Float64 => primitive!(Float64Type),
        DataType::Date32 => primitive!(Date32Type),
        DataType::Date64 => primitive!(Date64Type),
        DataType::Timestamp(TimeUnit::Second, _) => primitive!(TimestampSecondType),
        DataType::Timestamp(TimeUnit::Millisecond, _) => primitive!(TimestampMillisecondType),
        DataType::Timestamp(TimeUnit::Microsecond, _) => primitive!(TimestampMicrosecondType),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => primitive!(TimestampNanosecondType),
        DataType::Utf8 => {
            write_strings(group, &name, field.name(), array.as_string::<i32>().iter(), options)?
        }
        DataType::LargeUtf8 => {
            write_strings(group, &name, field.name(), array.as_string::<i64>().iter(), options)?
        }
        other => {
            return Err(StoreError::UnsupportedType {
                column: field.name().clone(),
                data_type: other.to_string(),
            });
        }
    }

    if let Some(nulls) = array.nulls()
        && nulls.null_count() > 0
    {
        let mask: Vec<u8> = nulls.iter().map(u8::from).collect();
        write_values(group, &mask_dataset(idx), &mask, options)?;
    }
    Ok(())
}

fn read_nulls(group: &Group, idx: usize, nrows: usize) -> Result<Option<NullBuffer>> {
    let name = mask_dataset(idx);
    if !group.link_exists(&name) {
        return Ok(None);
    }
    let mask: Vec<u8> = read_values(group, &name, nrows)?;
    let valid: Vec<bool> = mask.into_iter().map(|v| v != 0).collect();
    Ok(Some(NullBuffer::from(valid)))
}

fn read_primitive<T: ArrowPrimitiveType>(
    group: &Group,
    name: &str,
    field: &Field,
    nrows: usize,
    nulls: Option<NullBuffer>,
) -> Result<ArrayRef>
where
    T::Native: H5Type,
{
    let values: Vec<T::Native> = read_values(group, name, nrows)?;
    let array = PrimitiveArray::<T>::try_new(values.into(), nulls)?
        .with_data_type(field.data_type().clone());
    Ok(Arc::new(array))
}

fn read_strings(group: &Group, name: &str, nrows: usize, nulls: &Option<NullBuffer>) -> Result<Vec<Option<String>>> {
    let values: Vec<VarLenUnicode> = read_values(group, name, nrows)?;
    Ok(values
        .iter()
        .enumerate()
        .map(|(i, v)| match nulls {
            Some(n) if n.is_null(i) => None,
            _ => Some(v.as_str().to_string()),
        })
        .collect())
}

/// Read column `idx` as described by `field`
pub(crate) fn read_column(group: &Group, idx: usize, field: &Field, nrows: usize) -> Result<ArrayRef> {
    let name = column_dataset(idx);
    let nulls = read_nulls(group, idx, nrows)?;

    let array: ArrayRef = match field.data_type() {
        DataType::Boolean => {
            let raw: Vec<u8> = read_values(group, &name, nrows)?;
            let values: Vec<bool> = raw.into_iter().map(|v| v != 0).collect();
            Arc::new(BooleanArray::new(BooleanBuffer::from(values.as_slice()), nulls))
        }
        DataType::Int8 => read_primitive::<Int8Type>(group, &name, field, nrows, nulls)?,
        DataType::Int16 => read_primitive::<Int16Type>(group, &name, field, nrows, nulls)?,
        DataType::Int32 => read_primitive::<Int32Type>(group, &name, field, nrows, nulls)?,
        DataType::Int64 => read_primitive::<Int64Type>(group, &name, field, nrows, nulls)?,
        DataType::UInt8 => read_primitive::<UInt8Type>(group, &name, field, nrows, nulls)?,
        DataType::UInt16 => read_primitive::<UInt16Type>(group, &name, field, nrows, nulls)?,
        DataType::UInt32 => read_primitive::<UInt32Type>(group, &name, field, nrows, nulls)?,
        DataType::UInt64 => read_primitive::<UInt64Type>(group, &name, field, nrows, nulls)?,
        DataType::Float32 => read_primitive::<Float32Type>(group, &name, field, nrows, nulls)?,
        DataType::Float64 => read_primitive::<Float64Type>(group, &name, field, nrows, nulls)?,
        DataType::Date32 => read_primitive::<Date32Type>(group, &name, field, nrows, nulls)?,
        DataType::Date64 => read_primitive::<Date64Type>(group, &name, field, nrows, nulls)?,
        DataType::Timestamp(TimeUnit::Second, _) => {
            read_primitive::<TimestampSecondType>(group, &name, field, nrows, nulls)?
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            read_primitive::<TimestampMillisecondType>(group, &name, field, nrows, nulls)?
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            read_primitive::<TimestampMicrosecondType>(group, &name, field, nrows, nulls)?
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            read_primitive::<TimestampNanosecondType>(group, &name, field, nrows, nulls)?
        }
        DataType::Utf8 => Arc::new(StringArray::from(read_strings(group, &name, nrows, &nulls)?)),
        DataType::LargeUtf8 => {
            Arc::new(LargeStringArray::from(read_strings(group, &name, nrows, &nulls)?))
        }
        other => {
            return Err(StoreError::corrupt(
                group.name(),
                format!("column '{}' declares unsupported type {}", field.name(), other),
            ));
        }
    };
    Ok(array)
}
