use {
    byteorder::{ReadBytesExt, WriteBytesExt, LE},
    common::dsa::bitmap::{Bitmap, BitmapMut},
    def::{
        storage::{Decoder, Encoder},
        SqlType, TypeDescriptor, Uuid, Value,
    },
    snafu::{prelude::*, Backtrace},
    std::{
        io::{self, Cursor},
        string::FromUtf8Error,
    },
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("invalid data for a {} column", ty))]
    InvalidData { ty: SqlType, backtrace: Backtrace },

    Io {
        source: io::Error,
    },

    #[snafu(display("the count of values does not match the count of columns"))]
    ValuesCount {
        backtrace: Backtrace,
    },

    Utf8Encoding {
        source: FromUtf8Error,
    },

    #[snafu(display("value {:?} cannot be stored in a {} column", value, ty))]
    MismatchedType {
        value: Value,
        ty: SqlType,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Row codec for one conglomerate format.
///
/// Layout: one `u32` length per variable-length column, a null bitmap
/// covering every column, then the non-null values back to back.
#[derive(Clone)]
pub struct Codec {
    columns: Vec<TypeDescriptor>,
    var_lens_byte_count: usize,
    bitmap_byte_count: usize,
    data_region_start: usize,
}

impl Codec {
    pub fn new(columns: Vec<TypeDescriptor>) -> Self {
        let (var_lens_byte_count, bitmap_byte_count) = bytes_repr_info(&columns);
        let data_region_start = var_lens_byte_count + bitmap_byte_count;

        Self {
            columns,
            var_lens_byte_count,
            bitmap_byte_count,
            data_region_start,
        }
    }
}

impl Encoder for Codec {
    type Item = Vec<Value>;
    type Error = Error;

    fn encode(&self, values: &Vec<Value>) -> Result<Vec<u8>> {
        if values.len() != self.columns.len() {
            return Err(ValuesCountSnafu.build());
        }

        let data_byte_count = values.iter().map(|v| v.byte_count()).sum::<usize>();
        let mut bytes = vec![0u8; self.data_region_start + data_byte_count];

        let (var_lens, rest) = bytes.split_at_mut(self.var_lens_byte_count);
        let mut var_lens_writer = Cursor::new(var_lens);

        let (bitmap, data_region) = rest.split_at_mut(self.bitmap_byte_count);
        let mut bitmap = BitmapMut::new(bitmap);
        let mut data_writer = Cursor::new(data_region);

        for (i, (v, col)) in values.iter().zip(self.columns.iter()).enumerate() {
            let ty = col.data_type.value_repr().0;
            if ty.is_variable_length() {
                var_lens_writer
                    .write_u32::<LE>(v.byte_count() as u32)
                    .context(IoSnafu)?;
            }

            if matches!(v, Value::Null) {
                bitmap.set_unchecked(i);
                continue;
            }

            data_writer.write_value(v, ty)?;
        }

        Ok(bytes)
    }
}

impl Decoder for Codec {
    type Item = Vec<Value>;
    type Error = Error;

    fn decode(&self, src: &[u8]) -> Result<(Vec<Value>, usize)> {
        if src.len() < self.data_region_start {
            return Err(ValuesCountSnafu.build());
        }

        let mut var_lens = Cursor::new(&src[..self.var_lens_byte_count]);
        let null_bitmap = Bitmap::new(&src[self.var_lens_byte_count..self.data_region_start]);
        let mut reader = Cursor::new(&src[self.data_region_start..]);

        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let ty = col.data_type.value_repr().0;
                let len = if ty.is_variable_length() {
                    Some(var_lens.read_u32::<LE>().context(IoSnafu)? as usize)
                } else {
                    None
                };

                if null_bitmap.is_set(i) {
                    return Ok(Value::Null);
                }

                match len {
                    Some(len) => reader.read_variable_size_value(ty, len),
                    None => reader.read_fixed_size_value(ty),
                }
            })
            .collect::<Result<_>>()
            .map(|values| (values, self.data_region_start + reader.position() as usize))
    }
}

fn bytes_repr_info(columns: &[TypeDescriptor]) -> (usize, usize) {
    let var_len_area_byte_count = columns
        .iter()
        .filter(|col| col.data_type.value_repr().0.is_variable_length())
        .count()
        * 4;

    let bitmap_byte_count = (columns.len() + 7) / 8;

    (var_len_area_byte_count, bitmap_byte_count)
}

trait ReadValue: io::Read {
    fn read_fixed_size_value(&mut self, ty: SqlType) -> Result<Value> {
        Ok(match ty {
            SqlType::Boolean => Value::Boolean({
                match self.read_u8().context(IoSnafu)? {
                    0 => false,
                    1 => true,
                    _ => return InvalidDataSnafu { ty }.fail(),
                }
            }),

            SqlType::SmallInt => Value::SmallInt(self.read_i16::<LE>().context(IoSnafu)?),
            SqlType::Int => Value::Int(self.read_i32::<LE>().context(IoSnafu)?),
            SqlType::BigInt => Value::BigInt(self.read_i64::<LE>().context(IoSnafu)?),
            SqlType::Double => Value::Double(self.read_f64::<LE>().context(IoSnafu)?),

            SqlType::Uuid => {
                let mut buf = [0u8; 16];
                self.read_exact(&mut buf).context(IoSnafu)?;
                Value::Uuid(Uuid::from_bytes(buf))
            }

            _ => return InvalidDataSnafu { ty }.fail(),
        })
    }

    fn read_variable_size_value(&mut self, ty: SqlType, len: usize) -> Result<Value> {
        let mut buf = vec![0; len];
        self.read_exact(&mut buf).context(IoSnafu)?;

        Ok(match ty {
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar => {
                Value::String(String::from_utf8(buf).context(Utf8EncodingSnafu)?)
            }
            SqlType::Varbinary | SqlType::Blob => Value::Bytes(buf),
            _ => return InvalidDataSnafu { ty }.fail(),
        })
    }
}

impl<T> ReadValue for Cursor<T> where T: AsRef<[u8]> {}

trait WriteValue: io::Write {
    fn write_value(&mut self, value: &Value, ty: SqlType) -> Result<()> {
        match (value, ty) {
            (Value::Null, _) => return Ok(()),
            (Value::Boolean(v), SqlType::Boolean) => self.write_u8(u8::from(*v)),

            (Value::SmallInt(v), SqlType::SmallInt) => self.write_i16::<LE>(*v),
            (Value::Int(v), SqlType::Int) => self.write_i32::<LE>(*v),
            (Value::BigInt(v), SqlType::BigInt) => self.write_i64::<LE>(*v),
            (Value::Double(v), SqlType::Double) => self.write_f64::<LE>(*v),

            (Value::String(s), SqlType::Char | SqlType::Varchar | SqlType::LongVarchar) => {
                self.write_all(s.as_bytes())
            }
            (Value::Uuid(v), SqlType::Uuid) => self.write_all(v.as_bytes()),
            (Value::Bytes(v), SqlType::Varbinary | SqlType::Blob) => self.write_all(v),

            (value, ty) => {
                return MismatchedTypeSnafu {
                    value: value.clone(),
                    ty,
                }
                .fail()
            }
        }
        .context(IoSnafu)
    }
}

impl WriteValue for Cursor<&mut [u8]> {}
