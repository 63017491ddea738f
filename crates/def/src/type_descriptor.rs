use {
    crate::{
        types::{self, DataType, SqlType},
        Value,
    },
    byteorder::{ReadBytesExt, WriteBytesExt, LE},
    snafu::prelude::*,
    std::io::{self, Read, Write},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to read a type descriptor"))]
    Io { source: io::Error },

    #[snafu(display("invalid type descriptor"))]
    Type {
        #[snafu(backtrace)]
        source: types::Error,
    },
}

/// A column type together with its nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub data_type: DataType,
    pub nullable: bool,
}

impl TypeDescriptor {
    pub const fn new(data_type: DataType, nullable: bool) -> Self {
        Self {
            data_type,
            nullable,
        }
    }

    pub const fn not_null(data_type: DataType) -> Self {
        Self::new(data_type, false)
    }

    pub const fn nullable(data_type: DataType) -> Self {
        Self::new(data_type, true)
    }

    pub fn accepts(&self, value: &Value) -> bool {
        (self.nullable || !value.is_null()) && self.data_type.accepts(value)
    }

    /// Smallest value of an integer type.
    pub fn min_value(&self) -> Option<i64> {
        match self.data_type {
            DataType::SmallInt => Some(i16::MIN as i64),
            DataType::Int => Some(i32::MIN as i64),
            DataType::BigInt => Some(i64::MIN),
            _ => None,
        }
    }

    /// Largest value of an integer type.
    pub fn max_value(&self) -> Option<i64> {
        match self.data_type {
            DataType::SmallInt => Some(i16::MAX as i64),
            DataType::Int => Some(i32::MAX as i64),
            DataType::BigInt => Some(i64::MAX),
            _ => None,
        }
    }

    /// Builds an integer value of this type, `None` when out of range.
    pub fn integer_value(&self, v: i64) -> Option<Value> {
        match self.data_type {
            DataType::SmallInt => i16::try_from(v).ok().map(Value::SmallInt),
            DataType::Int => i32::try_from(v).ok().map(Value::Int),
            DataType::BigInt => Some(Value::BigInt(v)),
            _ => None,
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let (ty, len) = self.data_type.value_repr();
        w.write_u16::<LE>(ty as u16)?;
        w.write_u16::<LE>(len)?;
        w.write_u8(self.nullable as u8)
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, Error> {
        let ty = r.read_u16::<LE>().context(IoSnafu)?;
        let len = r.read_u16::<LE>().context(IoSnafu)?;
        let nullable = r.read_u8().context(IoSnafu)? != 0;

        let ty = SqlType::try_from(ty).context(TypeSnafu)?;
        let data_type = DataType::new(ty, len).context(TypeSnafu)?;

        Ok(Self::new(data_type, nullable))
    }
}

impl From<DataType> for TypeDescriptor {
    fn from(data_type: DataType) -> Self {
        Self::not_null(data_type)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Cursor};

    #[test]
    fn integer_bounds() {
        let small = TypeDescriptor::not_null(DataType::SmallInt);
        assert_eq!(small.max_value(), Some(32767));
        assert_eq!(small.integer_value(40000), None);
        assert_eq!(small.integer_value(12), Some(Value::SmallInt(12)));
        assert_eq!(TypeDescriptor::nullable(DataType::Varchar(4)).max_value(), None);
    }

    #[test]
    fn persisted_form() {
        let td = TypeDescriptor::nullable(DataType::Varchar(128));
        let mut bytes = vec![];
        td.write_to(&mut bytes).unwrap();

        assert_eq!(bytes.len(), 5);
        assert_eq!(TypeDescriptor::read_from(&mut Cursor::new(bytes)).unwrap(), td);
        assert!(TypeDescriptor::read_from(&mut Cursor::new(vec![0u8, 0])).is_err());
    }

    #[test]
    fn nullability() {
        let td = TypeDescriptor::not_null(DataType::Int);
        assert!(!td.accepts(&Value::Null));
        assert!(td.accepts(&Value::Int(1)));
    }
}
