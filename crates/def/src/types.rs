use {
    crate::Value,
    snafu::{prelude::*, Backtrace},
    std::fmt::{self, Display},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("invalid type id {}", ty))]
    InvalidType { ty: u16, backtrace: Backtrace },

    #[snafu(display("invalid type length {} for {}", len, ty))]
    InvalidLength {
        ty: SqlType,
        len: u16,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

macro_rules! define_types {
    ($($var:ident = $id:literal $(($ty:ty))?,)*) => {
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
        pub enum DataType {
            $($var$(($ty))?,)*
        }

        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
        #[repr(u16)]
        pub enum SqlType {
            $($var = $id,)*
        }

        impl TryFrom<u16> for SqlType {
            type Error = Error;

            fn try_from(ty: u16) -> Result<SqlType> {
                match ty {
                    $($id => Ok(SqlType::$var),)*
                    _ => InvalidTypeSnafu { ty }.fail(),
                }
            }
        }
    };
}

define_types! {
    Boolean = 1,

    // Numeric types
    SmallInt = 2,
    Int = 3,
    BigInt = 4,
    Double = 5,

    // String types
    Char = 6 (u16),
    Varchar = 7 (u16),
    LongVarchar = 8,

    // Binary types
    Uuid = 9,
    Varbinary = 10 (u16),
    Blob = 11,
}

impl DataType {
    pub const fn value_repr(&self) -> (SqlType, u16) {
        match self {
            Self::Boolean => (SqlType::Boolean, 1),

            Self::SmallInt => (SqlType::SmallInt, 2),
            Self::Int => (SqlType::Int, 4),
            Self::BigInt => (SqlType::BigInt, 8),
            Self::Double => (SqlType::Double, 8),

            Self::Char(len) => (SqlType::Char, *len),
            Self::Varchar(len) => (SqlType::Varchar, *len),
            Self::LongVarchar => (SqlType::LongVarchar, 0),

            Self::Uuid => (SqlType::Uuid, 16),
            Self::Varbinary(len) => (SqlType::Varbinary, *len),
            Self::Blob => (SqlType::Blob, 0),
        }
    }

    pub fn new(ty: SqlType, len: u16) -> Result<Self> {
        Ok(match ty {
            SqlType::Boolean => Self::Boolean,
            SqlType::SmallInt => Self::SmallInt,
            SqlType::Int => Self::Int,
            SqlType::BigInt => Self::BigInt,
            SqlType::Double => Self::Double,
            SqlType::Char if len > 0 => Self::Char(len),
            SqlType::Varchar if len > 0 => Self::Varchar(len),
            SqlType::LongVarchar => Self::LongVarchar,
            SqlType::Uuid => Self::Uuid,
            SqlType::Varbinary if len > 0 => Self::Varbinary(len),
            SqlType::Blob => Self::Blob,
            ty => return InvalidLengthSnafu { ty, len }.fail(),
        })
    }

    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::SmallInt | Self::Int | Self::BigInt)
    }

    /// Whether `value` can be stored in a column of this type. NULL is
    /// accepted here; nullability is checked by the type descriptor.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Boolean, Value::Boolean(_)) => true,
            (Self::SmallInt, Value::SmallInt(_)) => true,
            (Self::Int, Value::Int(_)) => true,
            (Self::BigInt, Value::BigInt(_)) => true,
            (Self::Double, Value::Double(_)) => true,
            (Self::Char(len) | Self::Varchar(len), Value::String(s)) => {
                s.chars().count() <= *len as usize
            }
            (Self::LongVarchar, Value::String(_)) => true,
            (Self::Uuid, Value::Uuid(_)) => true,
            (Self::Varbinary(len), Value::Bytes(b)) => b.len() <= *len as usize,
            (Self::Blob, Value::Bytes(_)) => true,
            _ => false,
        }
    }
}

impl SqlType {
    pub const fn is_variable_length(&self) -> bool {
        matches!(
            self,
            Self::Char | Self::Varchar | Self::LongVarchar | Self::Varbinary | Self::Blob
        )
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Boolean => "BOOLEAN",
                Self::SmallInt => "SMALLINT",
                Self::Int => "INTEGER",
                Self::BigInt => "BIGINT",
                Self::Double => "DOUBLE",
                Self::Char => "CHAR",
                Self::Varchar => "VARCHAR",
                Self::LongVarchar => "LONG VARCHAR",
                Self::Uuid => "CHAR(36)",
                Self::Varbinary => "VARCHAR FOR BIT DATA",
                Self::Blob => "BLOB",
            }
        )
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(len) => write!(f, "CHAR({})", len),
            Self::Varchar(len) => write!(f, "VARCHAR({})", len),
            Self::Varbinary(len) => write!(f, "VARCHAR ({}) FOR BIT DATA", len),
            other => write!(f, "{}", other.value_repr().0),
        }
    }
}
