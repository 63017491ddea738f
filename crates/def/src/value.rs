use {
    core::{cmp::Ordering, mem::size_of},
    uuid::Uuid,
};

macro_rules! define_value {
    (@byte_count $ident:ident, String) => {
        $ident.as_bytes().len()
    };
    (@byte_count $ident:ident, Vec<u8>) => {
        $ident.len()
    };
    (@byte_count $ident:ident, $raw:ty) => {
        size_of::<$raw>()
    };

    ($($variant:ident($raw:ty),)*) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Value {
            Null,
            $($variant($raw),)*
        }

        impl Value {
            pub fn byte_count(&self) -> usize {
                match self {
                    Self::Null => 0,
                    $(Self::$variant(_v) => define_value!(@byte_count _v, $raw),)*
                }
            }
        }
    };
}

define_value! {
    Boolean(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Double(f64),
    String(String),
    Uuid(Uuid),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// First character of a CHAR(1)-style value.
    pub fn as_char(&self) -> Option<char> {
        self.as_str().and_then(|s| s.chars().next())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer value widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::SmallInt(v) => Some(*v as i64),
            Self::Int(v) => Some(*v as i64),
            Self::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Boolean(_) => 1,
            Self::SmallInt(_) | Self::Int(_) | Self::BigInt(_) => 2,
            Self::Double(_) => 3,
            Self::String(_) => 4,
            Self::Uuid(_) => 5,
            Self::Bytes(_) => 6,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Less,
            (_, Self::Null) => Ordering::Greater,

            (Self::Boolean(v1), Self::Boolean(v2)) => v1.cmp(v2),
            (Self::Double(v1), Self::Double(v2)) => v1.total_cmp(v2),
            (Self::String(v1), Self::String(v2)) => v1.cmp(v2),
            (Self::Uuid(v1), Self::Uuid(v2)) => v1.cmp(v2),
            (Self::Bytes(v1), Self::Bytes(v2)) => v1.cmp(v2),

            // integers of different widths compare by value
            (v1, v2) => match (v1.as_i64(), v2.as_i64()) {
                (Some(i1), Some(i2)) => i1.cmp(&i2),
                _ => v1.type_rank().cmp(&v2.type_rank()),
            },
        }
    }
}

macro_rules! value_conversions {
    ($(($raw:ty, $val:ident),)*) => {
        $(
            impl From<$raw> for Value {
                fn from(raw: $raw) -> Self {
                    Value::$val(raw)
                }
            }
        )*
    };
}

value_conversions! {
    (bool, Boolean),
    (i16, SmallInt),
    (i32, Int),
    (i64, BigInt),
    (f64, Double),
    (String, String),
    (Uuid, Uuid),
    (Vec<u8>, Bytes),
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Value::String(raw.to_string())
    }
}

impl From<char> for Value {
    fn from(raw: char) -> Self {
        Value::String(raw.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(raw: Option<T>) -> Self {
        raw.map(Into::into).unwrap_or(Value::Null)
    }
}
