pub mod storage;
mod type_descriptor;
pub mod types;
mod value;

pub use {
    type_descriptor::TypeDescriptor,
    types::{DataType, SqlType},
    uuid::Uuid,
    value::Value,
};

pub type Row = Vec<Value>;
