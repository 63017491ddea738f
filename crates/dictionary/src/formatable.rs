//! Binary payloads stored in BLOB columns of the catalogs.

use {
    crate::{
        descriptor::{
            AliasInfo, ColumnDefault, ParameterMode, ReferencedColumns, RoutineInfo,
            RoutineParameter, SqlAccess,
        },
        index_row::IndexRowGenerator,
    },
    byteorder::{ReadBytesExt, WriteBytesExt, LE},
    common::dsa::BitSet,
    def::{TypeDescriptor, Uuid, Value},
    std::io::{self, Cursor, Read, Write},
};

pub(crate) trait Formatable: Sized {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()>;

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self>;

    fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut bytes = vec![];
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        Self::read_from(&mut Cursor::new(bytes))
    }
}

fn invalid(details: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, details.into())
}

fn write_str<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    w.write_u32::<LE>(s.len() as u32)?;
    w.write_all(s.as_bytes())
}

fn read_str<R: Read>(r: &mut R) -> io::Result<String> {
    let len = r.read_u32::<LE>()? as usize;
    let mut buf = vec![0; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| invalid(e.to_string()))
}

fn write_bool<W: Write>(w: &mut W, b: bool) -> io::Result<()> {
    w.write_u8(b as u8)
}

fn read_bool<R: Read>(r: &mut R) -> io::Result<bool> {
    Ok(r.read_u8()? != 0)
}

fn write_char<W: Write>(w: &mut W, ch: char) -> io::Result<()> {
    w.write_u32::<LE>(ch as u32)
}

fn read_char<R: Read>(r: &mut R) -> io::Result<char> {
    let code = r.read_u32::<LE>()?;
    char::from_u32(code).ok_or_else(|| invalid(format!("invalid character {}", code)))
}

fn write_positions<W: Write>(w: &mut W, positions: &[u32]) -> io::Result<()> {
    w.write_u32::<LE>(positions.len() as u32)?;
    positions.iter().try_for_each(|p| w.write_u32::<LE>(*p))
}

fn read_positions<R: Read>(r: &mut R) -> io::Result<Vec<u32>> {
    let len = r.read_u32::<LE>()?;
    (0..len).map(|_| r.read_u32::<LE>()).collect()
}

impl Formatable for TypeDescriptor {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        TypeDescriptor::write_to(self, w)
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        TypeDescriptor::read_from(r).map_err(|e| invalid(e.to_string()))
    }
}

impl Formatable for Option<TypeDescriptor> {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_bool(w, self.is_some())?;
        match self {
            Some(ty) => Formatable::write_to(ty, w),
            None => Ok(()),
        }
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(match read_bool(r)? {
            true => Some(<TypeDescriptor as Formatable>::read_from(r)?),
            false => None,
        })
    }
}

impl Formatable for Vec<u32> {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_positions(w, self)
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        read_positions(r)
    }
}

impl Formatable for BitSet {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<LE>(self.len() as u32)?;
        w.write_all(self.as_bytes())
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let len = r.read_u32::<LE>()? as usize;
        let mut bytes = vec![0; (len + 7) / 8];
        r.read_exact(&mut bytes)?;
        Ok(BitSet::from_bytes(len, &bytes))
    }
}

impl Formatable for Value {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match self {
            Value::Null => w.write_u8(0),
            Value::Boolean(v) => {
                w.write_u8(1)?;
                write_bool(w, *v)
            }
            Value::SmallInt(v) => {
                w.write_u8(2)?;
                w.write_i16::<LE>(*v)
            }
            Value::Int(v) => {
                w.write_u8(3)?;
                w.write_i32::<LE>(*v)
            }
            Value::BigInt(v) => {
                w.write_u8(4)?;
                w.write_i64::<LE>(*v)
            }
            Value::Double(v) => {
                w.write_u8(5)?;
                w.write_f64::<LE>(*v)
            }
            Value::String(v) => {
                w.write_u8(6)?;
                write_str(w, v)
            }
            Value::Uuid(v) => {
                w.write_u8(7)?;
                w.write_all(v.as_bytes())
            }
            Value::Bytes(v) => {
                w.write_u8(8)?;
                w.write_u32::<LE>(v.len() as u32)?;
                w.write_all(v)
            }
        }
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(match r.read_u8()? {
            0 => Value::Null,
            1 => Value::Boolean(read_bool(r)?),
            2 => Value::SmallInt(r.read_i16::<LE>()?),
            3 => Value::Int(r.read_i32::<LE>()?),
            4 => Value::BigInt(r.read_i64::<LE>()?),
            5 => Value::Double(r.read_f64::<LE>()?),
            6 => Value::String(read_str(r)?),
            7 => {
                let mut bytes = [0; 16];
                r.read_exact(&mut bytes)?;
                Value::Uuid(Uuid::from_bytes(bytes))
            }
            8 => {
                let len = r.read_u32::<LE>()? as usize;
                let mut bytes = vec![0; len];
                r.read_exact(&mut bytes)?;
                Value::Bytes(bytes)
            }
            tag => return Err(invalid(format!("unknown value tag {}", tag))),
        })
    }
}

impl Formatable for ColumnDefault {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match self {
            ColumnDefault::Literal(value) => {
                w.write_u8(0)?;
                value.write_to(w)
            }
            ColumnDefault::Expression(text) => {
                w.write_u8(1)?;
                write_str(w, text)
            }
        }
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(match r.read_u8()? {
            0 => ColumnDefault::Literal(Value::read_from(r)?),
            1 => ColumnDefault::Expression(read_str(r)?),
            tag => return Err(invalid(format!("unknown default tag {}", tag))),
        })
    }
}

impl Formatable for IndexRowGenerator {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_str(w, &self.index_type)?;
        write_bool(w, self.unique)?;
        write_positions(w, &self.base_columns)?;
        self.ascending.iter().try_for_each(|asc| write_bool(w, *asc))
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let index_type = read_str(r)?;
        let unique = read_bool(r)?;
        let base_columns = read_positions(r)?;
        let ascending = base_columns
            .iter()
            .map(|_| read_bool(r))
            .collect::<io::Result<_>>()?;

        Ok(Self {
            index_type,
            unique,
            base_columns,
            ascending,
        })
    }
}

impl Formatable for ReferencedColumns {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_positions(w, &self.trigger_columns)?;
        write_positions(w, &self.action_columns)
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            trigger_columns: read_positions(r)?,
            action_columns: read_positions(r)?,
        })
    }
}

impl Formatable for RoutineInfo {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_str(w, &self.method_name)?;
        w.write_u32::<LE>(self.parameters.len() as u32)?;
        for param in &self.parameters {
            write_str(w, &param.name)?;
            Formatable::write_to(&param.ty, w)?;
            write_char(w, param.mode.as_char())?;
        }
        self.return_type.write_to(w)?;
        write_char(w, self.sql_access.as_char())?;
        write_bool(w, self.deterministic)?;
        write_bool(w, self.called_on_null_input)?;
        w.write_u16::<LE>(self.dynamic_result_sets)
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let method_name = read_str(r)?;
        let count = r.read_u32::<LE>()?;
        let parameters = (0..count)
            .map(|_| -> io::Result<RoutineParameter> {
                let name = read_str(r)?;
                let ty = <TypeDescriptor as Formatable>::read_from(r)?;
                let mode = read_char(r)?;
                let mode = ParameterMode::from_char(mode)
                    .ok_or_else(|| invalid(format!("unknown parameter mode {}", mode)))?;
                Ok(RoutineParameter { name, ty, mode })
            })
            .collect::<io::Result<_>>()?;
        let return_type = Option::<TypeDescriptor>::read_from(r)?;
        let access = read_char(r)?;
        let sql_access = SqlAccess::from_char(access)
            .ok_or_else(|| invalid(format!("unknown SQL access {}", access)))?;

        Ok(Self {
            method_name,
            parameters,
            return_type,
            sql_access,
            deterministic: read_bool(r)?,
            called_on_null_input: read_bool(r)?,
            dynamic_result_sets: r.read_u16::<LE>()?,
        })
    }
}

impl Formatable for AliasInfo {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match self {
            AliasInfo::Routine(info) => {
                w.write_u8(0)?;
                info.write_to(w)
            }
            AliasInfo::Synonym {
                schema_name,
                table_name,
            } => {
                w.write_u8(1)?;
                write_str(w, schema_name)?;
                write_str(w, table_name)
            }
            AliasInfo::UserType { external_name } => {
                w.write_u8(2)?;
                write_str(w, external_name)
            }
        }
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(match r.read_u8()? {
            0 => AliasInfo::Routine(RoutineInfo::read_from(r)?),
            1 => AliasInfo::Synonym {
                schema_name: read_str(r)?,
                table_name: read_str(r)?,
            },
            2 => AliasInfo::UserType {
                external_name: read_str(r)?,
            },
            tag => return Err(invalid(format!("unknown alias info tag {}", tag))),
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, def::DataType};

    #[test]
    fn routine_info_payload() {
        let info = AliasInfo::Routine(RoutineInfo {
            method_name: "org.example.Util.compress".into(),
            parameters: vec![
                RoutineParameter::input(
                    "SCHEMANAME",
                    TypeDescriptor::not_null(DataType::Varchar(128)),
                ),
                RoutineParameter {
                    name: "RESULT".into(),
                    ty: TypeDescriptor::nullable(DataType::Int),
                    mode: ParameterMode::Out,
                },
            ],
            return_type: None,
            sql_access: SqlAccess::ModifiesSql,
            deterministic: false,
            called_on_null_input: true,
            dynamic_result_sets: 1,
        });

        let bytes = info.to_bytes().unwrap();
        assert_eq!(AliasInfo::from_bytes(&bytes).unwrap(), info);
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let generator = IndexRowGenerator::btree(true, &[2, 1]);
        let bytes = generator.to_bytes().unwrap();

        assert!(IndexRowGenerator::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        assert_eq!(IndexRowGenerator::from_bytes(&bytes).unwrap(), generator);
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert!(ColumnDefault::from_bytes(&[9]).is_err());
        assert!(Value::from_bytes(&[42]).is_err());
    }
}
