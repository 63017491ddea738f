#[macro_export]
macro_rules! pub_fields_struct {
    {
        $(
            $(#[$($attr:tt)*])*
            struct $name:ident {
                $(
                    $(#[$($field_attr:tt)*])*
                    $field:ident: $t:ty,
                )*
            }
        )*
    } => {
        $(
            $(#[$($attr)*])*
            pub struct $name {
                $(
                    $(#[$($field_attr)*])*
                    pub $field: $t,
                )*
            }
        )*
    }
}

/// Declares a fieldless enum persisted as a single character, with
/// `as_char` and a fallible `from_char`.
#[macro_export]
macro_rules! char_enum {
    {
        $(
            $(#[$($attr:tt)*])*
            enum $name:ident {
                $(
                    $(#[$($variant_attr:tt)*])*
                    $variant:ident = $ch:literal,
                )*
            }
        )*
    } => {
        $(
            $(#[$($attr)*])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum $name {
                $(
                    $(#[$($variant_attr)*])*
                    $variant,
                )*
            }

            impl $name {
                pub const fn as_char(&self) -> char {
                    match self {
                        $(Self::$variant => $ch,)*
                    }
                }

                pub fn from_char(ch: char) -> Option<Self> {
                    match ch {
                        $($ch => Some(Self::$variant),)*
                        _ => None,
                    }
                }
            }
        )*
    }
}
