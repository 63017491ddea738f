pub mod dsa;
mod macros;
