pub mod codegen;
pub mod json;
