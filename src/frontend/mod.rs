// src/frontend/mod.rs
// 读入声明规格：解码、类型串解析、位置信息

pub mod decl;
pub mod loader;
pub mod span;
pub mod ty_parser;
