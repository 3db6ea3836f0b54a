// src/lib.rs
//! 从 ATen 函数声明规格生成宿主语言（Haskell inline-c-cpp）绑定模块。
//!
//! 流水线：`frontend::loader` 解码 -> `middle` 展开默认参数、去重、分类
//! -> `backend::render` 渲染 -> `driver` 写文件。

pub mod backend;
pub mod cli;
pub mod config;
pub mod diag;
pub mod driver;
pub mod error;
pub mod frontend;
pub mod middle;
pub mod utils;
