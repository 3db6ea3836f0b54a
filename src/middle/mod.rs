// src/middle/mod.rs
// 声明 -> 签名的变换：类型归类、默认参数展开、去重、分类

pub mod category;
pub mod dedup;
pub mod overload;
pub mod signature;
pub mod ty;
