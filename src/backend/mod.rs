// src/backend/mod.rs
// 签名 -> 宿主绑定文本：类型表、名字改编、渲染

pub mod mangle;
pub mod render;
pub mod typemap;
