// src/error.rs
//! 需要被调用方区分处理的错误；其余错误走 anyhow。

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// 规格文件无法解码；具体原因已写入 DiagSink
    #[error("failed to decode `{path}`: {errors} error(s)")]
    Decode { path: String, errors: usize },

    /// 原生类型不在类型表中；需要先补表才能生成
    #[error("no host mapping for native type `{ty}` (used by `{function}`); add it to the type table")]
    UnmappedType { ty: String, function: String },
}
