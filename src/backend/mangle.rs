// src/backend/mangle.rs
//! 宿主语言没有重载，按参数类型给函数名加后缀：`add(Tensor, Tensor, Scalar)` -> `add_tts`

use crate::error::CodegenError;
use crate::middle::signature::Signature;
use crate::backend::typemap::TypeTable;

/// 宿主函数名：`<name>_<codes>`；零参数时为 `<name>_`。显式指针参数的短码前加 `p`
pub fn mangle_fn(sig: &Signature, table: &TypeTable) -> Result<String, CodegenError> {
    let mut codes = String::new();
    for (_, ty) in sig.explicit_params() {
        if ty.is_ptr() {
            codes.push('p');
        }
        codes.push_str(table.resolve(ty, &sig.name)?.code);
    }
    Ok(format!("{}_{}", host_ident(&sig.name), codes))
}

/// 宿主参数名：统一加 `_` 前缀，避开关键字与大写开头
pub fn mangle_param(name: &str) -> String {
    format!("_{}", host_ident(name))
}

/// 仅保留字母数字与下划线；首字符为大写或数字时前置 '_'
fn host_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    match s.chars().next() {
        Some(c0) if c0.is_ascii_lowercase() || c0 == '_' => {}
        _ => out.push('_'),
    }
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}
