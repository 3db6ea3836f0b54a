// src/frontend/loader.rs
//! 读取规格文件 -> serde 解码 -> 逐个解析类型串。
//!
//! 所有解码期错误都写入 DiagSink（带 span 的交给 ariadne 渲染），
//! 只要有一个 error，整个加载即失败，调用方不会写出任何文件。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::diag::{DiagSink, SourceMap, Span};
use crate::error::CodegenError;
use crate::frontend::decl::{Argument, DeclFile, Declaration, RawDeclaration};
use crate::frontend::span::FileId;
use crate::frontend::ty_parser::parse_native_ty;

/// 规格文件格式（按扩展名判定，默认 TOML）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecFormat {
    Toml,
    Json,
}

impl SpecFormat {
    pub fn from_path(path: &Path) -> SpecFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SpecFormat::Json,
            _ => SpecFormat::Toml,
        }
    }
}

/// 从磁盘加载：源文件登记进 SourceMap，诊断写入 `diags`
pub fn load_declarations(path: &Path, sm: &mut SourceMap, diags: &mut DiagSink) -> Result<Vec<Declaration>> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("read_to_string({}) failed", path.display()))?;
    let name = path.display().to_string();
    let fid = sm.add_file(name.clone(), src.clone());
    decode_declarations(&src, SpecFormat::from_path(path), fid, &name, diags)
}

/// 从内存中的文本解码
pub fn decode_declarations(
    src: &str,
    format: SpecFormat,
    fid: FileId,
    file_name: &str,
    diags: &mut DiagSink,
) -> Result<Vec<Declaration>> {
    let raw = match format {
        SpecFormat::Toml => match toml::from_str::<DeclFile>(src) {
            Ok(f) => f.declarations,
            Err(e) => {
                let span = e.span().map(|r| Span::new(fid, r));
                diags.error("DE0001", file_name, span, e.message().to_string());
                return Err(decode_failed(file_name, diags));
            }
        },
        SpecFormat::Json => match serde_json::from_str::<Vec<RawDeclaration>>(src) {
            Ok(v) => v,
            Err(e) => {
                let span = line_col_offset(src, e.line(), e.column())
                    .map(|off| Span::new(fid, off..off + 1));
                diags.error("DE0002", file_name, span, e.to_string());
                return Err(decode_failed(file_name, diags));
            }
        },
    };

    let mut out = Vec::with_capacity(raw.len());
    for r in raw {
        if let Some(d) = resolve_types(r, file_name, diags) {
            out.push(d);
        }
    }
    if diags.has_errors() {
        return Err(decode_failed(file_name, diags));
    }

    for d in &out {
        if d.has_misplaced_default() {
            diags.warn(
                "DW0001",
                file_name,
                None,
                format!("`{}`: default value before a required argument is ignored", d.qualified_name()),
            );
        }
    }
    debug!(file = file_name, declarations = out.len(), "decoded declarations");
    Ok(out)
}

/// 把所有类型串交给 pest；失败的每一处都记一条 DE0003
fn resolve_types(r: RawDeclaration, file_name: &str, diags: &mut DiagSink) -> Option<Declaration> {
    let mut ok = true;
    let mut parse = |what: &str, ty: &str| match parse_native_ty(ty) {
        Ok(t) => Some(t),
        Err(e) => {
            ok = false;
            diags.error(
                "DE0003",
                file_name,
                None,
                format!("`{}`: cannot parse type `{}` of {}: {}", r.name, ty, what, e),
            );
            None
        }
    };

    let arguments: Vec<Argument> = r
        .arguments
        .iter()
        .filter_map(|a| {
            let ty = parse(&format!("argument `{}`", a.name), &a.ty)?;
            Some(Argument { name: a.name.clone(), ty, default: a.default.clone() })
        })
        .collect();
    let returns: Vec<_> = r
        .returns
        .iter()
        .filter_map(|ret| parse("return value", &ret.ty))
        .collect();

    if !ok {
        return None;
    }
    Some(Declaration {
        name: r.name,
        overload_name: r.overload_name,
        arguments,
        returns,
        mode: r.mode,
        method_of: r.method_of,
        is_factory_method: r.is_factory_method,
    })
}

fn decode_failed(file_name: &str, diags: &DiagSink) -> anyhow::Error {
    CodegenError::Decode { path: file_name.to_string(), errors: diags.error_count() }.into()
}

/// serde_json 的行列号（1 起）换算成字节偏移
fn line_col_offset(src: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut off = 0usize;
    for (i, l) in src.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            return Some((off + column.saturating_sub(1)).min(src.len()));
        }
        off += l.len();
    }
    Some(src.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::decl::{DefaultValue, Mode};
    use crate::frontend::ty_parser::TyExpr;

    const ADD_TOML: &str = r#"
[[declarations]]
name = "add"
mode = "native"
method_of = ["Type", "Tensor", "namespace"]
returns = [{ name = "result", type = "Tensor" }]
arguments = [
  { name = "self", type = "const Tensor &" },
  { name = "other", type = "const Tensor &" },
  { name = "alpha", type = "Scalar", default = 1 },
]
"#;

    fn decode(src: &str, format: SpecFormat) -> (Result<Vec<Declaration>>, DiagSink) {
        let mut diags = DiagSink::new();
        let r = decode_declarations(src, format, FileId(0), "spec", &mut diags);
        (r, diags)
    }

    #[test]
    fn decodes_toml() {
        let (r, diags) = decode(ADD_TOML, SpecFormat::Toml);
        let decls = r.unwrap();
        assert!(diags.is_empty());
        assert_eq!(decls.len(), 1);
        let d = &decls[0];
        assert_eq!(d.name, "add");
        assert_eq!(d.mode, Mode::Native);
        assert_eq!(d.arguments[0].ty, TyExpr::Ref(Box::new(TyExpr::Name("Tensor".into()))));
        assert_eq!(d.arguments[2].default, Some(DefaultValue::Int(1)));
        assert_eq!(d.returns, vec![TyExpr::Name("Tensor".into())]);
    }

    #[test]
    fn decodes_json() {
        let src = r#"[{"name": "ones", "mode": "native", "method_of": ["namespace"],
            "is_factory_method": true,
            "arguments": [{"name": "size", "type": "IntArrayRef"},
                          {"name": "options", "type": "const TensorOptions &", "default": "{}"}],
            "returns": [{"type": "Tensor"}]}]"#;
        let (r, _) = decode(src, SpecFormat::Json);
        let decls = r.unwrap();
        assert!(decls[0].is_factory());
        assert_eq!(decls[0].trailing_defaults(), 1);
    }

    #[test]
    fn malformed_toml_reports_span() {
        let (r, diags) = decode("[[declarations]]\nname = \n", SpecFormat::Toml);
        let err = r.unwrap_err();
        assert!(matches!(err.downcast_ref::<CodegenError>(), Some(CodegenError::Decode { .. })));
        let d = diags.iter().next().unwrap();
        assert_eq!(d.code, "DE0001");
        assert!(d.span.is_some());
    }

    #[test]
    fn missing_mode_is_decode_failure() {
        let (r, diags) = decode("[[declarations]]\nname = \"f\"\n", SpecFormat::Toml);
        assert!(r.is_err());
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn malformed_json_reports_position() {
        let (r, diags) = decode("[\n  {\"name\": }\n]", SpecFormat::Json);
        assert!(r.is_err());
        let d = diags.iter().next().unwrap();
        assert_eq!(d.code, "DE0002");
        assert!(d.span.unwrap().start > 2);
    }

    #[test]
    fn every_bad_type_string_is_reported() {
        let src = r#"
[[declarations]]
name = "f"
mode = "native"
arguments = [{ name = "a", type = "Tensor &&(" }]
returns = [{ type = "std::tuple<Tensor" }]
"#;
        let (r, diags) = decode(src, SpecFormat::Toml);
        assert!(r.is_err());
        assert_eq!(diags.error_count(), 2);
        assert!(diags.iter().all(|d| d.code == "DE0003"));
    }

    #[test]
    fn misplaced_default_is_a_warning() {
        let src = r#"
[[declarations]]
name = "f"
mode = "native"
overload_name = "int"
arguments = [{ name = "a", type = "int64_t", default = 0 }, { name = "b", type = "Tensor" }]
"#;
        let (r, diags) = decode(src, SpecFormat::Toml);
        assert_eq!(r.unwrap().len(), 1);
        assert!(!diags.has_errors());
        let w = diags.iter().next().unwrap();
        assert_eq!(w.code, "DW0001");
        assert!(w.message.starts_with("`f.int`"), "{}", w.message);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SpecFormat::from_path(Path::new("a/Declarations.json")), SpecFormat::Json);
        assert_eq!(SpecFormat::from_path(Path::new("a/Declarations.toml")), SpecFormat::Toml);
        assert_eq!(SpecFormat::from_path(Path::new("decls")), SpecFormat::Toml);
    }

    #[test]
    fn json_offsets() {
        assert_eq!(line_col_offset("ab\ncd", 2, 2), Some(4));
        assert_eq!(line_col_offset("ab", 0, 0), None);
    }
}
