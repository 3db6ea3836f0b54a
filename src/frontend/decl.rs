// src/frontend/decl.rs
//! 声明记录：规格文件里描述一个原生函数的条目。
//!
//! `Raw*` 是 serde 直接解码出来的形状（类型仍是字符串）；
//! `Declaration` 是类型串经 pest 解析后的版本，供后续 pass 使用。

use serde::Deserialize;
use std::fmt;

use crate::frontend::ty_parser::TyExpr;

/// 分派模式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum Mode {
    #[serde(rename = "TH")]
    Th,
    #[serde(rename = "THC")]
    Thc,
    #[serde(rename = "NN")]
    Nn,
    #[serde(rename = "native")]
    Native,
}

/// 默认值（规格文件里可以是布尔、整数、浮点或任意文本）
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Bool(b) => write!(f, "{b}"),
            DefaultValue::Int(i) => write!(f, "{i}"),
            DefaultValue::Float(x) => write!(f, "{x}"),
            DefaultValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub default: Option<DefaultValue>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawReturn {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawDeclaration {
    pub name: String,
    /// 只出现在诊断里
    #[serde(default)]
    pub overload_name: Option<String>,
    #[serde(default)]
    pub arguments: Vec<RawArgument>,
    #[serde(default)]
    pub returns: Vec<RawReturn>,
    pub mode: Mode,
    #[serde(default)]
    pub method_of: Vec<String>,
    #[serde(default)]
    pub is_factory_method: Option<bool>,
}

/// TOML 规格文件：`[[declarations]]` 数组表
#[derive(Debug, Default, Deserialize)]
pub struct DeclFile {
    #[serde(default)]
    pub declarations: Vec<RawDeclaration>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: String,
    pub ty: TyExpr,
    pub default: Option<DefaultValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub overload_name: Option<String>,
    pub arguments: Vec<Argument>,
    pub returns: Vec<TyExpr>,
    pub mode: Mode,
    pub method_of: Vec<String>,
    pub is_factory_method: Option<bool>,
}

impl Declaration {
    /// 末尾连续带默认值的参数个数（从后往前扫，遇到无默认值即停）
    pub fn trailing_defaults(&self) -> usize {
        self.arguments
            .iter()
            .rev()
            .take_while(|a| a.default.is_some())
            .count()
    }

    /// 默认值没有构成后缀：存在某个带默认值的参数排在无默认值参数之前
    pub fn has_misplaced_default(&self) -> bool {
        let n = self.arguments.len() - self.trailing_defaults();
        self.arguments[..n].iter().any(|a| a.default.is_some())
    }

    /// 诊断里用的名字：有重载名时写成 `name.overload`
    pub fn qualified_name(&self) -> String {
        match self.overload_name.as_deref() {
            Some(o) if !o.is_empty() => format!("{}.{}", self.name, o),
            _ => self.name.clone(),
        }
    }

    #[inline]
    pub fn is_method_of(&self, tag: &str) -> bool {
        self.method_of.iter().any(|m| m == tag)
    }

    #[inline]
    pub fn is_method_of_any(&self, tags: &[&str]) -> bool {
        tags.iter().any(|t| self.is_method_of(t))
    }

    #[inline]
    pub fn is_factory(&self) -> bool {
        self.is_factory_method == Some(true)
    }

    /// 只保留前 `len` 个参数的副本
    pub fn truncated(&self, len: usize) -> Declaration {
        Declaration {
            arguments: self.arguments[..len.min(self.arguments.len())].to_vec(),
            ..self.clone()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::decl;
    use super::*;

    #[test]
    fn trailing_defaults_stop_at_first_required() {
        let d = decl(
            "f",
            Mode::Native,
            &["namespace"],
            &[
                ("a", "Tensor", Some(DefaultValue::Int(0))),
                ("b", "Tensor", None),
                ("c", "int64_t", Some(DefaultValue::Int(1))),
                ("d", "bool", Some(DefaultValue::Bool(false))),
            ],
            &["Tensor"],
        );
        assert_eq!(d.trailing_defaults(), 2);
        assert!(d.has_misplaced_default());
    }

    #[test]
    fn no_arguments() {
        let d = decl("g", Mode::Native, &[], &[], &[]);
        assert_eq!(d.trailing_defaults(), 0);
        assert!(!d.has_misplaced_default());
        assert_eq!(d.truncated(3).arguments.len(), 0);
    }

    #[test]
    fn qualified_name_uses_overload() {
        let mut d = decl("add", Mode::Native, &[], &[], &[]);
        assert_eq!(d.qualified_name(), "add");
        d.overload_name = Some("Tensor".into());
        assert_eq!(d.qualified_name(), "add.Tensor");
        d.overload_name = Some(String::new());
        assert_eq!(d.qualified_name(), "add");
    }

    #[test]
    fn default_values_decode_from_toml() {
        #[derive(Deserialize)]
        struct W { v: Vec<DefaultValue> }
        let w: W = toml::from_str(r#"v = [true, 1, 0.5, "nullptr"]"#).unwrap();
        assert_eq!(
            w.v,
            vec![
                DefaultValue::Bool(true),
                DefaultValue::Int(1),
                DefaultValue::Float(0.5),
                DefaultValue::Text("nullptr".into()),
            ]
        );
        assert_eq!(w.v[3].to_string(), "nullptr");
    }
}
