// src/config.rs
//! 生成器配置：规格文件同目录下可选的 `Codegen.toml`。
//!
//! ```toml
//! [module]
//! root = "Torch.Internal"   # 宿主模块前缀，输出路径由它推出
//! type_module = "Type"      # 共享类型表所在模块
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CONFIG_FILE: &str = "Codegen.toml";

#[derive(Debug, Default, Deserialize)]
struct CodegenToml {
    #[serde(default)]
    module: ModuleTable,
}

#[derive(Debug, Default, Deserialize)]
struct ModuleTable {
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    type_module: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenConfig {
    /// 已规整的模块段，如 ["Torch", "Internal"]
    pub module_root: Vec<String>,
    pub type_module: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            module_root: vec!["Torch".to_string(), "Internal".to_string()],
            type_module: "Type".to_string(),
        }
    }
}

impl CodegenConfig {
    /// 根模块下的完整模块名：`Torch.Internal.<parts...>`
    pub fn module(&self, parts: &[&str]) -> String {
        let mut segs: Vec<&str> = self.module_root.iter().map(String::as_str).collect();
        segs.extend_from_slice(parts);
        segs.join(".")
    }

    pub fn type_module_name(&self) -> String {
        self.module(&[self.type_module.as_str()])
    }

    /// 根模块对应的相对目录：`Torch/Internal`
    pub fn root_dir(&self) -> PathBuf {
        self.module_root.iter().collect()
    }
}

/// 在规格文件所在目录查找配置
pub fn load_for_spec(spec: &Path) -> Result<CodegenConfig> {
    let dir = spec.parent().unwrap_or_else(|| Path::new("."));
    load_from_dir(dir)
}

/// 没有配置文件 -> 默认；解析失败 -> 警告并用默认；其他 I/O 错误向上传
pub fn load_from_dir(dir: &Path) -> Result<CodegenConfig> {
    let path = dir.join(CONFIG_FILE);
    let src = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CodegenConfig::default()),
        Err(e) => return Err(e).with_context(|| format!("read_to_string({}) failed", path.display())),
    };
    match toml::from_str::<CodegenToml>(&src) {
        Ok(cfg) => Ok(from_toml(cfg)),
        Err(e) => {
            warn!("parse `{}` as TOML failed, using defaults: {}", path.display(), e.message());
            Ok(CodegenConfig::default())
        }
    }
}

fn from_toml(cfg: CodegenToml) -> CodegenConfig {
    let mut out = CodegenConfig::default();
    if let Some(root) = cfg.module.root {
        let segs: Vec<String> = root
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(sanitize_module_segment)
            .collect();
        if !segs.is_empty() {
            out.module_root = segs;
        }
    }
    if let Some(tm) = cfg.module.type_module {
        if !tm.trim().is_empty() {
            out.type_module = sanitize_module_segment(tm.trim());
        }
    }
    out
}

/// 宿主模块段：仅保留字母数字与下划线；首字母大写，非字母开头则前置 'M'
fn sanitize_module_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    let mut chars = s.chars();
    if let Some(c0) = chars.next() {
        if c0.is_ascii_alphabetic() {
            out.push(c0.to_ascii_uppercase());
        } else {
            out.push('M');
            if c0.is_ascii_alphanumeric() || c0 == '_' {
                out.push(c0);
            }
        }
    } else {
        out.push('M');
    }
    for ch in chars {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from_dir(dir.path()).unwrap();
        assert_eq!(cfg, CodegenConfig::default());
        assert_eq!(cfg.type_module_name(), "Torch.Internal.Type");
        assert_eq!(cfg.root_dir(), PathBuf::from("Torch").join("Internal"));
    }

    #[test]
    fn reads_module_table() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[module]\nroot = \"LibTorch.FFI\"\ntype_module = \"types\"\n",
        )
        .unwrap();
        let cfg = load_from_dir(dir.path()).unwrap();
        assert_eq!(cfg.module(&["Unmanaged", "Native"]), "LibTorch.FFI.Unmanaged.Native");
        assert_eq!(cfg.type_module_name(), "LibTorch.FFI.Types");
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[module\n").unwrap();
        assert_eq!(load_from_dir(dir.path()).unwrap(), CodegenConfig::default());
    }

    #[test]
    fn sanitizes_segments() {
        assert_eq!(sanitize_module_segment("torch"), "Torch");
        assert_eq!(sanitize_module_segment("9lives"), "M9lives");
        assert_eq!(sanitize_module_segment("a-b"), "A_b");
    }
}
