// src/driver.rs
//! 把各阶段串起来：每个分类收集签名，再按 Unmanaged / Managed 各写一个模块，
//! 外加共享的类型模块。输出顺序完全由输入顺序决定，重复运行结果逐字节一致。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::backend::render::{render_module, render_type_module, ModuleSpec, Ownership};
use crate::backend::typemap::TypeTable;
use crate::config::CodegenConfig;
use crate::frontend::decl::Declaration;
use crate::middle::category::Category;
use crate::middle::dedup::dedup_signatures;
use crate::middle::overload::expand_defaults;
use crate::middle::signature::{parse_signature, Signature};

/// 一次生成写出的文件
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// (路径, 函数个数)；类型模块的函数个数为 0
    pub written: Vec<(PathBuf, usize)>,
    /// 因宿主名冲突跳过的签名总数
    pub skipped: usize,
}

impl GenerateReport {
    pub fn total_stanzas(&self) -> usize {
        self.written.iter().map(|(_, n)| n).sum()
    }
}

/// 分类过滤 -> 默认参数展开 -> 签名 -> 去重
pub fn collect_signatures(decls: &[Declaration], category: Category) -> Vec<Signature> {
    let sigs: Vec<Signature> = decls
        .iter()
        .filter(|d| category.admits(d))
        .flat_map(expand_defaults)
        .map(|d| parse_signature(&d))
        .collect();
    dedup_signatures(sigs)
}

/// 生成全部文件到 `out_dir`；遇到不在类型表里的类型立即失败（已写的文件不回滚）
pub fn generate(out_dir: &Path, decls: &[Declaration], config: &CodegenConfig) -> Result<GenerateReport> {
    let table = TypeTable::global();
    let root = out_dir.join(config.root_dir());
    let mut report = GenerateReport::default();

    let type_path = root.join(format!("{}.hs", config.type_module));
    let type_text = render_type_module(config, table)?;
    write_file(&type_path, &type_text)?;
    report.written.push((type_path, 0));

    for category in Category::ALL {
        let sigs = collect_signatures(decls, category);
        info!(category = ?category, signatures = sigs.len(), "collected signatures");

        for ownership in Ownership::ALL {
            let spec = ModuleSpec { config, category, ownership };
            let module = render_module(&spec, &sigs, table)
                .with_context(|| format!("render `{}` failed", spec.module_name()))?;
            let path = root
                .join(ownership.dir())
                .join(format!("{}.hs", category.module_name()));
            write_file(&path, &module.text)?;
            report.written.push((path, module.stanzas));
            // 两种所有权看到同一组签名，只计一次
            if ownership == Ownership::Unmanaged {
                report.skipped += module.skipped;
            }
        }
    }
    Ok(report)
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create_dir_all({})", dir.display()))?;
    }
    fs::write(path, text).with_context(|| format!("write `{}` failed", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::decl::testutil::decl;
    use crate::frontend::decl::{DefaultValue, Mode};

    fn add_decl() -> Declaration {
        decl(
            "add",
            Mode::Native,
            &["Type", "namespace"],
            &[
                ("self", "const Tensor &", None),
                ("other", "const Tensor &", None),
                ("alpha", "Scalar", Some(DefaultValue::Int(1))),
            ],
            &["Tensor"],
        )
    }

    #[test]
    fn collects_expanded_overloads_in_order() {
        let sigs = collect_signatures(&[add_decl()], Category::Native);
        let names: Vec<String> = sigs.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            [
                "add(at::Tensor self, at::Tensor other, at::Scalar alpha) -> at::Tensor",
                "add(at::Tensor self, at::Tensor other) -> at::Tensor",
            ]
        );
        assert!(collect_signatures(&[add_decl()], Category::Legacy).is_empty());
    }

    #[test]
    fn duplicate_declarations_collapse() {
        let sigs = collect_signatures(&[add_decl(), add_decl()], Category::Native);
        assert_eq!(sigs.len(), 2);
    }

    #[test]
    fn writes_every_cell() {
        let dir = tempfile::tempdir().unwrap();
        let report = generate(dir.path(), &[add_decl()], &CodegenConfig::default()).unwrap();
        // 类型模块 + 4 分类 × 2 所有权
        assert_eq!(report.written.len(), 1 + Category::ALL.len() * 2);
        assert_eq!(report.total_stanzas(), 4);
        for (path, _) in &report.written {
            assert!(path.is_file(), "{}", path.display());
        }
    }
}
