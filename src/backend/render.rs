// src/backend/render.rs
//! 把签名渲染成宿主模块文本（Haskell + inline-c-cpp）。
//!
//! - Unmanaged：裸指针版，每个函数是一段 `C.throwBlock` 准引用，模块头带本模块用到的类型表；
//! - Managed：`ForeignPtr` 版，逐个转调 Unmanaged 的同名函数；
//! - 类型模块：共享的完整类型表与不透明类型声明。

use anyhow::Result;
use std::fmt::Write as _;
use tracing::{debug, warn};

use crate::backend::mangle::{mangle_fn, mangle_param};
use crate::backend::typemap::{TypeEntry, TypeTable};
use crate::config::CodegenConfig;
use crate::middle::category::Category;
use crate::middle::signature::Signature;
use crate::middle::ty::NativeTy;
use crate::utils::fast::{fast_set, FastSet};

const HEADER: &str = "-- generated by aten-ffigen; do not edit";

const COMMON_INCLUDES: &[&str] = &["<vector>", "<ATen/Tensor.h>", "<ATen/Functions.h>"];

/// 返回的原生资源由谁释放
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ownership {
    Unmanaged,
    Managed,
}

impl Ownership {
    pub const ALL: [Ownership; 2] = [Ownership::Unmanaged, Ownership::Managed];

    /// 模块路径中的一段
    pub fn dir(self) -> &'static str {
        match self {
            Ownership::Unmanaged => "Unmanaged",
            Ownership::Managed => "Managed",
        }
    }

    fn pointer(self) -> &'static str {
        match self {
            Ownership::Unmanaged => "Ptr",
            Ownership::Managed => "ForeignPtr",
        }
    }
}

/// 一个输出单元：分类 × 所有权（命名空间由分类决定）
#[derive(Clone, Copy)]
pub struct ModuleSpec<'a> {
    pub config: &'a CodegenConfig,
    pub category: Category,
    pub ownership: Ownership,
}

impl ModuleSpec<'_> {
    pub fn module_name(&self) -> String {
        self.config.module(&[self.ownership.dir(), self.category.module_name()])
    }

    fn unmanaged_module_name(&self) -> String {
        self.config.module(&[Ownership::Unmanaged.dir(), self.category.module_name()])
    }
}

#[derive(Debug)]
pub struct RenderedModule {
    pub text: String,
    /// 输出的函数个数
    pub stanzas: usize,
    /// 因宿主名冲突跳过的签名个数
    pub skipped: usize,
}

/// 查过表的参数
struct ParamIr<'s> {
    host_name: String,
    ty: &'s NativeTy,
    entry: &'static TypeEntry,
}

/// 查过表的函数
struct Stanza<'s> {
    host_name: String,
    cpp_fn: String,
    params: Vec<ParamIr<'s>>,
    ret: NativeTy,
    ret_entry: &'static TypeEntry,
}

pub fn render_module(spec: &ModuleSpec<'_>, sigs: &[Signature], table: &TypeTable) -> Result<RenderedModule> {
    let (stanzas, skipped) = lower(spec.category, sigs, table)?;
    let mut out = String::new();
    match spec.ownership {
        Ownership::Unmanaged => {
            write_unmanaged_preamble(&mut out, spec, &stanzas, table)?;
            for s in &stanzas {
                write_unmanaged_stanza(&mut out, s)?;
            }
        }
        Ownership::Managed => {
            write_managed_preamble(&mut out, spec)?;
            for s in &stanzas {
                write_managed_stanza(&mut out, s)?;
            }
        }
    }
    debug!(module = %spec.module_name(), stanzas = stanzas.len(), skipped, "rendered module");
    Ok(RenderedModule { text: out, stanzas: stanzas.len(), skipped })
}

/// 查表 + 改名；同一模块内宿主名重复的后来者跳过
fn lower<'s>(category: Category, sigs: &'s [Signature], table: &TypeTable) -> Result<(Vec<Stanza<'s>>, usize)> {
    let ns = category.namespace().prefix();
    let mut declared: FastSet<String> = fast_set();
    let mut out = Vec::with_capacity(sigs.len());
    let mut skipped = 0usize;

    for sig in sigs {
        let host_name = mangle_fn(sig, table)?;
        let params = sig
            .explicit_params()
            .map(|(name, ty)| -> Result<ParamIr<'s>> {
                Ok(ParamIr { host_name: mangle_param(name), ty, entry: table.resolve(ty, &sig.name)? })
            })
            .collect::<Result<Vec<_>>>()?;
        let ret = sig.ret.as_native();
        let ret_entry = table.resolve(&ret, &sig.name)?;

        if !declared.insert(host_name.clone()) {
            warn!(function = %host_name, signature = %sig, "host name already emitted in this module, skipping");
            skipped += 1;
            continue;
        }
        out.push(Stanza { host_name, cpp_fn: format!("{ns}{}", sig.name), params, ret, ret_entry });
    }
    Ok((out, skipped))
}

/// 宿主侧类型；指针类再包一层 Ptr / ForeignPtr
fn host_ty(ty: &NativeTy, entry: &TypeEntry, ownership: Ownership) -> String {
    if entry.kind.by_value() && !ty.is_ptr() {
        entry.host.to_string()
    } else {
        format!("{} {}", ownership.pointer(), paren(entry.host))
    }
}

fn paren(s: &str) -> String {
    if s.contains(' ') { format!("({s})") } else { s.to_string() }
}

/// `Map.fromList [...]` 字面量，`indent` 为续行缩进
fn type_table_literal(entries: &[&TypeEntry], indent: &str) -> String {
    if entries.is_empty() {
        return "Map.fromList []".to_string();
    }
    let mut s = String::from("Map.fromList");
    for (i, e) in entries.iter().enumerate() {
        let lead = if i == 0 { "[" } else { "," };
        s.push_str(&format!("\n{indent}{lead} (C.TypeName \"{}\", [t|{}|])", e.native, e.host));
    }
    s.push_str(&format!("\n{indent}]"));
    s
}

fn write_pragmas(out: &mut String) -> std::fmt::Result {
    writeln!(out, "{HEADER}")?;
    for ext in ["DataKinds", "PolyKinds", "TemplateHaskell", "QuasiQuotes", "ScopedTypeVariables", "OverloadedStrings"] {
        writeln!(out, "{{-# LANGUAGE {ext} #-}}")?;
    }
    writeln!(out)
}

fn write_unmanaged_preamble(
    out: &mut String,
    spec: &ModuleSpec<'_>,
    stanzas: &[Stanza<'_>],
    table: &TypeTable,
) -> std::fmt::Result {
    // 本模块实际用到、需要写入类型表的条目（按表序）
    let mut used: FastSet<&'static str> = fast_set();
    for s in stanzas {
        used.insert(s.ret_entry.native);
        for p in &s.params {
            used.insert(p.entry.native);
        }
    }
    let entries: Vec<&TypeEntry> = table
        .entries()
        .iter()
        .filter(|e| e.kind.emitted() && used.contains(e.native))
        .collect();

    write_pragmas(out)?;
    writeln!(out, "module {} where", spec.module_name())?;
    writeln!(out)?;
    writeln!(out, "import Foreign.C.String")?;
    writeln!(out, "import Foreign.C.Types")?;
    writeln!(out, "import Foreign")?;
    writeln!(out, "import {}", spec.config.type_module_name())?;
    writeln!(out)?;
    writeln!(out, "import qualified Language.C.Inline.Cpp as C")?;
    writeln!(out, "import qualified Language.C.Inline.Cpp.Exceptions as C")?;
    writeln!(out, "import qualified Language.C.Inline.Context as C")?;
    writeln!(out, "import qualified Language.C.Types as C")?;
    writeln!(out, "import qualified Data.Map as Map")?;
    writeln!(out)?;
    writeln!(
        out,
        "C.context $ C.cppCtx <> mempty {{ C.ctxTypesTable = {} }}",
        type_table_literal(&entries, "  ")
    )?;
    writeln!(out)?;
    for inc in COMMON_INCLUDES.iter().chain(spec.category.extra_includes()) {
        writeln!(out, "C.include \"{inc}\"")?;
    }
    writeln!(out)
}

fn write_unmanaged_stanza(out: &mut String, s: &Stanza<'_>) -> std::fmt::Result {
    let own = Ownership::Unmanaged;
    writeln!(out)?;
    writeln!(out, "{}", s.host_name)?;
    for (i, p) in s.params.iter().enumerate() {
        let lead = if i == 0 { "::" } else { "->" };
        writeln!(out, "  {lead} {}", host_ty(p.ty, p.entry, own))?;
    }
    let lead = if s.params.is_empty() { "::" } else { "->" };
    writeln!(out, "  {lead} IO {}", paren(&host_ty(&s.ret, s.ret_entry, own)))?;

    let mut head = s.host_name.clone();
    for p in &s.params {
        head.push(' ');
        head.push_str(&p.host_name);
    }
    writeln!(out, "{head} =")?;

    let args: Vec<String> = s.params.iter().map(c_arg).collect();
    let call = if args.is_empty() {
        format!("{}()", s.cpp_fn)
    } else {
        format!("{}(\n    {})", s.cpp_fn, args.join("\n  , "))
    };
    let ret_native = s.ret_entry.native;
    // 显式指针原样返回，不拷贝
    let (c_ret, stmt) = if s.ret.is_ptr() {
        (format!("{ret_native}*"), format!("return {call};"))
    } else if s.ret_entry.kind.by_value() {
        if ret_native == "void" {
            (ret_native.to_string(), format!("{call};"))
        } else {
            (ret_native.to_string(), format!("return {call};"))
        }
    } else {
        (format!("{ret_native}*"), format!("return new {ret_native}({call});"))
    };
    writeln!(out, "  [C.throwBlock| {c_ret} {{ {stmt}")?;
    writeln!(out, "  }}|]")
}

/// 准引用里的 C++ 实参：按值 `$(T x)`，显式指针 `$(T* x)`，句柄解引用 `*$(T* x)`
fn c_arg(p: &ParamIr<'_>) -> String {
    let native = p.entry.native;
    if p.ty.is_ptr() {
        format!("$({native}* {})", p.host_name)
    } else if p.entry.kind.by_value() {
        format!("$({native} {})", p.host_name)
    } else {
        format!("*$({native}* {})", p.host_name)
    }
}

fn write_managed_preamble(out: &mut String, spec: &ModuleSpec<'_>) -> std::fmt::Result {
    write_pragmas(out)?;
    writeln!(out, "module {} where", spec.module_name())?;
    writeln!(out)?;
    writeln!(out, "import Foreign.C.String")?;
    writeln!(out, "import Foreign.C.Types")?;
    writeln!(out, "import Foreign")?;
    writeln!(out, "import {}", spec.config.type_module_name())?;
    writeln!(out, "import {}", spec.config.module(&["Cast"]))?;
    writeln!(out, "import {}", spec.config.module(&["Objects"]))?;
    writeln!(out, "import qualified {} as Unmanaged", spec.unmanaged_module_name())?;
    writeln!(out)
}

fn write_managed_stanza(out: &mut String, s: &Stanza<'_>) -> std::fmt::Result {
    let own = Ownership::Managed;
    writeln!(out)?;
    writeln!(out, "{}", s.host_name)?;
    for (i, p) in s.params.iter().enumerate() {
        let lead = if i == 0 { "::" } else { "->" };
        writeln!(out, "  {lead} {}", host_ty(p.ty, p.entry, own))?;
    }
    let lead = if s.params.is_empty() { "::" } else { "->" };
    writeln!(out, "  {lead} IO {}", paren(&host_ty(&s.ret, s.ret_entry, own)))?;
    writeln!(out, "{} = cast{} Unmanaged.{}", s.host_name, s.params.len(), s.host_name)
}

/// 共享类型模块：不透明类型声明 + 完整类型表
pub fn render_type_module(config: &CodegenConfig, table: &TypeTable) -> Result<String> {
    let mut out = String::new();
    write_pragmas(&mut out)?;
    writeln!(out, "module {} where", config.type_module_name())?;
    writeln!(out)?;
    writeln!(out, "import Foreign.C.Types")?;
    writeln!(out, "import Data.Int (Int8, Int64)")?;
    writeln!(out, "import qualified Data.Map as Map")?;
    writeln!(out, "import qualified Language.C.Inline.Context as C")?;
    writeln!(out, "import qualified Language.C.Types as C")?;
    writeln!(out)?;
    writeln!(out, "data StdVector a")?;
    writeln!(out, "data StdArray a")?;
    writeln!(out, "data StdTuple a")?;
    writeln!(out)?;
    for decl in table.entries().iter().filter_map(|e| e.host_decl) {
        writeln!(out, "{decl}")?;
    }
    writeln!(out)?;

    let entries: Vec<&TypeEntry> = table.entries().iter().filter(|e| e.kind.emitted()).collect();
    writeln!(out, "typeTable :: C.TypesTable")?;
    writeln!(out, "typeTable = {}", type_table_literal(&entries, "  "))?;
    Ok(out)
}
