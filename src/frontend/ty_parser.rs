// src/frontend/ty_parser.rs
//! 原生类型字符串的语法解析（pest）。
//!
//! 这里只做**语法**：`const` 被丢弃，`*` / `&` 保留为包装节点，
//! 模板实参可以是类型或整数。语义归类在 `middle::ty` 中完成。

use anyhow::{anyhow, bail, Result};
use pest::iterators::Pair;
use pest::Parser;
use std::fmt;

#[derive(pest_derive::Parser)]
#[grammar = "./grammar/native_ty.pest"]
pub struct NativeTyParser;

/// 类型语法树
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TyExpr {
    /// `Tensor` / `at::Scalar` / `int64_t`
    Name(String),
    /// `std::tuple<Tensor,Tensor>` / `std::array<bool,3>`
    App { name: String, args: Vec<TyArg> },
    /// `T *`
    Ptr(Box<TyExpr>),
    /// `T &`
    Ref(Box<TyExpr>),
}

/// 模板实参
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TyArg {
    Ty(TyExpr),
    Num(usize),
}

impl fmt::Display for TyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TyExpr::Name(n) => f.write_str(n),
            TyExpr::App { name, args } => {
                write!(f, "{name}<")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 { f.write_str(",")?; }
                    match a {
                        TyArg::Ty(t) => write!(f, "{t}")?,
                        TyArg::Num(n) => write!(f, "{n}")?,
                    }
                }
                f.write_str(">")
            }
            TyExpr::Ptr(t) => write!(f, "{t} *"),
            TyExpr::Ref(t) => write!(f, "{t} &"),
        }
    }
}

/// 解析一条完整的类型字符串
pub fn parse_native_ty(src: &str) -> Result<TyExpr> {
    let mut pairs = NativeTyParser::parse(Rule::native_ty, src)?;
    let root = pairs.next().ok_or_else(|| anyhow!("empty type"))?;
    debug_assert_eq!(root.as_rule(), Rule::native_ty);

    let ty = root
        .into_inner()
        .find(|p| p.as_rule() == Rule::ty)
        .ok_or_else(|| anyhow!("native_ty: missing ty"))?;
    build_ty(ty)
}

// ty = kw_const? ~ atom ~ extent? ~ modifier*
fn build_ty(p: Pair<Rule>) -> Result<TyExpr> {
    let mut cur: Option<TyExpr> = None;
    for x in p.into_inner() {
        match x.as_rule() {
            // const 与尺寸注解（IntArrayRef[2]）不影响 FFI 形态
            Rule::kw_const | Rule::extent => {}
            Rule::atom => cur = Some(build_atom(x)?),
            Rule::modifier => {
                let base = cur.take().ok_or_else(|| anyhow!("modifier before type"))?;
                let m = x.into_inner().next().ok_or_else(|| anyhow!("empty modifier"))?;
                cur = Some(match m.as_rule() {
                    Rule::ptr => TyExpr::Ptr(Box::new(base)),
                    Rule::reference => TyExpr::Ref(Box::new(base)),
                    Rule::kw_const => base,
                    other => bail!("modifier: unexpected {:?}", other),
                });
            }
            other => bail!("ty: unexpected node {:?}", other),
        }
    }
    cur.ok_or_else(|| anyhow!("ty: missing atom"))
}

fn build_atom(p: Pair<Rule>) -> Result<TyExpr> {
    let inner = p.into_inner().next().ok_or_else(|| anyhow!("empty atom"))?;
    match inner.as_rule() {
        Rule::qident => Ok(TyExpr::Name(inner.as_str().to_string())),
        Rule::template => {
            let mut it = inner.into_inner();
            let head = it.next().ok_or_else(|| anyhow!("template: missing head"))?;
            let name = head.as_str().to_string();
            let mut args = Vec::new();
            for a in it {
                let arg = a.into_inner().next().ok_or_else(|| anyhow!("empty template arg"))?;
                args.push(match arg.as_rule() {
                    Rule::number => TyArg::Num(arg.as_str().parse()?),
                    Rule::ty => TyArg::Ty(build_ty(arg)?),
                    other => bail!("template arg: unexpected {:?}", other),
                });
            }
            Ok(TyExpr::App { name, args })
        }
        other => Err(anyhow!("atom: unexpected {:?}", other)),
    }
}
