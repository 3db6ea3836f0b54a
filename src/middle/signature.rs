// src/middle/signature.rs
//! 函数签名：名字 + 参数 + 返回类型。
//! `Display` 的输出即去重键。

use std::fmt;

use crate::frontend::decl::Declaration;
use crate::middle::ty::{Handle, NativeTy};

/// 由运行时隐式提供、不出现在外部声明里的参数种类
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Implicit {
    Generator,
}

impl Implicit {
    /// 新增隐式参数种类只改这里
    pub fn classify(ty: &NativeTy) -> Option<Implicit> {
        match ty.pointee() {
            NativeTy::Handle(Handle::Generator) => Some(Implicit::Generator),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    Explicit { name: String, ty: NativeTy },
    Implicit { name: String, kind: Implicit },
}

impl Param {
    pub fn name(&self) -> &str {
        match self {
            Param::Explicit { name, .. } | Param::Implicit { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ret {
    One(NativeTy),
    /// 空元组即 void
    Tuple(Vec<NativeTy>),
}

impl Ret {
    /// 折叠成单个原生类型：空元组为 void，多元素为 std::tuple
    pub fn as_native(&self) -> NativeTy {
        match self {
            Ret::One(t) => t.clone(),
            Ret::Tuple(items) if items.is_empty() => NativeTy::VOID,
            Ret::Tuple(items) => NativeTy::Tuple(items.clone()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Ret,
}

impl Signature {
    /// 会出现在外部声明里的参数
    pub fn explicit_params(&self) -> impl Iterator<Item = (&str, &NativeTy)> {
        self.params.iter().filter_map(|p| match p {
            Param::Explicit { name, ty } => Some((name.as_str(), ty)),
            Param::Implicit { .. } => None,
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (name, ty)) in self.explicit_params().enumerate() {
            if i > 0 { f.write_str(", ")?; }
            write!(f, "{ty} {name}")?;
        }
        write!(f, ") -> {}", self.ret.as_native())
    }
}

/// 声明 -> 签名。默认值不进入签名；生成器类参数标记为隐式。
pub fn parse_signature(decl: &Declaration) -> Signature {
    let params = decl
        .arguments
        .iter()
        .map(|a| {
            let ty = NativeTy::from_expr(&a.ty);
            match Implicit::classify(&ty) {
                Some(kind) => Param::Implicit { name: a.name.clone(), kind },
                None => Param::Explicit { name: a.name.clone(), ty },
            }
        })
        .collect();

    let mut rets: Vec<NativeTy> = decl.returns.iter().map(NativeTy::from_expr).collect();
    let ret = if rets.len() == 1 {
        Ret::One(rets.remove(0))
    } else {
        Ret::Tuple(rets)
    };

    Signature { name: decl.name.clone(), params, ret }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::decl::testutil::decl;
    use crate::frontend::decl::{DefaultValue, Mode};
    use crate::middle::ty::Prim;

    #[test]
    fn single_return_and_verbatim_names() {
        let d = decl(
            "add",
            Mode::Native,
            &["namespace"],
            &[
                ("self", "const Tensor &", None),
                ("other", "const Tensor &", None),
                ("alpha", "Scalar", Some(DefaultValue::Int(1))),
            ],
            &["Tensor"],
        );
        let s = parse_signature(&d);
        assert_eq!(s.name, "add");
        assert_eq!(s.ret, Ret::One(NativeTy::Handle(Handle::Tensor)));
        assert_eq!(
            s.to_string(),
            "add(at::Tensor self, at::Tensor other, at::Scalar alpha) -> at::Tensor"
        );
    }

    #[test]
    fn multiple_returns_become_tuple() {
        let d = decl("max", Mode::Native, &[], &[("self", "Tensor", None)], &["Tensor", "Tensor"]);
        let s = parse_signature(&d);
        assert_eq!(
            s.ret.as_native().cpp_name(),
            "std::tuple<at::Tensor,at::Tensor>"
        );
    }

    #[test]
    fn no_return_is_void() {
        let d = decl("set_num_threads", Mode::Native, &[], &[("n", "int64_t", None)], &[]);
        let s = parse_signature(&d);
        assert_eq!(s.ret, Ret::Tuple(vec![]));
        assert_eq!(s.ret.as_native(), NativeTy::Prim(Prim::Void));
        assert_eq!(s.to_string(), "set_num_threads(int64_t n) -> void");
    }

    #[test]
    fn generators_are_implicit() {
        let d = decl(
            "bernoulli",
            Mode::Native,
            &[],
            &[
                ("self", "Tensor", None),
                ("generator", "Generator *", Some(DefaultValue::Text("nullptr".into()))),
            ],
            &["Tensor"],
        );
        let s = parse_signature(&d);
        assert_eq!(s.params.len(), 2);
        assert_eq!(s.params[1], Param::Implicit { name: "generator".into(), kind: Implicit::Generator });
        assert_eq!(s.params[1].name(), "generator");
        assert_eq!(s.explicit_params().count(), 1);
        assert_eq!(s.to_string(), "bernoulli(at::Tensor self) -> at::Tensor");
    }
}
