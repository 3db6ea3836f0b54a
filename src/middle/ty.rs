// src/middle/ty.rs
//! 原生类型的语义模型：把 `TyExpr` 归类为标量 / 句柄 / 定长布尔数组 / 元组 / 指针。
//! 引用与 const 折叠为值形态，因为两者在 FFI 调用点的写法一致。

use std::fmt;

use crate::frontend::ty_parser::{TyArg, TyExpr};

/// 按值传递的标量
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prim {
    Bool,
    Int64,
    Double,
    Void,
    ScalarType,
}

/// 不透明句柄（宿主侧只持有指针）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    Tensor,
    Scalar,
    Storage,
    Device,
    Generator,
    TensorOptions,
    TensorList,
    IntArray,
    String,
    Context,
    ConstQuantizerPtr,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeTy {
    Prim(Prim),
    Handle(Handle),
    /// `std::array<bool,N>`
    BoolArray(usize),
    Tuple(Vec<NativeTy>),
    /// 显式 `*`
    Ptr(Box<NativeTy>),
    /// 语法合法但不认识的类型，留给类型表报错
    Unknown(String),
}

impl Prim {
    pub fn cpp_name(self) -> &'static str {
        match self {
            Prim::Bool => "bool",
            Prim::Int64 => "int64_t",
            Prim::Double => "double",
            Prim::Void => "void",
            Prim::ScalarType => "at::ScalarType",
        }
    }
}

impl Handle {
    pub fn cpp_name(self) -> &'static str {
        match self {
            Handle::Tensor => "at::Tensor",
            Handle::Scalar => "at::Scalar",
            Handle::Storage => "at::Storage",
            Handle::Device => "at::Device",
            Handle::Generator => "at::Generator",
            Handle::TensorOptions => "at::TensorOptions",
            Handle::TensorList => "std::vector<at::Tensor>",
            Handle::IntArray => "std::vector<int64_t>",
            Handle::String => "std::string",
            Handle::Context => "at::Context",
            Handle::ConstQuantizerPtr => "at::ConstQuantizerPtr",
        }
    }
}

impl NativeTy {
    /// 语法树 -> 语义类型（不会失败，不认识的落到 Unknown）
    pub fn from_expr(e: &TyExpr) -> NativeTy {
        match e {
            TyExpr::Name(n) => from_name(n),
            TyExpr::Ref(inner) => NativeTy::from_expr(inner),
            TyExpr::Ptr(inner) => NativeTy::Ptr(Box::new(NativeTy::from_expr(inner))),
            TyExpr::App { name, args } => from_app(name, args).unwrap_or_else(|| NativeTy::Unknown(e.to_string())),
        }
    }

    /// 规范 C++ 拼写，也是类型表的键
    pub fn cpp_name(&self) -> String {
        match self {
            NativeTy::Prim(p) => p.cpp_name().to_string(),
            NativeTy::Handle(h) => h.cpp_name().to_string(),
            NativeTy::BoolArray(n) => format!("std::array<bool,{n}>"),
            NativeTy::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(NativeTy::cpp_name).collect();
                format!("std::tuple<{}>", parts.join(","))
            }
            NativeTy::Ptr(inner) => format!("{}*", inner.cpp_name()),
            NativeTy::Unknown(s) => s.clone(),
        }
    }

    /// 去掉一层显式指针
    #[inline]
    pub fn pointee(&self) -> &NativeTy {
        match self {
            NativeTy::Ptr(inner) => inner,
            other => other,
        }
    }

    #[inline]
    pub fn is_ptr(&self) -> bool { matches!(self, NativeTy::Ptr(_)) }

    pub const VOID: NativeTy = NativeTy::Prim(Prim::Void);
}

impl fmt::Display for NativeTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cpp_name())
    }
}

fn from_name(name: &str) -> NativeTy {
    let short = name
        .strip_prefix("at::")
        .or_else(|| name.strip_prefix("c10::"))
        .unwrap_or(name);
    match short {
        "bool" => NativeTy::Prim(Prim::Bool),
        "int64_t" => NativeTy::Prim(Prim::Int64),
        "double" => NativeTy::Prim(Prim::Double),
        "void" => NativeTy::Prim(Prim::Void),
        "ScalarType" => NativeTy::Prim(Prim::ScalarType),
        "Tensor" => NativeTy::Handle(Handle::Tensor),
        "Scalar" => NativeTy::Handle(Handle::Scalar),
        "Storage" => NativeTy::Handle(Handle::Storage),
        "Device" => NativeTy::Handle(Handle::Device),
        "Generator" => NativeTy::Handle(Handle::Generator),
        "TensorOptions" => NativeTy::Handle(Handle::TensorOptions),
        "TensorList" => NativeTy::Handle(Handle::TensorList),
        "IntArrayRef" | "IntList" => NativeTy::Handle(Handle::IntArray),
        "std::string" => NativeTy::Handle(Handle::String),
        "Context" => NativeTy::Handle(Handle::Context),
        "ConstQuantizerPtr" => NativeTy::Handle(Handle::ConstQuantizerPtr),
        _ => NativeTy::Unknown(name.to_string()),
    }
}

fn from_app(name: &str, args: &[TyArg]) -> Option<NativeTy> {
    match (name, args) {
        ("std::array", [TyArg::Ty(elem), TyArg::Num(n)]) => {
            match NativeTy::from_expr(elem) {
                NativeTy::Prim(Prim::Bool) => Some(NativeTy::BoolArray(*n)),
                _ => None,
            }
        }
        ("std::vector", [TyArg::Ty(elem)]) => match NativeTy::from_expr(elem) {
            NativeTy::Handle(Handle::Tensor) => Some(NativeTy::Handle(Handle::TensorList)),
            NativeTy::Prim(Prim::Int64) => Some(NativeTy::Handle(Handle::IntArray)),
            _ => None,
        },
        ("std::tuple", items) => items
            .iter()
            .map(|a| match a {
                TyArg::Ty(t) => Some(NativeTy::from_expr(t)),
                TyArg::Num(_) => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(NativeTy::Tuple),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ty_parser::parse_native_ty;

    fn ty(s: &str) -> NativeTy {
        NativeTy::from_expr(&parse_native_ty(s).unwrap())
    }

    #[test]
    fn references_collapse_to_values() {
        assert_eq!(ty("const Tensor &"), NativeTy::Handle(Handle::Tensor));
        assert_eq!(ty("at::Tensor"), NativeTy::Handle(Handle::Tensor));
        assert_eq!(ty("c10::ScalarType"), NativeTy::Prim(Prim::ScalarType));
    }

    #[test]
    fn pointers_are_kept() {
        let g = ty("Generator *");
        assert_eq!(g, NativeTy::Ptr(Box::new(NativeTy::Handle(Handle::Generator))));
        assert!(g.is_ptr());
        assert_eq!(g.pointee(), &NativeTy::Handle(Handle::Generator));
        assert_eq!(g.cpp_name(), "at::Generator*");
    }

    #[test]
    fn lists_and_arrays() {
        assert_eq!(ty("IntArrayRef[2]"), NativeTy::Handle(Handle::IntArray));
        assert_eq!(ty("std::vector<int64_t>"), NativeTy::Handle(Handle::IntArray));
        assert_eq!(ty("std::vector<Tensor>"), NativeTy::Handle(Handle::TensorList));
        assert_eq!(ty("std::array<bool,3>"), NativeTy::BoolArray(3));
        assert_eq!(ty("std::array<bool,3>").cpp_name(), "std::array<bool,3>");
    }

    #[test]
    fn tuples_use_canonical_spelling() {
        let t = ty("std::tuple<Tensor,Tensor,double,int64_t>");
        assert_eq!(t.cpp_name(), "std::tuple<at::Tensor,at::Tensor,double,int64_t>");
    }

    #[test]
    fn unsupported_types_are_unknown() {
        assert_eq!(ty("Dimname"), NativeTy::Unknown("Dimname".into()));
        assert_eq!(ty("std::array<int64_t,2>"), NativeTy::Unknown("std::array<int64_t,2>".into()));
        assert_eq!(ty("c10::optional<Tensor>").cpp_name(), "c10::optional<Tensor>");
    }
}
