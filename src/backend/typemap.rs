// src/backend/typemap.rs
//! 原生类型名 -> 宿主（Haskell）类型名的对照表。
//! 表是封闭的：不在表里的类型一律报 `UnmappedType`，先补表再生成。

use once_cell::sync::Lazy;

use crate::error::CodegenError;
use crate::middle::ty::NativeTy;
use crate::utils::fast::{fast_map_with_cap, FastMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// FFI 层内建的标量，按值传递，不写入宿主类型表
    Builtin,
    /// 枚举，按值传递
    Enum,
    /// 不透明句柄，按指针传递
    Opaque,
    /// 定长数组，按指针传递
    Array,
    /// 元组，按指针传递
    Tuple,
}

impl EntryKind {
    #[inline]
    pub fn by_value(self) -> bool {
        matches!(self, EntryKind::Builtin | EntryKind::Enum)
    }

    #[inline]
    pub fn emitted(self) -> bool {
        !matches!(self, EntryKind::Builtin)
    }
}

#[derive(Debug)]
pub struct TypeEntry {
    /// 规范 C++ 拼写（与 `NativeTy::cpp_name` 一致）
    pub native: &'static str,
    pub host: &'static str,
    pub kind: EntryKind,
    /// 类型模块里对应的宿主声明
    pub host_decl: Option<&'static str>,
    /// 名字改编用的短码；整张表的短码互不为前缀，拼接后可唯一拆回
    pub code: &'static str,
}

macro_rules! entry {
    ($native:literal => $host:literal, $kind:ident, $code:literal) => {
        TypeEntry { native: $native, host: $host, kind: EntryKind::$kind, host_decl: None, code: $code }
    };
    ($native:literal => $host:literal, $kind:ident, $code:literal, $decl:literal) => {
        TypeEntry { native: $native, host: $host, kind: EntryKind::$kind, host_decl: Some($decl), code: $code }
    };
}

/// 表的顺序即输出顺序
static ENTRIES: &[TypeEntry] = &[
    // 标量
    entry!("bool" => "CBool", Builtin, "b"),
    entry!("int64_t" => "Int64", Builtin, "l"),
    entry!("double" => "CDouble", Builtin, "d"),
    entry!("void" => "()", Builtin, "v"),
    entry!("at::ScalarType" => "ScalarType", Enum, "k", "type ScalarType = Int8"),
    // 句柄
    entry!("at::Tensor" => "Tensor", Opaque, "t", "data Tensor"),
    entry!("at::Scalar" => "Scalar", Opaque, "s", "data Scalar"),
    entry!("at::Storage" => "Storage", Opaque, "S", "data Storage"),
    entry!("at::Device" => "Device", Opaque, "D", "data Device"),
    entry!("at::Generator" => "Generator", Opaque, "G", "data Generator"),
    entry!("at::TensorOptions" => "TensorOptions", Opaque, "o", "data TensorOptions"),
    entry!("std::vector<at::Tensor>" => "TensorList", Opaque, "L", "type TensorList = StdVector Tensor"),
    entry!("std::vector<int64_t>" => "IntArray", Opaque, "a", "type IntArray = StdVector Int64"),
    entry!("std::string" => "StdString", Opaque, "x", "data StdString"),
    entry!("at::Context" => "Context", Opaque, "C", "data Context"),
    entry!("at::ConstQuantizerPtr" => "ConstQuantizerPtr", Opaque, "Q", "data ConstQuantizerPtr"),
    // 定长布尔数组
    entry!("std::array<bool,2>" => "StdArray '(CBool,2)", Array, "A2"),
    entry!("std::array<bool,3>" => "StdArray '(CBool,3)", Array, "A3"),
    entry!("std::array<bool,4>" => "StdArray '(CBool,4)", Array, "A4"),
    // 元组
    entry!("std::tuple<at::Tensor,at::Tensor>" => "StdTuple '(Tensor,Tensor)", Tuple, "T2"),
    entry!("std::tuple<at::Tensor,at::Tensor,at::Tensor>" => "StdTuple '(Tensor,Tensor,Tensor)", Tuple, "T3"),
    entry!("std::tuple<at::Tensor,at::Tensor,at::Tensor,at::Tensor>" => "StdTuple '(Tensor,Tensor,Tensor,Tensor)", Tuple, "T4"),
    entry!("std::tuple<at::Tensor,at::Tensor,at::Tensor,at::Tensor,at::Tensor>" => "StdTuple '(Tensor,Tensor,Tensor,Tensor,Tensor)", Tuple, "T5"),
    entry!("std::tuple<at::Tensor,at::Tensor,at::Tensor,std::vector<at::Tensor>>" => "StdTuple '(Tensor,Tensor,Tensor,TensorList)", Tuple, "Tm1"),
    entry!("std::tuple<at::Tensor,at::Tensor,double,int64_t>" => "StdTuple '(Tensor,Tensor,CDouble,Int64)", Tuple, "Tm2"),
];

pub struct TypeTable {
    entries: &'static [TypeEntry],
    index: FastMap<&'static str, usize>,
}

static GLOBAL: Lazy<TypeTable> = Lazy::new(|| TypeTable::new(ENTRIES));

impl TypeTable {
    pub fn new(entries: &'static [TypeEntry]) -> TypeTable {
        let mut index = fast_map_with_cap(entries.len());
        for (i, e) in entries.iter().enumerate() {
            index.insert(e.native, i);
        }
        TypeTable { entries, index }
    }

    /// 内置的共享表
    pub fn global() -> &'static TypeTable {
        &GLOBAL
    }

    pub fn entries(&self) -> &'static [TypeEntry] {
        self.entries
    }

    /// 表中位置（用于按表序输出）
    pub fn position(&self, native: &str) -> Option<usize> {
        self.index.get(native).copied()
    }

    pub fn lookup(&self, native: &str) -> Option<&'static TypeEntry> {
        let entries = self.entries;
        self.position(native).map(|i| &entries[i])
    }

    /// 查表（显式指针按其指向类型查），`function` 只用于报错
    pub fn resolve(&self, ty: &NativeTy, function: &str) -> Result<&'static TypeEntry, CodegenError> {
        let native = ty.pointee().cpp_name();
        self.lookup(&native).ok_or(CodegenError::UnmappedType {
            ty: native,
            function: function.to_string(),
        })
    }
}
