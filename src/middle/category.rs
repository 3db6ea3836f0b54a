// src/middle/category.rs
//! 输出分类。每个分类决定：接纳哪些声明、调用用哪个命名空间、模块名、额外 include。

use crate::frontend::decl::{Declaration, Mode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// 神经网络算子（NN）
    NeuralNet,
    /// 旧式 TH 算子
    Legacy,
    /// 命名空间下的 native 函数
    Native,
    /// 工厂构造函数
    Factory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    At,
    Torch,
}

impl Namespace {
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::At => "at::",
            Namespace::Torch => "torch::",
        }
    }
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::NeuralNet,
        Category::Legacy,
        Category::Native,
        Category::Factory,
    ];

    pub fn admits(self, d: &Declaration) -> bool {
        match self {
            Category::NeuralNet => d.mode == Mode::Nn && d.is_method_of_any(&["Type", "namespace"]),
            Category::Legacy => d.mode == Mode::Th && d.is_method_of_any(&["Type", "namespace"]),
            Category::Native => d.mode == Mode::Native && d.is_method_of("namespace"),
            Category::Factory => {
                d.mode == Mode::Native && d.is_method_of("namespace") && d.is_factory()
            }
        }
    }

    pub fn namespace(self) -> Namespace {
        match self {
            Category::NeuralNet | Category::Legacy | Category::Native => Namespace::At,
            Category::Factory => Namespace::Torch,
        }
    }

    /// 生成模块的末段名
    pub fn module_name(self) -> &'static str {
        match self {
            Category::NeuralNet => "NN",
            Category::Legacy => "TH",
            Category::Native => "Native",
            Category::Factory => "TensorFactories",
        }
    }

    /// 除公共 include 外还需要的头文件
    pub fn extra_includes(self) -> &'static [&'static str] {
        match self {
            Category::NeuralNet | Category::Legacy | Category::Native => &[],
            Category::Factory => &["<torch/csrc/autograd/generated/variable_factories.h>"],
        }
    }
}
