// src/middle/overload.rs
//! 默认参数展开：宿主语言没有默认参数，每个可省略的元数都物化成一个重载。

use crate::frontend::decl::Declaration;
use crate::utils::fast::SmallVec4;

/// k 个末尾默认参数 -> k+1 个变体，元数依次为 n, n-1, ..., n-k
pub fn expand_defaults(decl: &Declaration) -> SmallVec4<Declaration> {
    let n = decl.arguments.len();
    let k = decl.trailing_defaults();
    (0..=k).map(|i| decl.truncated(n - i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::decl::testutil::decl;
    use crate::frontend::decl::{DefaultValue, Mode};

    fn arities(d: &Declaration) -> Vec<usize> {
        expand_defaults(d).iter().map(|v| v.arguments.len()).collect()
    }

    #[test]
    fn no_defaults_yields_single_variant() {
        let d = decl("neg", Mode::Native, &[], &[("self", "Tensor", None)], &["Tensor"]);
        let v = expand_defaults(&d);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0], d);
    }

    #[test]
    fn one_variant_per_trailing_default() {
        let d = decl(
            "sum",
            Mode::Native,
            &[],
            &[
                ("self", "Tensor", None),
                ("dim", "IntArrayRef", None),
                ("keepdim", "bool", Some(DefaultValue::Bool(false))),
                ("dtype", "ScalarType", Some(DefaultValue::Text("c10::nullopt".into()))),
            ],
            &["Tensor"],
        );
        assert_eq!(arities(&d), vec![4, 3, 2]);
        // 参数顺序保持不变
        let v = expand_defaults(&d);
        let names: Vec<&str> = v[1].arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["self", "dim", "keepdim"]);
    }

    #[test]
    fn all_defaults_go_down_to_zero() {
        let d = decl(
            "f",
            Mode::Native,
            &[],
            &[("a", "int64_t", Some(DefaultValue::Int(0))), ("b", "double", Some(DefaultValue::Float(1.5)))],
            &[],
        );
        assert_eq!(arities(&d), vec![2, 1, 0]);
    }

    #[test]
    fn defaults_before_required_are_not_expanded() {
        let d = decl(
            "g",
            Mode::Native,
            &[],
            &[("a", "int64_t", Some(DefaultValue::Int(0))), ("b", "Tensor", None)],
            &[],
        );
        assert_eq!(arities(&d), vec![2]);
    }
}
