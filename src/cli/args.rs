// src/cli/args.rs
// 命令行参数解析：aten-ffigen <output-dir> <spec-file>

use std::env;
use std::path::PathBuf;

pub const USAGE: &str = "usage: aten-ffigen <output-dir> <spec-file>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// 输出根目录（模块路径在其下展开）
    pub out_dir: PathBuf,
    /// 声明规格文件（.toml / .json）
    pub spec_file: PathBuf,
}

impl CliArgs {
    pub fn parse() -> Result<Self, String> {
        Self::parse_from(env::args().skip(1))
    }

    pub fn parse_from<I, S>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if let Some(flag) = args.iter().find(|a| a.starts_with("--")) {
            return Err(format!("Unknown argument: {flag}"));
        }
        match args.as_slice() {
            [out_dir, spec_file] => Ok(CliArgs {
                out_dir: PathBuf::from(out_dir),
                spec_file: PathBuf::from(spec_file),
            }),
            _ => Err(format!("expected 2 arguments, got {}", args.len())),
        }
    }

    pub fn print_usage_error() {
        eprintln!("{USAGE}");
        eprintln!();
        eprintln!("  <output-dir>   directory that receives the generated modules");
        eprintln!("  <spec-file>    declaration list (.toml, or .json)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_positionals() {
        let a = CliArgs::parse_from(["out", "decls.toml"]).unwrap();
        assert_eq!(a.out_dir, PathBuf::from("out"));
        assert_eq!(a.spec_file, PathBuf::from("decls.toml"));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(CliArgs::parse_from(Vec::<String>::new()).is_err());
        assert!(CliArgs::parse_from(["out"]).is_err());
        assert!(CliArgs::parse_from(["a", "b", "c"]).is_err());
    }

    #[test]
    fn flags_are_rejected() {
        let err = CliArgs::parse_from(["--quiet", "decls.toml"]).unwrap_err();
        assert!(err.contains("--quiet"));
    }
}
