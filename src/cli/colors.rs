// src/cli/colors.rs
use std::env;

/// 颜色支持检测
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSupport {
    Enabled,
    Disabled,
}

impl ColorSupport {
    /// 检测当前终端是否支持颜色
    pub fn detect() -> Self {
        // 检查 NO_COLOR 环境变量
        if env::var("NO_COLOR").is_ok() {
            return Self::Disabled;
        }

        if let Ok(force) = env::var("FORCE_COLOR") {
            return if force == "0" { Self::Disabled } else { Self::Enabled };
        }

        if let Ok(term) = env::var("TERM") {
            if term == "dumb" {
                return Self::Disabled;
            }
        }

        Self::Enabled
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// 按需给文本套上颜色
    pub fn paint(self, color: &str, text: &str) -> String {
        if self.is_enabled() {
            format!("{color}{text}{}", ansi::RESET)
        } else {
            text.to_string()
        }
    }
}

/// ANSI 颜色代码
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}
