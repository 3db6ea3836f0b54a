// src/cli/output.rs
use std::path::Path;

use crate::cli::colors::{ansi, ColorSupport};
use crate::driver::GenerateReport;

/// 输出格式化器
pub struct OutputFormatter {
    color_support: ColorSupport,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self { color_support: ColorSupport::detect() }
    }

    pub fn with_colors(color_support: ColorSupport) -> Self {
        Self { color_support }
    }

    /// 单个输出文件：`wrote <path>  (<n> functions, <size>)`
    pub fn written_line(&self, path: &Path, stanzas: usize, bytes: u64) -> String {
        let body = format!("wrote {}  ({} functions, {})", path.display(), stanzas, Self::human_size(bytes));
        self.color_support.paint(ansi::DIM, &body)
    }

    /// 汇总行
    pub fn summary_line(&self, report: &GenerateReport, duration: f64) -> String {
        let mut body = format!(
            "generated {} files, {} functions ({:.2}s)",
            report.written.len(),
            report.total_stanzas(),
            duration
        );
        if report.skipped > 0 {
            body.push_str(&format!(", {} skipped", report.skipped));
        }
        self.color_support.paint(&format!("{}{}", ansi::BOLD, ansi::GREEN), &body)
    }

    pub fn written(&self, path: &Path, stanzas: usize, bytes: u64) {
        println!("{}", self.written_line(path, stanzas, bytes));
    }

    pub fn summary(&self, report: &GenerateReport, duration: f64) {
        println!("{}", self.summary_line(report, duration));
    }

    /// 格式化错误消息
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.color_support.paint(ansi::RED, message));
    }

    /// 格式化警告消息
    pub fn warning(&self, message: &str) {
        eprintln!("{}", self.color_support.paint(ansi::YELLOW, message));
    }

    /// 计算人类可读的文件大小
    pub fn human_size(bytes: u64) -> String {
        if bytes >= 1_048_576 {
            format!("{:.1} MB", bytes as f64 / 1_048_576.0)
        } else if bytes >= 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{} B", bytes)
        }
    }
}
