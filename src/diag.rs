// src/diag.rs
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use std::fmt;

pub use crate::frontend::span::{FileId, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub code: String,
    pub file_id: String,       // 用于显示的“逻辑文件名/路径”字符串
    pub span: Option<Span>,
    pub message: String,
    pub severity: Severity,
}

#[derive(Default, Clone)]
pub struct DiagSink {
    buf: Vec<Diagnostic>,
}

impl DiagSink {
    #[inline]
    pub fn new() -> Self { Self { buf: Vec::new() } }

    pub fn error<S: Into<String>>(
        &mut self,
        code: &str,
        file_id: &str,
        span: Option<Span>,
        msg: S,
    ) {
        self.push(code, file_id, span, msg.into(), Severity::Error);
    }

    pub fn warn<S: Into<String>>(
        &mut self,
        code: &str,
        file_id: &str,
        span: Option<Span>,
        msg: S,
    ) {
        self.push(code, file_id, span, msg.into(), Severity::Warning);
    }

    fn push(&mut self, code: &str, file_id: &str, span: Option<Span>, message: String, severity: Severity) {
        self.buf.push(Diagnostic {
            code: code.to_string(),
            file_id: file_id.to_string(),
            span,
            message,
            severity,
        });
    }

    #[inline] pub fn is_empty(&self) -> bool { self.buf.is_empty() }
    #[inline] pub fn len(&self) -> usize { self.buf.len() }
    #[inline] pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> { self.buf.iter() }
    #[inline] pub fn into_vec(self) -> Vec<Diagnostic> { self.buf }

    pub fn error_count(&self) -> usize {
        self.buf.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn has_errors(&self) -> bool { self.error_count() > 0 }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if let Some(sp) = self.span {
            write!(
                f,
                "[{} {}] {} @{}..{}: {}",
                sev, self.code, self.file_id, sp.start, sp.end, self.message
            )
        } else {
            write!(f, "[{} {}] {}: {}", sev, self.code, self.file_id, self.message)
        }
    }
}

/// 已载入的源文件（FileId 即下标）
#[derive(Default)]
pub struct SourceMap {
    files: Vec<(String, String)>,
}

impl SourceMap {
    pub fn new() -> Self { Self::default() }

    pub fn add_file(&mut self, name: String, src: String) -> FileId {
        self.files.push((name, src));
        FileId(self.files.len() - 1)
    }

    pub fn get(&self, id: FileId) -> Option<(&str, &str)> {
        self.files.get(id.0).map(|(n, s)| (n.as_str(), s.as_str()))
    }
}

/// 用 ariadne 把诊断输出到 stderr；没有 span 或源文件缺失时退化为单行文本
pub fn render_diagnostics_colored(diags: &[Diagnostic], sm: &SourceMap) {
    for d in diags {
        let located = d.span.and_then(|sp| sm.get(sp.file).map(|(_, src)| (sp, src)));
        let Some((sp, src)) = located else {
            eprintln!("{d}");
            continue;
        };

        let (kind, color) = match d.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };
        // 越界 span 收紧到文件末尾（EOF 类解码错误）
        let range = sp.range();
        let end = range.end.min(src.len());
        let range = range.start.min(end)..end;
        let name = d.file_id.clone();

        let printed = Report::build(kind, (name.clone(), range.clone()))
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_code(&d.code)
            .with_message(&d.message)
            .with_label(
                Label::new((name.clone(), range))
                    .with_message(&d.message)
                    .with_color(color),
            )
            .finish()
            .eprint((name, Source::from(src.to_string())));
        if printed.is_err() {
            eprintln!("{d}");
        }
    }
}
