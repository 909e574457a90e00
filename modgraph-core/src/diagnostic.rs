//! 诊断信息
//!
//! 诊断按编译器原始格式渲染，便于和既有测试的期望输出逐字节比较：
//!
//! ```text
//! Impl.java:1:61: compiler.err.not.def.access.package.cant.access: m2.M2, m2
//! 1 error
//! ```

use crate::syntax::{LexErrorKind, SourcePosition};
use std::fmt;
use std::path::{Path, PathBuf};

/// 诊断所在的源码位置
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub position: SourcePosition,
}

impl SourceLocation {
    pub fn new(file: impl AsRef<Path>, position: SourcePosition) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
            position,
        }
    }

    /// 原始格式只输出文件名，不含目录
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.to_string_lossy().into_owned())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_name(),
            self.position.line,
            self.position.column
        )
    }
}

/// 诊断代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticCode {
    /// 引用的包不在任何可观察模块中
    DoesntExist,
    /// 包存在但当前模块无法访问
    NotDefAccessPackageCantAccess,
    /// 按需导入的包不可见
    PackageNotVisible,
    ModuleNotFound,
    DuplicateModule,
    ModuleNameMismatch,
    MalformedModuleDescriptor,
    InvalidAutomaticModuleName,
    CantReadFile,
    /// 配置项取值非法
    BadValueForOption,
    UnclosedComment,
    UnclosedStrLit,
    UnclosedCharLit,
}

impl DiagnosticCode {
    /// 原始格式中 `compiler.err.` 之后的键
    pub fn key(&self) -> &'static str {
        match self {
            DiagnosticCode::DoesntExist => "doesnt.exist",
            DiagnosticCode::NotDefAccessPackageCantAccess => "not.def.access.package.cant.access",
            DiagnosticCode::PackageNotVisible => "package.not.visible",
            DiagnosticCode::ModuleNotFound => "module.not.found",
            DiagnosticCode::DuplicateModule => "duplicate.module",
            DiagnosticCode::ModuleNameMismatch => "module.name.mismatch",
            DiagnosticCode::MalformedModuleDescriptor => "malformed.module.descriptor",
            DiagnosticCode::InvalidAutomaticModuleName => "invalid.automatic.module.name",
            DiagnosticCode::CantReadFile => "cant.read.file",
            DiagnosticCode::BadValueForOption => "bad.value.for.option",
            DiagnosticCode::UnclosedComment => "unclosed.comment",
            DiagnosticCode::UnclosedStrLit => "unclosed.str.lit",
            DiagnosticCode::UnclosedCharLit => "unclosed.char.lit",
        }
    }

    /// 人类可读的消息模板，`{n}` 为第 n 个参数
    fn template(&self) -> &'static str {
        match self {
            DiagnosticCode::DoesntExist => "package {0} does not exist",
            DiagnosticCode::NotDefAccessPackageCantAccess => {
                "{0} is not visible: package {1} is not exported to this module"
            }
            DiagnosticCode::PackageNotVisible => "package {0} is not visible",
            DiagnosticCode::ModuleNotFound => "module not found: {0}",
            DiagnosticCode::DuplicateModule => "module {0} found in both {1} and {2}",
            DiagnosticCode::ModuleNameMismatch => {
                "module name {0} does not match expected name {1}"
            }
            DiagnosticCode::MalformedModuleDescriptor => "bad module descriptor {0}: {1}",
            DiagnosticCode::InvalidAutomaticModuleName => {
                "unable to derive module name for {0}: {1}"
            }
            DiagnosticCode::CantReadFile => "error reading {0}: {1}",
            DiagnosticCode::BadValueForOption => "bad value for {0} option: '{1}'",
            DiagnosticCode::UnclosedComment => "unclosed comment",
            DiagnosticCode::UnclosedStrLit => "unclosed string literal",
            DiagnosticCode::UnclosedCharLit => "unclosed character literal",
        }
    }
}

impl From<LexErrorKind> for DiagnosticCode {
    fn from(kind: LexErrorKind) -> Self {
        match kind {
            LexErrorKind::UnclosedComment => DiagnosticCode::UnclosedComment,
            LexErrorKind::UnclosedString => DiagnosticCode::UnclosedStrLit,
            LexErrorKind::UnclosedChar => DiagnosticCode::UnclosedCharLit,
        }
    }
}

/// 一条错误诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub args: Vec<String>,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn new<I, S>(code: DiagnosticCode, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code,
            args: args.into_iter().map(Into::into).collect(),
            location: None,
        }
    }

    /// 附加位置
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// 可选位置
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// 原始格式：`<file>:<line>:<col>: compiler.err.<code>: <args>`
    pub fn render_raw(&self) -> String {
        let prefix = match &self.location {
            Some(location) => format!("{location}: "),
            None => "- ".to_string(),
        };
        if self.args.is_empty() {
            format!("{}compiler.err.{}", prefix, self.code.key())
        } else {
            format!(
                "{}compiler.err.{}: {}",
                prefix,
                self.code.key(),
                self.args.join(", ")
            )
        }
    }

    /// 人类可读的消息
    pub fn message(&self) -> String {
        let mut text = self.code.template().to_string();
        for (index, arg) in self.args.iter().enumerate() {
            text = text.replace(&format!("{{{index}}}"), arg);
        }
        text
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_raw())
    }
}

/// 按产生顺序累积的诊断
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticLog {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 错误数（所有诊断都是错误）
    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// 原始格式的各行，最后一行为错误计数
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.diagnostics.iter().map(Diagnostic::render_raw).collect();
        match self.error_count() {
            0 => {}
            1 => lines.push("1 error".to_string()),
            n => lines.push(format!("{n} errors")),
        }
        lines
    }

    /// 完整原始输出，每行以换行结尾
    pub fn render(&self) -> String {
        self.lines().iter().map(|line| format!("{line}\n")).collect()
    }
}

impl Extend<Diagnostic> for DiagnosticLog {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.diagnostics.extend(iter);
    }
}

impl<'a> IntoIterator for &'a DiagnosticLog {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
