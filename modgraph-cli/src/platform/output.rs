//! CLI 格式化输出
//!
//! 原始格式诊断默认写到 stdout，`--describe` 时改写到 stderr；
//! `--explain` 时在 stderr 打印可读消息和源码上下文。

use modgraph_core::syntax::TAB_WIDTH;
use modgraph_core::DiagnosticLog;
use modgraph_vfs::VirtualFileSystem;
use std::io::{self, Write};

/// 原始格式诊断和错误计数
pub fn write_raw<W: Write>(log: &DiagnosticLog, out: &mut W) -> io::Result<()> {
    out.write_all(log.render().as_bytes())?;
    out.flush()
}

/// 打印可读消息，有位置时附带源码上下文
pub fn explain(log: &DiagnosticLog, vfs: &dyn VirtualFileSystem) {
    for diagnostic in log {
        match &diagnostic.location {
            Some(location) => {
                eprintln!("error: {} ({})", diagnostic.message(), location.file.display());
                if let Ok(bytes) = vfs.read_file(&location.file) {
                    let source = String::from_utf8_lossy(&bytes);
                    eprint!(
                        "{}",
                        source_context(&source, location.position.line, location.position.column)
                    );
                }
            }
            None => eprintln!("error: {}", diagnostic.message()),
        }
    }
}

/// 错误行前后几行的源码，并在错误列下方标出 `^`
pub fn source_context(source: &str, error_line: usize, error_col: usize) -> String {
    const CONTEXT_LINES: usize = 2;

    let lines: Vec<&str> = source.lines().collect();
    if error_line == 0 || error_line > lines.len() {
        return String::new();
    }

    let start_line = error_line.saturating_sub(CONTEXT_LINES).max(1);
    let end_line = (error_line + CONTEXT_LINES).min(lines.len());
    let width = end_line.to_string().len();

    let mut out = String::new();
    for line_idx in start_line..=end_line {
        out.push_str(&format!("{:>width$} | {}\n", line_idx, lines[line_idx - 1]));
        if line_idx == error_line {
            let marker = caret_indent(lines[line_idx - 1], error_col);
            out.push_str(&format!("{:>width$} | {}^\n", "", marker));
        }
    }
    out
}

/// 到达 `column` 之前的缩进；制表符原样保留，列号按 8 列制表位计算
fn caret_indent(line: &str, column: usize) -> String {
    let mut indent = String::new();
    let mut current = 1;
    for c in line.chars() {
        if current >= column {
            break;
        }
        if c == '\t' {
            indent.push('\t');
            current = ((current - 1) / TAB_WIDTH + 1) * TAB_WIDTH + 1;
        } else {
            indent.push(' ');
            current += 1;
        }
    }
    indent
}
