//! 源代码位置追踪
//!
//! 行列号均为 1-based，与编译器原始诊断输出保持一致：
//! 制表符将列号推进到下一个 8 的倍数加一。

/// 制表符宽度
pub const TAB_WIDTH: usize = 8;

/// 源代码位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePosition {
    /// 行号，1-based
    pub line: usize,
    /// 列号，1-based
    pub column: usize,
}

impl SourcePosition {
    /// 创建新位置
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// 文件起始位置
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// 前进一个字符
    pub fn advance(&mut self, c: char) {
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\t' => {
                self.column = ((self.column - 1) / TAB_WIDTH + 1) * TAB_WIDTH + 1;
            }
            _ => self.column += 1,
        }
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::start()
    }
}

impl std::fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_plain_and_newline() {
        let mut pos = SourcePosition::start();
        for c in "ab\nc".chars() {
            pos.advance(c);
        }
        assert_eq!(pos, SourcePosition::new(2, 2));
    }

    #[test]
    fn test_advance_tab_stops() {
        let mut pos = SourcePosition::start();
        pos.advance('\t');
        assert_eq!(pos.column, 9);

        let mut pos = SourcePosition::new(1, 4);
        pos.advance('\t');
        assert_eq!(pos.column, 9);

        let mut pos = SourcePosition::new(1, 9);
        pos.advance('\t');
        assert_eq!(pos.column, 17);
    }

    #[test]
    fn test_display() {
        assert_eq!(SourcePosition::new(1, 61).to_string(), "1:61");
    }
}
