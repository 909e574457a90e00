//! 词法分析
//!
//! 模块描述符和编译单元共用的极简词法器。只区分后续分析需要的 token：
//! 标识符、`.`、`;`、`,`、`{`、`}`、`*`，其余标点统一归为 `Other`。
//! 注释、空白、字符串与字符字面量被跳过（字面量产出 `Literal` 占位）。

use super::position::SourcePosition;
use thiserror::Error;

/// Token 类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// 标识符或关键字
    Ident(String),
    /// 字符串、字符或数字字面量
    Literal,
    Dot,
    Semi,
    Comma,
    LBrace,
    RBrace,
    Star,
    /// 其它标点
    Other(char),
}

/// Token 结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// token 起始位置
    pub position: SourcePosition,
}

impl Token {
    /// 若为标识符，返回其文本
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// 是否为指定关键字
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.ident() == Some(keyword)
    }

    /// 用于错误信息的 token 描述
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Ident(name) => format!("'{name}'"),
            TokenKind::Literal => "literal".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::Semi => "';'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Other(c) => format!("'{c}'"),
        }
    }
}

/// 词法错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("unclosed comment")]
    UnclosedComment,
    #[error("unclosed string literal")]
    UnclosedString,
    #[error("unclosed character literal")]
    UnclosedChar,
}

impl LexErrorKind {
    /// 对应的诊断代码
    pub fn code(&self) -> &'static str {
        match self {
            LexErrorKind::UnclosedComment => "unclosed.comment",
            LexErrorKind::UnclosedString => "unclosed.str.lit",
            LexErrorKind::UnclosedChar => "unclosed.char.lit",
        }
    }
}

/// 词法错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: SourcePosition,
}

/// 标识符首字符
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// 标识符后续字符
pub fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// 检查字符串是否为合法标识符（不排除关键字）
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if is_ident_start(first) => chars.all(is_ident_part),
        _ => false,
    }
}

/// 字符游标，同时维护位置
struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: SourcePosition,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            position: SourcePosition::start(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position.advance(c);
        Some(c)
    }

    /// 读取带引号的字面量，`quote` 已被消费
    fn skip_quoted(&mut self, quote: char) -> bool {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '\n' => return false,
                c if c == quote => return true,
                _ => {}
            }
        }
        false
    }
}

/// 将源代码切分为 token
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    while let Some(c) = cursor.peek() {
        let start = cursor.position;

        if c.is_whitespace() {
            cursor.bump();
            continue;
        }

        if is_ident_start(c) {
            let mut name = String::new();
            while let Some(c) = cursor.peek().filter(|c| is_ident_part(*c)) {
                name.push(c);
                cursor.bump();
            }
            tokens.push(Token {
                kind: TokenKind::Ident(name),
                position: start,
            });
            continue;
        }

        if c.is_ascii_digit() {
            while cursor
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
            {
                cursor.bump();
            }
            tokens.push(Token {
                kind: TokenKind::Literal,
                position: start,
            });
            continue;
        }

        cursor.bump();
        let kind = match c {
            '/' if cursor.peek() == Some('/') => {
                while cursor.peek().is_some_and(|c| c != '\n') {
                    cursor.bump();
                }
                continue;
            }
            '/' if cursor.peek() == Some('*') => {
                cursor.bump();
                let mut closed = false;
                while let Some(c) = cursor.bump() {
                    if c == '*' && cursor.peek() == Some('/') {
                        cursor.bump();
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(LexError {
                        kind: LexErrorKind::UnclosedComment,
                        position: start,
                    });
                }
                continue;
            }
            '"' | '\'' => {
                if !cursor.skip_quoted(c) {
                    let kind = if c == '"' {
                        LexErrorKind::UnclosedString
                    } else {
                        LexErrorKind::UnclosedChar
                    };
                    return Err(LexError {
                        kind,
                        position: start,
                    });
                }
                TokenKind::Literal
            }
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '*' => TokenKind::Star,
            other => TokenKind::Other(other),
        };
        tokens.push(Token {
            kind,
            position: start,
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_descriptor() {
        assert_eq!(
            kinds("module m1 { requires test.api; }"),
            vec![
                TokenKind::Ident("module".into()),
                TokenKind::Ident("m1".into()),
                TokenKind::LBrace,
                TokenKind::Ident("requires".into()),
                TokenKind::Ident("test".into()),
                TokenKind::Dot,
                TokenKind::Ident("api".into()),
                TokenKind::Semi,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn test_comments_and_literals_skipped() {
        let tokens = kinds("a /* b.C */ // d.E\n\"f.G\" 'x' 1.5 h");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Literal,
                TokenKind::Literal,
                TokenKind::Literal,
                TokenKind::Ident("h".into()),
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("package impl;\n  m2.M2 m;").unwrap();
        assert_eq!(tokens[0].position, SourcePosition::new(1, 1));
        assert_eq!(tokens[1].position, SourcePosition::new(1, 9));
        // m2 . M2
        assert_eq!(tokens[3].position, SourcePosition::new(2, 3));
        assert_eq!(tokens[4].kind, TokenKind::Dot);
        assert_eq!(tokens[4].position, SourcePosition::new(2, 5));
    }

    #[test]
    fn test_escaped_quote_in_string() {
        assert_eq!(kinds(r#""a\"b" c"#).len(), 2);
    }

    #[test]
    fn test_unclosed_errors() {
        let err = tokenize("a /* never").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnclosedComment);
        assert_eq!(err.position, SourcePosition::new(1, 3));
        assert_eq!(err.kind.code(), "unclosed.comment");

        let err = tokenize("x = \"open\ny").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnclosedString);

        let err = tokenize("'a").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnclosedChar);
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("api"));
        assert!(is_identifier("_x$1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("META-INF"));
        assert!(!is_identifier(""));
    }
}
