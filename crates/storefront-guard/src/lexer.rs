//! 面向页面源码的轻量词法扫描。
//!
//! 只区分守卫规则需要的几类记号：标识符、标点、字符串、数字。注释与空白被跳过，
//! 因此被注释掉的代码不会命中签名规则。正则字面量不做识别，`/` 按标点处理。

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    Punct,
    Str,
    Number,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    /// 记号起始字节偏移（含）。
    pub start: usize,
    /// 记号结束字节偏移（不含）。
    pub end: usize,
}

impl Token<'_> {
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct
            && self.text.len() == ch.len_utf8()
            && self.text.starts_with(ch)
    }

    pub fn is_ident(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }
}

pub(crate) fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

pub(crate) fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphanumeric()
}

pub(crate) fn tokenize(src: &str) -> Vec<Token<'_>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }

        if ch == '/' {
            match bytes.get(start + 1) {
                Some(b'/') => {
                    while let Some(&(_, next)) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                    continue;
                }
                Some(b'*') => {
                    chars.next();
                    let mut previous = '\0';
                    for (_, next) in chars.by_ref() {
                        if previous == '*' && next == '/' {
                            break;
                        }
                        previous = next;
                    }
                    continue;
                }
                _ => {}
            }
        }

        let kind = if ch == '"' || ch == '\'' || ch == '`' {
            let mut escaped = false;
            for (_, next) in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if next == '\\' {
                    escaped = true;
                } else if next == ch {
                    break;
                }
            }
            TokenKind::Str
        } else if is_ident_start(ch) {
            while chars.next_if(|&(_, next)| is_ident_continue(next)).is_some() {}
            TokenKind::Ident
        } else if ch.is_ascii_digit() {
            while chars
                .next_if(|&(_, next)| next.is_ascii_alphanumeric() || next == '.' || next == '_')
                .is_some()
            {}
            TokenKind::Number
        } else {
            TokenKind::Punct
        };

        let end = chars.peek().map_or(src.len(), |&(offset, _)| offset);
        tokens.push(Token {
            kind,
            text: &src[start..end],
            start,
            end,
        });
    }

    tokens
}

/// 在 `tokens[open]` 处的开括号之后查找与之配对的闭括号下标。
pub(crate) fn matching_close(
    tokens: &[Token<'_>],
    open: usize,
    opener: char,
    closer: char,
) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        if token.is_punct(opener) {
            depth += 1;
        } else if token.is_punct(closer) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<&str> {
        tokenize(src).into_iter().map(|token| token.text).collect()
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            texts("a /* b */ c // d\n e"),
            ["a", "c", "e"]
        );
    }

    #[test]
    fn strings_keep_their_quotes_and_escapes() {
        let tokens = tokenize(r#"x = "a\"b" + 'c' + `d ${e}`"#);
        let strings: Vec<&str> = tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Str)
            .map(|token| token.text)
            .collect();
        assert_eq!(strings, [r#""a\"b""#, "'c'", "`d ${e}`"]);
    }

    #[test]
    fn identifiers_include_dollar_and_underscore() {
        assert_eq!(texts("$el _x9 {}"), ["$el", "_x9", "{", "}"]);
    }

    #[test]
    fn matching_close_respects_nesting() {
        let tokens = tokenize("({ a: (b) }) tail");
        assert_eq!(matching_close(&tokens, 0, '(', ')'), Some(8));
    }
}
