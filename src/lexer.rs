use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Lexeme::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
            // First-error reporting: stop scanning, but keep the stream
            // well-formed for any consumer that inspects it.
            if !self.diagnostics.is_empty() {
                let here = self.pos as u32;
                tokens.push(Spanned::new(Lexeme::Eof, Span::new(here, here)));
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Spanned<Lexeme> {
        self.skip_whitespace_and_comments();

        if self.pos >= self.source.len() {
            return self.make_token(Lexeme::Eof, self.pos, self.pos);
        }

        let start = self.pos;
        let ch = self.source[self.pos];

        // Identifiers, keywords, and `$`-sigiled register names
        if is_ident_start(ch) {
            return self.scan_ident_or_keyword();
        }

        // Number literals
        if ch.is_ascii_digit() {
            return self.scan_number();
        }

        self.scan_symbol(start)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            // Line comments: `//` to end of line
            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'/'
            {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            break;
        }
    }

    fn scan_ident_or_keyword(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        if self.source[self.pos] == b'$' {
            self.pos += 1;
        }
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        if text == "$" {
            self.diagnostics.push(
                Diagnostic::error(
                    "expected register name after '$'".to_string(),
                    Span::new(start as u32, self.pos as u32),
                )
                .with_help("register references look like `$IN`, `$OUT`, or `$DONE`".to_string()),
            );
        }
        let token = Lexeme::from_keyword(text).unwrap_or_else(|| Lexeme::Ident(text.to_string()));
        self.make_token(token, start, self.pos)
    }

    fn scan_number(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        // Optional fractional part; the text is kept verbatim for the backend
        if self.pos + 1 < self.source.len()
            && self.source[self.pos] == b'.'
            && self.source[self.pos + 1].is_ascii_digit()
        {
            self.pos += 1;
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        self.make_token(Lexeme::Number(text.to_string()), start, self.pos)
    }

    fn scan_symbol(&mut self, start: usize) -> Spanned<Lexeme> {
        let ch = self.source[self.pos];
        self.pos += 1;

        let token = match ch {
            b'(' => Lexeme::LParen,
            b')' => Lexeme::RParen,
            b'{' => Lexeme::LBrace,
            b'}' => Lexeme::RBrace,
            b',' => Lexeme::Comma,
            b';' => Lexeme::Semicolon,
            b'+' => Lexeme::Plus,
            b'-' => Lexeme::Minus,
            b'*' => Lexeme::Star,
            b'/' => Lexeme::Slash,
            b'%' => Lexeme::Percent,
            b'=' => {
                if self.peek_is(b'=') {
                    self.pos += 1;
                    Lexeme::EqEq
                } else {
                    Lexeme::Assign
                }
            }
            b'!' => {
                if self.peek_is(b'=') {
                    self.pos += 1;
                    Lexeme::Ne
                } else {
                    self.diagnostics.push(
                        Diagnostic::error(
                            "unexpected character '!'".to_string(),
                            Span::new(start as u32, self.pos as u32),
                        )
                        .with_help("did you mean '!='?".to_string()),
                    );
                    Lexeme::Ne
                }
            }
            b'<' => {
                if self.peek_is(b'=') {
                    self.pos += 1;
                    Lexeme::Le
                } else {
                    Lexeme::Lt
                }
            }
            b'>' => {
                if self.peek_is(b'=') {
                    self.pos += 1;
                    Lexeme::Ge
                } else {
                    Lexeme::Gt
                }
            }
            _ => {
                self.diagnostics.push(Diagnostic::error(
                    format!("unexpected character '{}'", ch as char),
                    Span::new(start as u32, self.pos as u32),
                ));
                Lexeme::Eof
            }
        };

        self.make_token(token, start, self.pos)
    }

    fn peek_is(&self, ch: u8) -> bool {
        self.pos < self.source.len() && self.source[self.pos] == ch
    }

    fn make_token(&self, token: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(token, Span::new(start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
