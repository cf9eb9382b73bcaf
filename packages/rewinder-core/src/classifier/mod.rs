//! Insertion detection and target-table extraction from raw statement text.
//!
//! The classifier looks at the leading keywords of a statement only. It does
//! not parse SQL: anything that does not start like a row insertion is
//! reported as "not an insertion", and nothing in this module can fail.

use std::borrow::Cow;

/// MySQL modifiers accepted between `INSERT` and the target.
const INSERT_MODIFIERS: [&str; 4] = ["LOW_PRIORITY", "DELAYED", "HIGH_PRIORITY", "IGNORE"];

/// Returns the table targeted by `statement` if it is a row insertion.
///
/// Only the first statement of the text is considered. Leading whitespace,
/// `--` and `#` line comments and `/* */` block comments are skipped before the
/// keyword match, which is case-insensitive. Quoted (`"t"`, `` `t` ``),
/// bracketed (`[t]`) and dot-qualified (`schema.t`) targets are accepted; the
/// last segment of a qualified name is returned without its quotes and without
/// case folding.
///
/// # Examples
/// ```
/// use rewinder_core::classifier::classify;
///
/// assert_eq!(classify(r#"INSERT INTO "users" (id) VALUES (1)"#).as_deref(), Some("users"));
/// assert_eq!(classify("SELECT * FROM users"), None);
/// ```
pub fn classify(statement: &str) -> Option<Cow<'_, str>> {
    let mut cursor = Cursor::new(statement);
    cursor.skip_trivia();
    if !cursor.eat_keyword("INSERT") {
        return None;
    }
    cursor.skip_trivia();

    while INSERT_MODIFIERS.iter().any(|m| cursor.eat_keyword(m)) {
        cursor.skip_trivia();
    }

    // SQLite conflict clause: INSERT OR REPLACE INTO ...
    if cursor.eat_keyword("OR") {
        cursor.skip_trivia();
        cursor.bare_word();
        cursor.skip_trivia();
    }

    if cursor.eat_keyword("INTO") {
        cursor.skip_trivia();
    }

    cursor.qualified_name()
}

/// Returns whether `statement` starts as a row insertion.
pub fn is_insert(statement: &str) -> bool {
    let mut cursor = Cursor::new(statement);
    cursor.skip_trivia();
    cursor.eat_keyword("INSERT")
}

/// Returns the target tables of every insertion in a `;`-separated batch.
///
/// Duplicates are kept; deduplication is the recorder's job.
pub fn inserted_tables(sql: &str) -> Vec<Cow<'_, str>> {
    statements(sql).filter_map(classify).collect()
}

/// Splits a batch into statements on `;` outside quotes and comments.
///
/// Empty statements (consecutive or trailing separators) are skipped.
pub fn statements(sql: &str) -> Statements<'_> {
    Statements { src: sql, pos: 0 }
}

/// Iterator over the statements of a batch. See [`statements`].
#[derive(Debug, Clone)]
pub struct Statements<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Iterator for Statements<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() {
            let start = self.pos;
            let end = statement_end(bytes, start);
            self.pos = if end < bytes.len() { end + 1 } else { end };
            let statement = &self.src[start..end];
            if !statement.trim().is_empty() {
                return Some(statement);
            }
        }
        None
    }
}

/// Returns the index of the `;` terminating the statement starting at `start`,
/// or `bytes.len()` when the statement runs to the end of the text.
fn statement_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b';' => return i,
            quote @ (b'\'' | b'"' | b'`') => i = skip_quoted(bytes, i + 1, quote),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line_comment(bytes, i + 2),
            b'#' => i = skip_line_comment(bytes, i + 1),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i + 2),
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Skips past the closing `quote`, treating a doubled quote as an escape.
fn skip_quoted(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_line_comment(bytes: &[u8], i: usize) -> usize {
    bytes[i..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |off| i + off + 1)
}

fn skip_block_comment(bytes: &[u8], i: usize) -> usize {
    bytes[i..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |off| i + off + 2)
}

/// Bytes allowed in an unquoted identifier. Non-ASCII bytes are accepted so
/// multi-byte UTF-8 names stay intact; the cursor only ever stops on ASCII.
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// Forward-only reader over statement text.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) {
        let bytes = self.bytes();
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'-') if bytes.get(self.pos + 1) == Some(&b'-') => {
                    self.pos = skip_line_comment(bytes, self.pos + 2);
                }
                Some(b'#') => self.pos = skip_line_comment(bytes, self.pos + 1),
                Some(b'/') if bytes.get(self.pos + 1) == Some(&b'*') => {
                    self.pos = skip_block_comment(bytes, self.pos + 2);
                }
                _ => return,
            }
        }
    }

    /// Reads an unquoted word without consuming anything after it.
    fn bare_word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_byte) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Consumes `keyword` if it is the next whole word, ignoring ASCII case.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let start = self.pos;
        if self.bare_word().eq_ignore_ascii_case(keyword) {
            true
        } else {
            self.pos = start;
            false
        }
    }

    /// Reads a possibly dot-qualified name and returns its last segment.
    ///
    /// A trailing dot with nothing after it keeps the segment before it.
    fn qualified_name(&mut self) -> Option<Cow<'a, str>> {
        let mut last = self.segment()?;
        while self.peek() == Some(b'.') {
            self.pos += 1;
            match self.segment() {
                Some(segment) => last = segment,
                None => break,
            }
        }
        Some(last)
    }

    /// Reads one identifier segment: bare, quoted, backticked or bracketed.
    fn segment(&mut self) -> Option<Cow<'a, str>> {
        let segment = match self.peek()? {
            b'"' => self.delimited(b'"', b'"'),
            b'`' => self.delimited(b'`', b'`'),
            b'[' => self.delimited(b'[', b']'),
            _ => Cow::Borrowed(self.bare_word()),
        };
        (!segment.is_empty()).then_some(segment)
    }

    /// Reads a delimited identifier, unescaping doubled closing delimiters.
    ///
    /// An unterminated identifier yields everything up to the end of the text.
    fn delimited(&mut self, open: u8, close: u8) -> Cow<'a, str> {
        debug_assert_eq!(self.peek(), Some(open));
        self.pos += 1;
        let bytes = self.bytes();
        let start = self.pos;
        let mut owned: Option<String> = None;
        let mut chunk_start = start;

        while self.pos < bytes.len() {
            if bytes[self.pos] == close {
                if bytes.get(self.pos + 1) == Some(&close) {
                    let buf = owned.get_or_insert_with(String::new);
                    buf.push_str(&self.src[chunk_start..=self.pos]);
                    self.pos += 2;
                    chunk_start = self.pos;
                    continue;
                }
                let tail = &self.src[chunk_start..self.pos];
                self.pos += 1;
                return match owned {
                    Some(mut buf) => {
                        buf.push_str(tail);
                        Cow::Owned(buf)
                    }
                    None => Cow::Borrowed(&self.src[start..self.pos - 1]),
                };
            }
            self.pos += 1;
        }

        let tail = &self.src[chunk_start..];
        match owned {
            Some(mut buf) => {
                buf.push_str(tail);
                Cow::Owned(buf)
            }
            None => Cow::Borrowed(tail),
        }
    }
}
