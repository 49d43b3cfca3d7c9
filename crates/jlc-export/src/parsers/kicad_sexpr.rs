/// S-expression parser for KiCad board files.
///
/// Grammar:
///   sexpr  = '(' sexpr* ')' | atom
///   atom   = string | symbol
///   string = '"' ( [^"\\] | '\\' any )* '"'
///   symbol = [^ \t\n\r()"]+
///
/// Numbers are kept as symbols and parsed on access.

#[derive(Debug, Clone, PartialEq)]
pub enum SExpr {
    List(Vec<SExpr>),
    Atom(String),
}

impl SExpr {
    /// First atom of a list, e.g. `footprint` in `(footprint "R_0603" ...)`.
    pub fn tag(&self) -> Option<&str> {
        match self {
            SExpr::List(items) => items.first().and_then(SExpr::as_atom),
            _ => None,
        }
    }

    /// Everything after the tag.
    pub fn children(&self) -> &[SExpr] {
        match self {
            SExpr::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    pub fn find(&self, tag: &str) -> Option<&SExpr> {
        self.children().iter().find(|c| c.tag() == Some(tag))
    }

    /// First atom of the `(tag value)` child.
    pub fn value(&self, tag: &str) -> Option<&str> {
        self.find(tag).and_then(|node| node.atom_at(0))
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Nth atom after the tag.
    pub fn atom_at(&self, index: usize) -> Option<&str> {
        self.children().get(index).and_then(SExpr::as_atom)
    }

    pub fn f64_at(&self, index: usize) -> Option<f64> {
        self.atom_at(index).and_then(|v| v.parse().ok())
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn parse_string(&mut self) -> Result<String, String> {
        let start = self.pos;
        self.pos += 1;
        // Collect raw bytes so multi-byte UTF-8 (e.g. "4.7µF") survives intact.
        let mut bytes = Vec::new();
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'"' => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
                b'\\' => match self.peek() {
                    Some(escaped) => {
                        self.pos += 1;
                        bytes.push(match escaped {
                            b'n' => b'\n',
                            b't' => b'\t',
                            other => other,
                        });
                    }
                    None => break,
                },
                _ => bytes.push(b),
            }
        }
        Err(format!("unterminated string starting at byte {start}"))
    }

    fn parse_symbol(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'(' | b')' | b'"') {
                break;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn parse_sexpr(&mut self) -> Result<SExpr, String> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'(') => {
                let start = self.pos;
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        Some(b')') => {
                            self.pos += 1;
                            return Ok(SExpr::List(items));
                        }
                        None => {
                            return Err(format!("unclosed list starting at byte {start}"));
                        }
                        _ => items.push(self.parse_sexpr()?),
                    }
                }
            }
            Some(b'"') => self.parse_string().map(SExpr::Atom),
            Some(b')') => Err(format!("unexpected ')' at byte {}", self.pos)),
            Some(_) => Ok(SExpr::Atom(self.parse_symbol())),
            None => Err("empty input".to_string()),
        }
    }
}

/// Parse a single top-level S-expression from bytes.
pub fn parse(input: &[u8]) -> Result<SExpr, String> {
    let mut parser = Parser::new(input);
    parser.parse_sexpr()
}
