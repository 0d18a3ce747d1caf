use std::fmt::{self, Display};

const INDENT: &str = "  ";

/// Rendering of a value that is absent.
pub const NONE_MARKER: &str = "<none>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Brace,
    Bracket,
}

impl Delimiter {
    fn open(self) -> char {
        match self {
            Delimiter::Brace => '{',
            Delimiter::Bracket => '[',
        }
    }

    fn close(self) -> char {
        match self {
            Delimiter::Brace => '}',
            Delimiter::Bracket => ']',
        }
    }
}

// Displays the wrapped value, or the none marker when it is absent
pub struct OrNone<T>(pub Option<T>);

impl<T: Display> Display for OrNone<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str(NONE_MARKER),
        }
    }
}

/// Builds the nested `key = value` text block. Every entry starts on a
/// fresh line indented by its nesting depth.
pub struct TraceWriter {
    buf: String,
    open_blocks: Vec<Delimiter>,
}

impl TraceWriter {
    pub fn new(title: &str) -> Self {
        let mut buf = String::with_capacity(1024);
        buf.push_str(title);
        buf.push_str(" = {");
        TraceWriter {
            buf,
            open_blocks: vec![Delimiter::Brace],
        }
    }

    fn new_line(&mut self) {
        self.buf.push('\n');
        for _ in 0..self.open_blocks.len() {
            self.buf.push_str(INDENT);
        }
    }

    pub fn field(&mut self, name: &str, value: impl Display) {
        self.new_line();
        self.buf.push_str(name);
        self.buf.push_str(" = ");
        self.buf.push_str(&value.to_string());
    }

    pub fn optional<T: Display>(&mut self, name: &str, value: Option<T>) {
        self.field(name, OrNone(value));
    }

    // A bare entry without a key, such as a list item
    pub fn entry(&mut self, text: impl Display) {
        self.new_line();
        self.buf.push_str(&text.to_string());
    }

    pub fn open(&mut self, name: &str, delimiter: Delimiter) {
        self.new_line();
        self.buf.push_str(name);
        self.buf.push_str(" = ");
        self.buf.push(delimiter.open());
        self.open_blocks.push(delimiter);
    }

    pub fn close(&mut self) {
        if let Some(delimiter) = self.open_blocks.pop() {
            self.new_line();
            self.buf.push(delimiter.close());
        }
    }

    pub fn finish(mut self) -> String {
        while !self.open_blocks.is_empty() {
            self.close();
        }
        self.buf
    }
}
