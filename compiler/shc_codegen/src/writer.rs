//! Indented line output.

pub(crate) struct Writer {
    output: String,
    indent: usize,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Writer {
            output: String::with_capacity(4096),
            indent: 0,
        }
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent at column zero");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write one indented line.
    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(text.as_ref());
        self.output.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }

    /// The text, ending in exactly one newline.
    pub(crate) fn finish(mut self) -> String {
        while self.output.ends_with("\n\n") {
            self.output.pop();
        }
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let mut out = Writer::new();
        out.line("a {");
        out.indent();
        out.line("b;");
        out.dedent();
        out.line("}");
        out.blank();
        out.blank();
        out.line("c");
        assert_eq!(out.finish(), "a {\n    b;\n}\n\nc\n");
    }
}
