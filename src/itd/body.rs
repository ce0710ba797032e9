//! Line-oriented builder for generated method bodies.

/// Indentation added per nesting level.
const INDENT: &str = "    ";

/// Accumulates the statements of a method body with relative indentation.
///
/// The output carries no outer indentation; the renderer indents the whole body to
/// its position inside the aspect.
///
/// # Examples
///
/// ```rust
/// use itdgen::itd::InvocableMemberBodyBuilder;
///
/// let mut body = InvocableMemberBodyBuilder::new();
/// body.append_formal_line("if (data != null) {");
/// body.indent();
/// body.append_formal_line("return;");
/// body.indent_remove();
/// body.append_formal_line("}");
/// assert_eq!(body.output(), "if (data != null) {\n    return;\n}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InvocableMemberBodyBuilder {
    lines: Vec<String>,
    level: usize,
}

impl InvocableMemberBodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one statement at the current level. An empty line stays empty.
    pub fn append_formal_line(&mut self, line: impl AsRef<str>) -> &mut Self {
        let line = line.as_ref();
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", INDENT.repeat(self.level), line));
        }
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    /// Step one level back out; does nothing at the outermost level.
    pub fn indent_remove(&mut self) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self
    }

    pub fn output(&self) -> String {
        self.lines.join("\n")
    }
}
