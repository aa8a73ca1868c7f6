//! Splits a document into classified statements, one per non-blank line.

/// What a single line says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Statement<'a> {
    /// `section: <name>`
    SectionStart(&'a str),
    /// `end`
    End,
    /// `<name>:` opening a per-screen block.
    Header(&'a str),
    /// `<key> = <value>`
    Assign { key: &'a str, value: &'a str },
    /// A bare word, as used for aliases.
    Word(&'a str),
    /// `#@<key> <value>` or `#@<key> = <value>`.
    Directive { key: &'a str, value: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    pub statement: Statement<'a>,
}

/// Iterates the statements of `text`, skipping blank lines and comments.
pub(crate) fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.lines().enumerate().filter_map(|(index, raw)| {
        classify(raw).map(|statement| Line {
            number: index + 1,
            statement,
        })
    })
}

fn classify(raw: &str) -> Option<Statement<'_>> {
    let trimmed = raw.trim();
    if let Some(directive) = trimmed.strip_prefix("#@") {
        return Some(directive_statement(directive.trim()));
    }

    let content = match trimmed.find('#') {
        Some(pos) => trimmed[..pos].trim_end(),
        None => trimmed,
    };
    if content.is_empty() {
        return None;
    }

    if let Some(section) = content.strip_prefix("section:") {
        return Some(Statement::SectionStart(section.trim()));
    }
    if content == "end" {
        return Some(Statement::End);
    }
    if let Some((key, value)) = content.split_once('=') {
        return Some(Statement::Assign {
            key: key.trim(),
            value: value.trim(),
        });
    }
    if let Some(name) = content.strip_suffix(':') {
        return Some(Statement::Header(name.trim()));
    }
    Some(Statement::Word(content))
}

fn directive_statement(directive: &str) -> Statement<'_> {
    let (key, value) = match directive.split_once('=') {
        Some((key, value)) => (key, value),
        None => directive
            .split_once(char::is_whitespace)
            .unwrap_or((directive, "")),
    };
    Statement::Directive {
        key: key.trim(),
        value: value.trim(),
    }
}

/// Parses a boolean the way the engine does: `true`/`false` or `1`/`0`.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
