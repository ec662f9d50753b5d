//! Command Lexer
//!
//! Turns source text into a flat command list. A command is one logical
//! line; a line continues onto the next when a bracket or a string (with a
//! trailing escape) is still open. Comments start with `#` outside strings
//! and run to the end of the physical line.

use super::types::{Command, Segment, SyntaxError};

/// Parse source text into a command list.
pub fn parse(source: &str, file_path: &str) -> Result<Vec<Command>, SyntaxError> {
    let mut commands = Vec::new();

    let mut buf = String::new();
    let mut start_line = 0usize;
    let mut quote: Option<char> = None;
    let mut depth = 0i32;
    let mut last_line = 0usize;

    for (lineno, line) in source.lines().enumerate() {
        let lineno = lineno + 1;
        last_line = lineno;
        if buf.is_empty() {
            start_line = lineno;
        }

        let mut escaped = false;
        let mut chars = line.chars();
        while let Some(c) = chars.next() {
            if let Some(q) = quote {
                if escaped {
                    buf.push(c);
                    escaped = false;
                } else if c == '\\' {
                    buf.push(c);
                    escaped = true;
                } else {
                    buf.push(c);
                    if c == q {
                        quote = None;
                    }
                }
                continue;
            }
            match c {
                '\'' | '"' => {
                    quote = Some(c);
                    buf.push(c);
                }
                '#' => {
                    // comment: drop the rest of the physical line
                    while chars.next().is_some() {}
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    buf.push(c);
                }
                ')' | ']' | '}' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(SyntaxError::new(
                            format!("unexpected \"{}\"", c),
                            file_path,
                            lineno,
                        ));
                    }
                    buf.push(c);
                }
                _ => buf.push(c),
            }
        }

        if quote.is_some() {
            if escaped {
                // escaped newline inside a string: the literal spans lines
                buf.push('n');
                continue;
            }
            return Err(SyntaxError::new(
                "unterminated string literal",
                file_path,
                lineno,
            ));
        }
        if depth > 0 {
            // open bracket: logical line continues; the newline survives so
            // inline sub-program bodies keep their command boundaries
            buf.push('\n');
            continue;
        }

        flush_command(&mut commands, &mut buf, file_path, start_line);
    }

    if quote.is_some() {
        return Err(SyntaxError::new(
            "unterminated string literal",
            file_path,
            last_line,
        ));
    }
    if depth > 0 {
        return Err(SyntaxError::new("unterminated bracket", file_path, last_line));
    }
    flush_command(&mut commands, &mut buf, file_path, start_line);

    for (i, cmd) in commands.iter_mut().enumerate() {
        cmd.index = i;
    }
    Ok(commands)
}

fn flush_command(commands: &mut Vec<Command>, buf: &mut String, file_path: &str, line: usize) {
    let source = buf.trim().to_string();
    buf.clear();
    if source.is_empty() {
        return;
    }

    let (head, args_text) = match source.find(char::is_whitespace) {
        Some(pos) => (source[..pos].to_string(), source[pos..].trim().to_string()),
        None => (source.clone(), String::new()),
    };
    let args = split_args(&args_text);

    commands.push(Command {
        file_path: file_path.to_string(),
        line_number: line,
        source,
        head,
        args_text,
        args,
        index: 0,
    });
}

/// Split an expression into ordered code/string segments. String escape
/// sequences are decoded into the segment text. Used by the evaluator so
/// that name substitution never happens inside string literals. Inline
/// sub-programs (`%{ ... }%`) stay inside code segments untouched; their
/// text is parsed as commands only when they run.
pub fn parse_string(text: &str) -> Result<Vec<Segment>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if c == '%' && chars.get(i + 1) == Some(&'{') {
            let end = skip_inline_block(&chars, i + 2)
                .ok_or_else(|| "unterminated inline call \"%{\"".to_string())?;
            current.extend(&chars[i..end]);
            i = end;
            continue;
        }
        if c == '\'' || c == '"' {
            if !current.is_empty() {
                segments.push(Segment::code(std::mem::take(&mut current)));
            }
            let (content, next) = decode_string_literal(&chars, i)?;
            segments.push(Segment::string(content));
            i = next;
            continue;
        }
        current.push(c);
        i += 1;
    }
    if !current.is_empty() {
        segments.push(Segment::code(current));
    }
    Ok(segments)
}

/// Decode a quoted literal starting at `start` (the quote character).
/// Returns the decoded content and the index just past the closing quote.
fn decode_string_literal(chars: &[char], start: usize) -> Result<(String, usize), String> {
    let quote = chars[start];
    let mut content = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            match chars.get(i + 1) {
                Some('n') => content.push('\n'),
                Some('t') => content.push('\t'),
                Some('r') => content.push('\r'),
                Some('0') => content.push('\0'),
                Some('\\') => content.push('\\'),
                Some('\'') => content.push('\''),
                Some('"') => content.push('"'),
                Some(other) => {
                    content.push('\\');
                    content.push(*other);
                }
                None => return Err("unterminated string literal".to_string()),
            }
            i += 2;
            continue;
        }
        if c == quote {
            return Ok((content, i + 1));
        }
        content.push(c);
        i += 1;
    }
    Err("unterminated string literal".to_string())
}

/// Skip past an inline block whose body starts at `start` (just after the
/// opening `%{`). Returns the index just past the closing `}%`, honoring
/// nesting and string literals inside the body.
fn skip_inline_block(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' || c == '"' {
            i = skip_string_literal(chars, i)?;
            continue;
        }
        if c == '%' && chars.get(i + 1) == Some(&'{') {
            depth += 1;
            i += 2;
            continue;
        }
        if c == '}' && chars.get(i + 1) == Some(&'%') {
            if depth == 0 {
                return Some(i + 2);
            }
            depth -= 1;
            i += 2;
            continue;
        }
        i += 1;
    }
    None
}

/// Skip past a quoted literal starting at `start` (the quote character).
/// Returns the index just past the closing quote.
fn skip_string_literal(chars: &[char], start: usize) -> Option<usize> {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == quote {
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

/// Shallow-split argument text on whitespace, honoring string literals and
/// balanced `()`, `[]`, `{}`.
pub fn split_args(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Split at the first top-level `=` that is not part of `==`, `!=`, `<=`
/// or `>=`, honoring strings and brackets. Returns `None` when the text
/// contains no assignment operator.
pub fn split_by_equals(text: &str) -> Option<(String, String)> {
    let chars: Vec<char> = text.chars().collect();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '=' if depth == 0 => {
                let prev = if i > 0 { chars[i - 1] } else { '\0' };
                let next = if i + 1 < chars.len() { chars[i + 1] } else { '\0' };
                if prev != '=' && prev != '!' && prev != '<' && prev != '>' && next != '=' {
                    let lhs: String = chars[..i].iter().collect();
                    let rhs: String = chars[i + 1..].iter().collect();
                    return Some((lhs, rhs));
                }
                if next == '=' {
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let cmds = parse("print(\"hi\")\n$x = 5\n", "<test>").unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].head, "print(\"hi\")");
        assert_eq!(cmds[1].head, "$x");
        assert_eq!(cmds[1].args_text, "= 5");
        assert_eq!(cmds[1].line_number, 2);
        assert_eq!(cmds[1].index, 1);
    }

    #[test]
    fn test_parse_comments_and_blank_lines() {
        let cmds = parse("# a comment\n\npass # trailing\n", "<test>").unwrap();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].head, "pass");
        assert_eq!(cmds[0].line_number, 3);
    }

    #[test]
    fn test_parse_hash_inside_string() {
        let cmds = parse("print(\"a # b\")", "<test>").unwrap();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].source, "print(\"a # b\")");
    }

    #[test]
    fn test_parse_line_continuation_in_brackets() {
        let cmds = parse("$x = [1,\n2,\n3]", "<test>").unwrap();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].source, "$x = [1,\n2,\n3]");
        assert_eq!(cmds[0].line_number, 1);
    }

    #[test]
    fn test_parse_unterminated_string() {
        let err = parse("print(\"oops\n", "<test>").unwrap_err();
        assert!(err.message.contains("unterminated string"));
        assert_eq!(err.line_number, 1);
    }

    #[test]
    fn test_parse_unterminated_bracket() {
        let err = parse("$x = (1 + 2\n", "<test>").unwrap_err();
        assert!(err.message.contains("unterminated bracket"));
    }

    #[test]
    fn test_parse_unbalanced_close() {
        let err = parse("$x = 1)\n", "<test>").unwrap_err();
        assert!(err.message.contains("unexpected"));
    }

    #[test]
    fn test_parse_string_segments() {
        let segs = parse_string("1 + \"a b\" + $x").unwrap();
        assert_eq!(segs.len(), 3);
        assert!(!segs[0].is_string);
        assert_eq!(segs[0].text, "1 + ");
        assert!(segs[1].is_string);
        assert_eq!(segs[1].text, "a b");
        assert_eq!(segs[2].text, " + $x");
    }

    #[test]
    fn test_parse_string_escapes() {
        let segs = parse_string("\"a\\n\\\"b\\\"\"").unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].text, "a\n\"b\"");
    }

    #[test]
    fn test_parse_string_keeps_inline_blocks_in_code() {
        let segs = parse_string("%{ mem (\"}%\") }% + $x").unwrap();
        assert_eq!(segs.len(), 1);
        assert!(!segs[0].is_string);
        assert_eq!(segs[0].text, "%{ mem (\"}%\") }% + $x");
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args("a b c"), vec!["a", "b", "c"]);
        assert_eq!(split_args("f(1, 2) x"), vec!["f(1, 2)", "x"]);
        assert_eq!(split_args("\"a b\" c"), vec!["\"a b\"", "c"]);
        assert!(split_args("").is_empty());
    }

    #[test]
    fn test_split_by_equals() {
        let (l, r) = split_by_equals("$x = 1 + 2").unwrap();
        assert_eq!(l.trim(), "$x");
        assert_eq!(r.trim(), "1 + 2");
        assert!(split_by_equals("1 == 2").is_none());
        assert!(split_by_equals("1 != 2").is_none());
        assert!(split_by_equals("1 <= 2").is_none());
        assert!(split_by_equals("\"a=b\"").is_none());
        let (l, _) = split_by_equals("$m[\"k=v\"] = 3").unwrap();
        assert_eq!(l.trim(), "$m[\"k=v\"]");
    }
}
