//! Best-effort extraction of JSON objects from free-form text.

use std::str::CharIndices;

use serde_json::Value;

/// A balanced `{...}` span waiting on the braces still open around it.
#[derive(Debug, Clone, Copy)]
struct Span {
    /// Open braces enclosing the span when it closed.
    level: usize,
    start: usize,
    end: usize,
}

/// Lazy iterator over the JSON objects embedded in a text blob.
///
/// Braces are matched in a single pass. Every outermost balanced span is
/// parsed; spans that fail to parse are skipped. A `{` that is never closed
/// does not count as enclosing anything, so a stray opening brace does not
/// hide the objects that follow it. A `}` with nothing open is ignored.
#[derive(Debug, Clone)]
pub struct CommandBlocks<'a> {
    text: &'a str,
    chars: CharIndices<'a>,
    open: Vec<usize>,
    // Spans inside braces that may still close. In document order.
    pending: Vec<Span>,
    flushed: Option<usize>,
}

impl<'a> CommandBlocks<'a> {
    /// Start scanning `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices(),
            open: Vec::new(),
            pending: Vec::new(),
            flushed: None,
        }
    }

    fn parse(&self, start: usize, end: usize) -> Option<Value> {
        match serde_json::from_str::<Value>(&self.text[start..=end]) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed command fragment");
                None
            }
        }
    }

    // Input exhausted: every brace still open is unmatched, so the spans
    // waiting on them are outermost after all.
    fn next_flushed(&mut self) -> Option<Value> {
        loop {
            let index = self.flushed.get_or_insert(0);
            let span = *self.pending.get(*index)?;
            *index += 1;
            if let Some(value) = self.parse(span.start, span.end) {
                return Some(value);
            }
        }
    }
}

impl Iterator for CommandBlocks<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.flushed.is_some() {
            return self.next_flushed();
        }

        while let Some((i, ch)) = self.chars.next() {
            match ch {
                '{' => self.open.push(i),
                '}' => {
                    let Some(start) = self.open.pop() else {
                        continue;
                    };
                    let level = self.open.len();
                    // Spans nested in this one can never be outermost.
                    while self.pending.last().is_some_and(|span| span.level > level) {
                        self.pending.pop();
                    }
                    if level > 0 {
                        self.pending.push(Span {
                            level,
                            start,
                            end: i,
                        });
                    } else if let Some(value) = self.parse(start, i) {
                        return Some(value);
                    }
                }
                _ => {}
            }
        }

        self.open.clear();
        self.next_flushed()
    }
}

/// Collect every JSON object in `text`, in order of appearance.
#[must_use]
pub fn extract_commands(text: &str) -> Vec<Value> {
    CommandBlocks::new(text).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_two_objects_amid_prose_and_unbalanced_fragment() {
        let text = r#"Sure! First I will create it:
{"action": "set_structure", "arguments": {"name": "user_profile", "fields": []}}
and then show the project
```json
{"action": "get_project_data", "arguments": {}}
```
Let me know if you need { anything else"#;

        let blocks = extract_commands(text);
        assert_eq!(
            blocks,
            vec![
                json!({"action": "set_structure", "arguments": {"name": "user_profile", "fields": []}}),
                json!({"action": "get_project_data", "arguments": {}}),
            ]
        );
    }

    #[test]
    fn test_malformed_span_is_skipped() {
        let text = r#"{"a": 1} {not json} {"b": 2}"#;
        assert_eq!(extract_commands(text), vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn test_stray_open_brace_before_objects() {
        let text = r#"here { is what I came up with {"a": 1} and {"b": {"c": 2}}"#;
        assert_eq!(
            extract_commands(text),
            vec![json!({"a": 1}), json!({"b": {"c": 2}})]
        );
    }

    #[test]
    fn test_stray_close_brace_is_ignored() {
        let text = r#"}} {"a": 1} }"#;
        assert_eq!(extract_commands(text), vec![json!({"a": 1})]);
    }

    #[test]
    fn test_no_objects() {
        assert!(extract_commands("").is_empty());
        assert!(extract_commands("no json here").is_empty());
        assert!(extract_commands("{{{").is_empty());
    }

    #[test]
    fn test_multibyte_text_around_objects() {
        let text = "✅ résultat: {\"name\": \"café\"} 👉 {\"n\": 1}";
        assert_eq!(
            extract_commands(text),
            vec![json!({"name": "café"}), json!({"n": 1})]
        );
    }

    #[test]
    fn test_scan_is_restartable() {
        let text = r#"x {"a": 1} y {"b": 2} z"#;
        let first: Vec<_> = CommandBlocks::new(text).collect();
        let second: Vec<_> = CommandBlocks::new(text).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_objects_inside_unclosed_brace_keep_their_nesting() {
        let text = r#"{ draft {"a": {"b": 1}} then {"c": 2}"#;
        assert_eq!(
            extract_commands(text),
            vec![json!({"a": {"b": 1}}), json!({"c": 2})]
        );
    }

    #[test]
    fn test_enclosed_spans_dropped_once_outer_brace_closes() {
        let text = r#"{ {"a": 1} not json }"#;
        assert!(extract_commands(text).is_empty());
    }

    #[test]
    fn test_long_run_of_unclosed_braces() {
        let mut text = "{".repeat(200_000);
        text.push_str(r#"{"a": 1} "#);
        text.push_str(&"{ ".repeat(200_000));
        text.push_str(r#"{"b": 2}"#);
        assert_eq!(extract_commands(&text), vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn test_iterator_is_lazy() {
        let mut blocks = CommandBlocks::new(r#"{"a": 1} {"b": 2}"#);
        assert_eq!(blocks.next(), Some(json!({"a": 1})));
        assert_eq!(blocks.next(), Some(json!({"b": 2})));
        assert_eq!(blocks.next(), None);
        assert_eq!(blocks.next(), None);
    }
}
