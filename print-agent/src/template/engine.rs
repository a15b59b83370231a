//! Template compiler
//!
//! Two passes over the markup: block resolution (`{{#each}}`, `{{#if}}`)
//! and variable substitution, then line-by-line classification into
//! [`Instruction`]s. A malformed directive never fails the compile; the
//! line degrades to plain text so the queue keeps moving.

use super::Instruction;
use cupom_printer::Alignment;
use serde_json::Value;

/// Compile a markup template against a context into instructions
pub fn compile(template: &str, ctx: &Value) -> Vec<Instruction> {
    let resolved = resolve_each(template, ctx);
    let resolved = resolve_if(&resolved, ctx);
    let resolved = substitute_vars(&resolved, ctx);

    resolved.split('\n').filter_map(parse_line).collect()
}

// --- Block resolution --------------------------------------------------------

/// Expand `{{#each name}}body{{/each}}` blocks
///
/// The body is resolved once per array element with the element's fields
/// merged over the outer context. `each` does not nest; an unterminated
/// block survives as literal text so the defect is visible on paper.
fn resolve_each(template: &str, ctx: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{#each ") {
        out.push_str(&rest[..start]);
        let after_tag = &rest[start + 8..];

        let Some(name_end) = after_tag.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = after_tag[..name_end].trim();
        let body_and_rest = &after_tag[name_end + 2..];

        let Some(close) = body_and_rest.find("{{/each}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let body = &body_and_rest[..close];

        if let Some(Value::Array(items)) = lookup(ctx, name) {
            for item in items {
                let merged = merge_context(ctx, item);
                let expanded = resolve_if(body, &merged);
                out.push_str(&substitute_vars(&expanded, &merged));
            }
        }

        rest = &body_and_rest[close + "{{/each}}".len()..];
    }

    out.push_str(rest);
    out
}

/// Resolve `{{#if key}}body{{/if}}` blocks, innermost-aware
///
/// The closing tag is matched with nesting balance, and kept bodies are
/// resolved recursively, so conditionals nest to any depth.
fn resolve_if(template: &str, ctx: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{#if ") {
        out.push_str(&rest[..start]);
        let after_tag = &rest[start + 6..];

        let Some(name_end) = after_tag.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = after_tag[..name_end].trim();
        let body_and_rest = &after_tag[name_end + 2..];

        let Some(close) = find_matching_endif(body_and_rest) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let body = &body_and_rest[..close];

        if truthy(lookup(ctx, name)) {
            out.push_str(&resolve_if(body, ctx));
        }

        rest = &body_and_rest[close + "{{/if}}".len()..];
    }

    out.push_str(rest);
    out
}

/// Offset of the `{{/if}}` that closes the block whose body starts at 0
fn find_matching_endif(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = 0usize;

    loop {
        let open = s[pos..].find("{{#if ");
        let close = s[pos..].find("{{/if}}")?;

        match open {
            Some(o) if o < close => {
                depth += 1;
                pos += o + "{{#if ".len();
            }
            _ => {
                if depth == 0 {
                    return Some(pos + close);
                }
                depth -= 1;
                pos += close + "{{/if}}".len();
            }
        }
    }
}

/// Truthiness of a context value, JS-style
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

/// Merge an array element's fields over the outer context
fn merge_context(outer: &Value, item: &Value) -> Value {
    match (outer, item) {
        (Value::Object(base), Value::Object(fields)) => {
            let mut merged = base.clone();
            for (k, v) in fields {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        }
        _ => outer.clone(),
    }
}

// --- Variable substitution ---------------------------------------------------

/// Replace `{{dotted.path}}` tokens with the string form of the resolved
/// value; null/missing resolve to the empty string
fn substitute_vars(s: &str, ctx: &Value) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("{{") {
        let Some(end_rel) = rest[start + 2..].find("}}") else {
            break;
        };
        let token = rest[start + 2..start + 2 + end_rel].trim();

        if is_var_path(token) {
            out.push_str(&rest[..start]);
            if let Some(value) = lookup(ctx, token) {
                out.push_str(&value_to_string(value));
            }
            rest = &rest[start + 2 + end_rel + 2..];
        } else {
            // block tags or garbage: emit the braces literally and move on
            out.push_str(&rest[..start + 2]);
            rest = &rest[start + 2..];
        }
    }

    out.push_str(rest);
    out
}

fn is_var_path(token: &str) -> bool {
    !token.is_empty()
        && !token.starts_with('.')
        && !token.ends_with('.')
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Resolve a dotted path into a nested context object
fn lookup<'a>(ctx: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = ctx;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

// --- Line classification -----------------------------------------------------

/// Classify one resolved line into exactly one instruction
///
/// Directive markers are exact and line-anchored; anything else is a text
/// line with trailing whitespace removed.
fn parse_line(raw: &str) -> Option<Instruction> {
    let line = raw.trim_end();

    if line == "[SEP]" || line == "[SEP:-]" {
        return Some(Instruction::Separator('-'));
    }
    if line == "[SEP:=]" {
        return Some(Instruction::Separator('='));
    }
    if line == "[CUT]" {
        return Some(Instruction::Cut);
    }

    if line.eq_ignore_ascii_case("[BOLD:on]") {
        return Some(Instruction::Bold(true));
    }
    if line.eq_ignore_ascii_case("[BOLD:off]") {
        return Some(Instruction::Bold(false));
    }

    if let Some(value) = strip_directive(line, "[ALIGN:") {
        match value.to_ascii_lowercase().as_str() {
            "left" => return Some(Instruction::Align(Alignment::Left)),
            "center" => return Some(Instruction::Align(Alignment::Center)),
            "right" => return Some(Instruction::Align(Alignment::Right)),
            _ => {}
        }
    }

    if let Some(value) = strip_directive(line, "[SIZE:")
        && let Ok(mult) = value.parse::<u8>()
    {
        return Some(Instruction::Size(mult.clamp(1, 8)));
    }

    if let Some(value) = strip_directive(line, "[FEED:")
        && let Ok(lines) = value.parse::<u8>()
    {
        return Some(Instruction::Feed(lines));
    }

    if let Some(data) = strip_directive(line, "[QR:") {
        let data = data.trim();
        if data.is_empty() {
            return None;
        }
        return Some(Instruction::Qr(data.to_string()));
    }

    Some(Instruction::Text(line.to_string()))
}

fn strip_directive<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let upper = line.get(..prefix.len())?;
    if upper.eq_ignore_ascii_case(prefix) {
        line[prefix.len()..].strip_suffix(']')
    } else {
        None
    }
}
