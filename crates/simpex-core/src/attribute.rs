use regex::Regex;
use std::sync::LazyLock;

use tracing::debug;

use crate::catalogs::MAX_MACRO_DEPTH;
use crate::error::{ImpexError, Result};
use crate::macros::MacroTable;
use crate::types::*;

static RE_BASE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?[A-Za-z_][\w.\-]*$").unwrap());
static RE_QUALIFIER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][\w.\-]*$").unwrap());
static RE_MACRO_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$([A-Za-z_]\w*)(.*)$").unwrap());

/// Parse one declaration token into the columns it produces.
///
/// Plain tokens yield exactly one spec; `$name` tokens yield the macro's full
/// expansion, each spec tagged as a macro column.
pub fn parse_declaration(token: &str, macros: &MacroTable) -> Result<Vec<AttributeSpec>> {
    let mut stack = Vec::new();
    expand(token, macros, &mut stack)
}

/// Parse a token that must not reference a macro.
pub fn parse_plain(token: &str) -> Result<AttributeSpec> {
    let token = token.trim();
    let split = token.find(['(', '[']).unwrap_or(token.len());
    let base = token[..split].trim_end();

    if base.is_empty() {
        return Err(ImpexError::syntax(token, "empty attribute name"));
    }
    if !RE_BASE_NAME.is_match(base) {
        return Err(ImpexError::syntax(
            token,
            format!("invalid attribute name '{base}'"),
        ));
    }

    let mut nested: Option<String> = None;
    let mut qualifiers: Option<Vec<Qualifier>> = None;
    let mut rest = &token[split..];

    while !rest.is_empty() {
        let end = closing_index(rest, token)?;
        let inner = &rest[1..end];
        if rest.starts_with('(') {
            if nested.is_some() {
                return Err(ImpexError::syntax(token, "more than one (...) block"));
            }
            if inner.trim().is_empty() {
                return Err(ImpexError::syntax(token, "empty nested reference"));
            }
            nested = Some(inner.trim().to_string());
        } else {
            if qualifiers.is_some() {
                return Err(ImpexError::syntax(token, "more than one [...] block"));
            }
            qualifiers = Some(parse_qualifiers(inner, token)?);
        }
        rest = rest[end + 1..].trim_start();
    }

    Ok(AttributeSpec {
        raw_name: token.to_string(),
        base_name: base.to_string(),
        nested_attribute: nested,
        qualifiers: qualifiers.unwrap_or_default(),
        is_macro: false,
        macro_name: None,
        declaration: token.to_string(),
    })
}

fn expand(
    token: &str,
    macros: &MacroTable,
    stack: &mut Vec<String>,
) -> Result<Vec<AttributeSpec>> {
    let token = token.trim();
    if token.starts_with('$') {
        expand_macro(token, macros, stack)
    } else {
        parse_plain(token).map(|spec| vec![spec])
    }
}

fn expand_macro(
    token: &str,
    macros: &MacroTable,
    stack: &mut Vec<String>,
) -> Result<Vec<AttributeSpec>> {
    let caps = RE_MACRO_REF
        .captures(token)
        .ok_or_else(|| ImpexError::syntax(token, "invalid macro reference"))?;
    let name = caps[1].to_string();
    let trailer = caps[2].trim();

    // `$macro[key=value]` overrides qualifiers on every expanded column
    let overrides = if trailer.is_empty() {
        Vec::new()
    } else if trailer.starts_with('[') && closing_index(trailer, token)? == trailer.len() - 1 {
        parse_qualifiers(&trailer[1..trailer.len() - 1], token)?
    } else {
        return Err(ImpexError::syntax(
            token,
            "a macro reference may only be followed by a [...] block",
        ));
    };

    if stack.contains(&name) || stack.len() >= MAX_MACRO_DEPTH {
        let mut chain: Vec<String> = stack.iter().map(|n| format!("${n}")).collect();
        chain.push(format!("${name}"));
        return Err(ImpexError::MacroRecursion {
            name,
            chain: chain.join(" -> "),
        });
    }

    let body = macros
        .get(&name)
        .ok_or_else(|| ImpexError::UnknownMacro { name: name.clone() })?;
    let body_tokens = split_top_level(body, |c| c.is_whitespace(), token)?;
    if body_tokens.is_empty() {
        return Err(ImpexError::syntax(token, "macro body is empty"));
    }

    stack.push(name.clone());
    let mut specs = Vec::new();
    for body_token in body_tokens {
        for mut spec in expand(body_token, macros, stack)? {
            if !overrides.is_empty() {
                apply_overrides(&mut spec, &overrides);
            }
            spec.raw_name = token.to_string();
            spec.is_macro = true;
            spec.macro_name = Some(name.clone());
            specs.push(spec);
        }
    }
    stack.pop();

    debug!(macro_name = %name, columns = specs.len(), "expanded macro");
    Ok(specs)
}

fn apply_overrides(spec: &mut AttributeSpec, overrides: &[Qualifier]) {
    for o in overrides {
        match spec.qualifiers.iter_mut().find(|q| q.key == o.key) {
            Some(existing) => existing.value = o.value.clone(),
            None => spec.qualifiers.push(o.clone()),
        }
    }
    spec.declaration = render_declaration(spec);
}

/// Rebuild a declaration from its parts: `base(nested)[k=v,...]`.
pub fn render_declaration(spec: &AttributeSpec) -> String {
    let mut out = spec.base_name.clone();
    if let Some(ref nested) = spec.nested_attribute {
        out.push('(');
        out.push_str(nested);
        out.push(')');
    }
    if !spec.qualifiers.is_empty() {
        let pairs: Vec<String> = spec
            .qualifiers
            .iter()
            .map(|q| format!("{}={}", q.key, q.value))
            .collect();
        out.push('[');
        out.push_str(&pairs.join(","));
        out.push(']');
    }
    out
}

fn parse_qualifiers(inner: &str, token: &str) -> Result<Vec<Qualifier>> {
    if inner.trim().is_empty() {
        return Err(ImpexError::syntax(token, "empty qualifier block"));
    }

    let mut qualifiers: Vec<Qualifier> = Vec::new();
    for part in split_top_level(inner, |c| c == ',', token)? {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            ImpexError::syntax(token, format!("qualifier '{part}' is not a key=value pair"))
        })?;
        let key = key.trim();
        if !RE_QUALIFIER_KEY.is_match(key) {
            return Err(ImpexError::syntax(
                token,
                format!("invalid qualifier key '{key}'"),
            ));
        }
        if qualifiers.iter().any(|q| q.key == key) {
            return Err(ImpexError::syntax(
                token,
                format!("duplicate qualifier '{key}'"),
            ));
        }
        qualifiers.push(Qualifier {
            key: key.to_string(),
            value: value.trim().to_string(),
        });
    }
    Ok(qualifiers)
}

/// Byte index of the bracket closing the one `s` starts with.
fn closing_index(s: &str, token: &str) -> Result<usize> {
    let mut expected: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
                prev = Some(c);
            }
            continue;
        }
        let after = prev;
        if !c.is_whitespace() {
            prev = Some(c);
        }
        match c {
            '\'' | '"' if !expected.is_empty() && opens_quote(after) => quote = Some(c),
            '(' => expected.push(')'),
            '[' => expected.push(']'),
            ')' | ']' => {
                if expected.pop() != Some(c) {
                    return Err(ImpexError::syntax(token, format!("unbalanced '{c}'")));
                }
                if expected.is_empty() {
                    return Ok(i);
                }
            }
            _ if expected.is_empty() => {
                return Err(ImpexError::syntax(
                    token,
                    format!("unexpected '{c}' after attribute name"),
                ));
            }
            _ => {}
        }
    }

    match expected.last() {
        Some(close) => Err(ImpexError::syntax(
            token,
            format!("missing closing '{close}'"),
        )),
        None => Err(ImpexError::syntax(token, "unexpected end of declaration")),
    }
}

/// Split `s` at separator characters that sit outside brackets, parens and
/// quotes. Empty pieces are skipped.
pub(crate) fn split_top_level<'a, F>(
    s: &'a str,
    is_separator: F,
    token: &str,
) -> Result<Vec<&'a str>>
where
    F: Fn(char) -> bool,
{
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
                prev = Some(c);
            }
            continue;
        }
        let after = prev;
        if !c.is_whitespace() {
            prev = Some(c);
        }
        match c {
            '\'' | '"' if opens_quote(after) => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ImpexError::syntax(token, format!("unbalanced '{c}'")));
                }
            }
            c if depth == 0 && is_separator(c) => {
                let piece = s[start..i].trim();
                if !piece.is_empty() {
                    parts.push(piece);
                }
                start = i + c.len_utf8();
                prev = None;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ImpexError::syntax(token, "unbalanced brackets"));
    }
    if let Some(q) = quote {
        return Err(ImpexError::syntax(token, format!("unterminated {q} quote")));
    }
    let piece = s[start..].trim();
    if !piece.is_empty() {
        parts.push(piece);
    }
    Ok(parts)
}

/// A quote only delimits a value it starts; `Men's` stays plain text.
fn opens_quote(prev: Option<char>) -> bool {
    matches!(prev, None | Some('=' | '[' | '(' | ','))
}
