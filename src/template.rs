//! Filename / url mini-templates
//!
//! Supports `${site.name}` and `${group}` placeholders, each optionally
//! post-processed by a `.urlify()` slug transform, e.g.
//! `${site.name.urlify()}/${group.urlify()}.js`.

use crate::catalog::Site;

/// Turn a value into a url-safe slug: lowercase, whitespace and
/// underscores become dashes, everything else non-alphanumeric is dropped.
pub fn urlify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            'a'..='z' | '0'..='9' | '-' | '.' | '/' => slug.push(ch),
            'A'..='Z' => slug.push(ch.to_ascii_lowercase()),
            ' ' | '_' | '\t' => slug.push('-'),
            _ => {}
        }
    }
    slug
}

/// Render a bundle filename/url template for one site and group.
pub fn render(template: &str, site: &Site, group: &str) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                result.push_str(&expand(&after[..end], site, group));
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated placeholder is kept verbatim
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

fn expand(expression: &str, site: &Site, group: &str) -> String {
    let (path, slugged) = match expression.strip_suffix(".urlify()") {
        Some(path) => (path, true),
        None => (expression, false),
    };
    let value = match path.trim() {
        "site.name" => site.name.as_str(),
        "group" => group,
        // Unknown placeholders render empty rather than leaking syntax
        _ => "",
    };
    if slugged {
        urlify(value)
    } else {
        value.to_string()
    }
}
