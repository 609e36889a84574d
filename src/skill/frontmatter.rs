// src/skill/frontmatter.rs

use serde_yaml::{Mapping, Value};

pub struct ParsedSkill {
    pub frontmatter: Option<Mapping>,
    pub body: String,
    pub error: Option<String>,
}

/// Splits `---` fenced YAML frontmatter from a SKILL.md body.
///
/// The error cases are reported, not returned as Err: the validator
/// turns them into CRITICAL issues.
pub fn parse_frontmatter(content: &str) -> ParsedSkill {
    if !content.starts_with("---") {
        return ParsedSkill {
            frontmatter: None,
            body: content.to_string(),
            error: Some("No YAML frontmatter found (must start with ---)".to_string()),
        };
    }

    let after_open = &content[3..];
    let after_open = after_open.strip_prefix('\n').unwrap_or(after_open);
    let Some(close) = after_open.find("\n---") else {
        return ParsedSkill {
            frontmatter: None,
            body: content.to_string(),
            error: Some("Invalid frontmatter format (missing closing ---)".to_string()),
        };
    };

    let frontmatter_text = &after_open[..close];
    let rest = &after_open[close + 4..];
    let body = rest.strip_prefix('\n').unwrap_or(rest).to_string();

    match serde_yaml::from_str::<Value>(frontmatter_text) {
        Ok(Value::Mapping(map)) => ParsedSkill {
            frontmatter: Some(map),
            body,
            error: None,
        },
        Ok(_) => ParsedSkill {
            frontmatter: None,
            body,
            error: Some("Frontmatter must be a YAML dictionary".to_string()),
        },
        Err(e) => ParsedSkill {
            frontmatter: None,
            body,
            error: Some(format!("Invalid YAML in frontmatter: {e}")),
        },
    }
}

/// String-typed field access; non-string values read as None.
pub fn str_field<'a>(map: &'a Mapping, key: &str) -> Option<&'a str> {
    map.get(Value::String(key.to_string()))
        .and_then(Value::as_str)
}

pub fn bool_field(map: &Mapping, key: &str) -> bool {
    map.get(Value::String(key.to_string()))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

pub fn has_field(map: &Mapping, key: &str) -> bool {
    map.contains_key(Value::String(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_frontmatter_and_body() {
        let parsed = parse_frontmatter("---\nname: my-skill\ndescription: Does things.\n---\n# Body\n");
        let map = parsed.frontmatter.unwrap();
        assert_eq!(str_field(&map, "name"), Some("my-skill"));
        assert_eq!(parsed.body, "# Body\n");
        assert!(parsed.error.is_none());
    }

    #[test]
    fn missing_open_fence_is_an_error() {
        let parsed = parse_frontmatter("# Just markdown\n");
        assert!(parsed.frontmatter.is_none());
        assert!(parsed.error.unwrap().contains("No YAML frontmatter"));
    }

    #[test]
    fn missing_close_fence_is_an_error() {
        let parsed = parse_frontmatter("---\nname: x\n");
        assert!(parsed.error.unwrap().contains("missing closing"));
    }

    #[test]
    fn scalar_frontmatter_is_rejected() {
        let parsed = parse_frontmatter("---\njust a string\n---\nbody");
        assert!(parsed.error.unwrap().contains("YAML dictionary"));
    }
}
