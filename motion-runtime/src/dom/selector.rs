//! # Selector
//!
//! 最小 CSS 选择器子集：逗号分组、后代组合、`tag` / `#id` / `.class` /
//! `[attr]` / `[attr=value]` / `*`。

use super::{Document, NodeId};
use crate::error::{MotionError, MotionResult};

#[derive(Debug, Clone, PartialEq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
}

/// 复合选择器（无组合符的一段）
#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        if let Some(id) = &self.id
            && doc.attr(node, "id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| doc.has_class(node, c)) {
            return false;
        }
        self.attrs.iter().all(|attr| match attr {
            AttrMatch::Exists(name) => doc.has_attr(node, name),
            AttrMatch::Equals(name, value) => doc.attr(node, name) == Some(value.as_str()),
        })
    }
}

/// 已解析的选择器
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// 每组是从左到右的后代链
    groups: Vec<Vec<Compound>>,
}

impl Selector {
    pub fn parse(input: &str) -> MotionResult<Self> {
        let invalid = |message: &str| MotionError::InvalidSelector {
            selector: input.to_string(),
            message: message.to_string(),
        };

        let mut groups = Vec::new();
        for group in split_outside_brackets(input, ',') {
            let group = group.trim();
            if group.is_empty() {
                return Err(invalid("空的选择器分组"));
            }
            let chain = split_outside_brackets(group, ' ')
                .into_iter()
                .filter(|part| !part.trim().is_empty())
                .map(|part| parse_compound(part.trim()).map_err(|m| invalid(&m)))
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(chain);
        }
        if groups.is_empty() {
            return Err(invalid("空选择器"));
        }
        Ok(Self { groups })
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.groups
            .iter()
            .any(|chain| chain_matches(doc, node, chain))
    }
}

fn chain_matches(doc: &Document, node: NodeId, chain: &[Compound]) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(doc, node) {
        return false;
    }
    // 贪心地沿祖先链向上匹配剩余部分
    let mut remaining = ancestors.iter().rev().peekable();
    let mut current = doc.parent(node);
    while let Some(compound) = remaining.peek() {
        let Some(id) = current else {
            return false;
        };
        if compound.matches(doc, id) {
            remaining.next();
        }
        current = doc.parent(id);
    }
    true
}

fn split_outside_brackets(input: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == delimiter && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_compound(input: &str) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let mut rest = input;

    let tag_end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
    let tag = &rest[..tag_end];
    if !tag.is_empty() && tag != "*" {
        if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(format!("无效的标签名 '{tag}'"));
        }
        compound.tag = Some(tag.to_ascii_lowercase());
    }
    rest = &rest[tag_end..];

    while let Some(first) = rest.chars().next() {
        match first {
            '.' | '#' => {
                let body = &rest[1..];
                let end = body.find(['.', '#', '[']).unwrap_or(body.len());
                let name = &body[..end];
                if name.is_empty() {
                    return Err(format!("'{first}' 后缺少名称"));
                }
                if first == '.' {
                    compound.classes.push(name.to_string());
                } else {
                    compound.id = Some(name.to_string());
                }
                rest = &body[end..];
            }
            '[' => {
                let close = rest.find(']').ok_or_else(|| "缺少 ']'".to_string())?;
                let inner = rest[1..close].trim();
                if inner.is_empty() {
                    return Err("空的属性选择器".to_string());
                }
                let attr = match inner.split_once('=') {
                    Some((name, value)) => AttrMatch::Equals(
                        name.trim().to_string(),
                        value.trim().trim_matches(['"', '\'']).to_string(),
                    ),
                    None => AttrMatch::Exists(inner.to_string()),
                };
                compound.attrs.push(attr);
                rest = &rest[close + 1..];
            }
            other => return Err(format!("意外的字符 '{other}'")),
        }
    }
    Ok(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let intro = doc
            .append_element(root, "div", &[("class", "landing-intro")], None)
            .unwrap();
        let h1 = doc.append_element(intro, "h1", &[], Some("Name")).unwrap();
        let link = doc
            .append_element(
                root,
                "a",
                &[("class", "navbar-title"), ("data-cursor", "disable")],
                Some("Home"),
            )
            .unwrap();
        let button = doc
            .append_element(root, "div", &[("role", "button"), ("id", "cta")], None)
            .unwrap();
        (doc, h1, link, button)
    }

    #[test]
    fn test_descendant_selector() {
        let (doc, h1, _, _) = doc();
        assert_eq!(doc.query_all(".landing-intro h1").unwrap(), vec![h1]);
        assert!(doc.query_all(".landing-info h1").unwrap().is_empty());
    }

    #[test]
    fn test_group_and_attributes() {
        let (doc, _, link, button) = doc();
        let found = doc
            .query_all("a, button, [data-cursor], [role=\"button\"]")
            .unwrap();
        assert_eq!(found, vec![link, button]);
        assert_eq!(doc.query("#cta").unwrap(), Some(button));
        assert_eq!(doc.query("a[data-cursor=disable]").unwrap(), Some(link));
    }

    #[test]
    fn test_invalid_selector() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("a,,b").is_err());
        assert!(Selector::parse("[data-cursor").is_err());
        assert!(Selector::parse("div.").is_err());
    }
}
