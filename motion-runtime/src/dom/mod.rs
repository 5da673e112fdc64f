//! # Dom 模块
//!
//! 渲染层持有的节点树。引擎只通过 `&mut Document` 借用它，
//! 节点的生命周期始终归渲染层所有。
//!
//! ## 核心概念
//!
//! - [`NodeId`]：非拥有的节点句柄，节点被移除后所有查询返回 `None` / `false`
//! - [`Document`]：元素/文本节点的 arena，根节点为 `body`
//! - [`NodeSnapshot`]：子树快照，用于文本拆分的精确还原
//! - [`Rect`]：渲染层提供的布局盒（文档坐标）

mod selector;

use std::collections::HashMap;
use std::fmt;

use crate::animation::{Animatable, Prop};
use crate::error::{MotionError, MotionResult};

pub use selector::Selector;

/// 节点句柄
///
/// 由 [`Document`] 分配，不会重复。持有句柄不会让节点存活。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// 布局盒（文档坐标，滚动偏移为 0 时的位置）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// 点是否落在盒内（含边界）
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        /// 保持插入顺序，序列化结果稳定
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Rect,
    props: HashMap<Prop, f32>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            rect: Rect::default(),
            props: HashMap::new(),
        }
    }
}

/// 子树快照
///
/// 只记录结构、属性与布局盒；动画属性值不属于原始标记。
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSnapshot {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        rect: Rect,
        children: Vec<NodeSnapshot>,
    },
    Text(String),
}

/// 节点树
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, NodeData>,
    root: NodeId,
    next_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 创建只包含 `body` 根节点的文档
    pub fn new() -> Self {
        let root = NodeId(1);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            NodeData::new(NodeKind::Element {
                tag: "body".to_string(),
                attrs: Vec::new(),
            }),
        );
        Self {
            nodes,
            root,
            next_id: 2,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, NodeData::new(kind));
        id
    }

    // ========== 构建 ==========

    /// 创建游离元素，需 [`append_child`](Self::append_child) 后才算挂载
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    /// 把 `child` 追加到 `parent` 末尾；`child` 原有父节点会先解除
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> MotionResult<()> {
        if !self.nodes.contains_key(&child) {
            return Err(MotionError::NodeDetached { node: child });
        }
        match self.nodes.get(&parent).map(|n| &n.kind) {
            Some(NodeKind::Element { .. }) => {}
            _ => return Err(MotionError::NodeDetached { node: parent }),
        }
        self.unlink(child);
        if let Some(data) = self.nodes.get_mut(&child) {
            data.parent = Some(parent);
        }
        if let Some(data) = self.nodes.get_mut(&parent) {
            data.children.push(child);
        }
        Ok(())
    }

    /// 便捷构建：创建元素、设置属性、可选文本，并挂到 `parent` 下
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
        text: Option<&str>,
    ) -> MotionResult<NodeId> {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attr(id, name, value);
        }
        if let Some(text) = text {
            let text_id = self.create_text(text);
            self.append_child(id, text_id)?;
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    fn unlink(&mut self, node: NodeId) {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(data) = self.nodes.get_mut(&parent) {
                data.children.retain(|c| *c != node);
            }
            if let Some(data) = self.nodes.get_mut(&node) {
                data.parent = None;
            }
        }
    }

    /// 移除并释放整棵子树；之后所有指向其中节点的句柄都失效
    pub fn remove(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        self.unlink(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(data) = self.nodes.remove(&id) {
                stack.extend(data.children);
            }
        }
    }

    /// 移除所有子节点
    pub fn clear_children(&mut self, node: NodeId) {
        for child in self.children(node) {
            self.remove(child);
        }
    }

    /// 用单个文本节点替换全部子节点
    pub fn set_text(&mut self, node: NodeId, text: &str) -> MotionResult<()> {
        self.clear_children(node);
        let text_id = self.create_text(text);
        self.append_child(node, text_id)
    }

    // ========== 查询 ==========

    /// 节点是否存在且祖先链可达根节点
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = match self.nodes.get(&id) {
                Some(data) => data.parent,
                None => return false,
            };
        }
        false
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(&node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(
            self.nodes.get(&node).map(|n| &n.kind),
            Some(NodeKind::Text(_))
        )
    }

    /// 子树中所有文本拼接
    pub fn text_content(&self, node: NodeId) -> Option<String> {
        let data = self.nodes.get(&node)?;
        let mut out = String::new();
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => self.collect_text(node, &mut out),
        }
        Some(out)
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        for child in &data.children {
            match self.nodes.get(child).map(|n| &n.kind) {
                Some(NodeKind::Text(text)) => out.push_str(text),
                Some(NodeKind::Element { .. }) => self.collect_text(*child, out),
                None => {}
            }
        }
    }

    /// 前序遍历 `node` 的后代（不含自身）
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    /// 返回所有匹配选择器的元素（文档顺序）
    pub fn query_all(&self, selector: &str) -> MotionResult<Vec<NodeId>> {
        let parsed = Selector::parse(selector)?;
        Ok(self
            .descendants(self.root)
            .into_iter()
            .filter(|id| parsed.matches(self, *id))
            .collect())
    }

    /// 返回第一个匹配的元素
    pub fn query(&self, selector: &str) -> MotionResult<Option<NodeId>> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    // ========== 属性 ==========

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(&node)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(NodeKind::Element { attrs, .. }) = self.nodes.get_mut(&node).map(|n| &mut n.kind)
        else {
            return false;
        };
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
        true
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(NodeKind::Element { attrs, .. }) = self.nodes.get_mut(&node).map(|n| &mut n.kind)
        {
            attrs.retain(|(k, _)| k != name);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let value = match self.attr(node, "class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(node, "class", &value);
    }

    // ========== 布局 ==========

    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.nodes.get(&node).map(|n| n.rect)
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) -> bool {
        match self.nodes.get_mut(&node) {
            Some(data) => {
                data.rect = rect;
                true
            }
            None => false,
        }
    }

    // ========== 快照 ==========

    /// 记录 `node` 的全部子节点
    pub fn snapshot_children(&self, node: NodeId) -> Vec<NodeSnapshot> {
        self.children(node)
            .into_iter()
            .filter_map(|child| self.snapshot(child))
            .collect()
    }

    fn snapshot(&self, node: NodeId) -> Option<NodeSnapshot> {
        let data = self.nodes.get(&node)?;
        Some(match &data.kind {
            NodeKind::Text(text) => NodeSnapshot::Text(text.clone()),
            NodeKind::Element { tag, attrs } => NodeSnapshot::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                rect: data.rect,
                children: self.snapshot_children(node),
            },
        })
    }

    /// 用快照替换 `node` 的全部子节点
    pub fn restore_children(&mut self, node: NodeId, snapshot: &[NodeSnapshot]) -> MotionResult<()> {
        if !self.contains(node) {
            return Err(MotionError::NodeDetached { node });
        }
        self.clear_children(node);
        for child in snapshot {
            let id = self.build(child);
            self.append_child(node, id)?;
        }
        Ok(())
    }

    fn build(&mut self, snapshot: &NodeSnapshot) -> NodeId {
        match snapshot {
            NodeSnapshot::Text(text) => self.create_text(text),
            NodeSnapshot::Element {
                tag,
                attrs,
                rect,
                children,
            } => {
                let id = self.alloc(NodeKind::Element {
                    tag: tag.clone(),
                    attrs: attrs.clone(),
                });
                self.set_rect(id, *rect);
                for child in children {
                    let child_id = self.build(child);
                    if let Some(data) = self.nodes.get_mut(&child_id) {
                        data.parent = Some(id);
                    }
                    if let Some(data) = self.nodes.get_mut(&id) {
                        data.children.push(child_id);
                    }
                }
                id
            }
        }
    }

    // ========== 序列化 ==========

    /// 子节点标记（等价于 innerHTML）
    pub fn inner_markup(&self, node: NodeId) -> Option<String> {
        self.nodes.get(&node)?;
        let mut out = String::new();
        for child in self.children(node) {
            self.write_markup(child, &mut out);
        }
        Some(out)
    }

    /// 自身标记（等价于 outerHTML）
    pub fn outer_markup(&self, node: NodeId) -> Option<String> {
        self.nodes.get(&node)?;
        let mut out = String::new();
        self.write_markup(node, &mut out);
        Some(out)
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => escape_into(text, out),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                for child in &data.children {
                    self.write_markup(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
}

impl Animatable for Document {
    fn get_property(&self, node: NodeId, prop: Prop) -> Option<f32> {
        let data = self.nodes.get(&node)?;
        Some(data.props.get(&prop).copied().unwrap_or(prop.neutral()))
    }

    fn set_property(&mut self, node: NodeId, prop: Prop, value: f32) -> bool {
        match self.nodes.get_mut(&node) {
            Some(data) => {
                data.props.insert(prop, value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let section = doc
            .append_element(root, "section", &[("class", "about")], None)
            .unwrap();
        let para = doc
            .append_element(section, "p", &[("class", "para")], Some("Hi there"))
            .unwrap();
        (doc, section, para)
    }

    #[test]
    fn test_text_content_and_markup() {
        let (doc, section, para) = sample();
        assert_eq!(doc.text_content(para).as_deref(), Some("Hi there"));
        assert_eq!(
            doc.inner_markup(section).as_deref(),
            Some("<p class=\"para\">Hi there</p>")
        );
    }

    #[test]
    fn test_remove_invalidates_handles() {
        let (mut doc, section, para) = sample();
        assert!(doc.is_attached(para));

        doc.remove(section);
        assert!(!doc.is_attached(para));
        assert!(!doc.contains(para));
        assert_eq!(doc.text_content(para), None);
        assert!(!doc.set_property(para, Prop::Opacity, 0.0));
    }

    #[test]
    fn test_detached_element_is_not_attached() {
        let mut doc = Document::new();
        let orphan = doc.create_element("div");
        assert!(doc.contains(orphan));
        assert!(!doc.is_attached(orphan));
    }

    #[test]
    fn test_snapshot_restore_is_exact() {
        let mut doc = Document::new();
        let root = doc.root();
        let h2 = doc.append_element(root, "h2", &[], Some("My career ")).unwrap();
        doc.append_element(h2, "span", &[], Some("&")).unwrap();
        doc.append_element(h2, "br", &[], None).unwrap();
        let tail = doc.create_text(" experience");
        doc.append_child(h2, tail).unwrap();

        let before = doc.inner_markup(h2).unwrap();
        let snapshot = doc.snapshot_children(h2);
        doc.set_text(h2, "replaced").unwrap();
        assert_ne!(doc.inner_markup(h2).unwrap(), before);

        doc.restore_children(h2, &snapshot).unwrap();
        assert_eq!(doc.inner_markup(h2).unwrap(), before);
    }

    #[test]
    fn test_classes() {
        let (mut doc, _, para) = sample();
        assert!(doc.has_class(para, "para"));
        doc.add_class(para, "visible");
        doc.add_class(para, "visible");
        assert_eq!(doc.attr(para, "class"), Some("para visible"));
    }

    #[test]
    fn test_animatable_defaults() {
        let (mut doc, _, para) = sample();
        assert_eq!(doc.get_property(para, Prop::Opacity), Some(1.0));
        assert_eq!(doc.get_property(para, Prop::Scale), Some(1.0));
        assert_eq!(doc.get_property(para, Prop::Y), Some(0.0));

        assert!(doc.set_property(para, Prop::Y, 80.0));
        assert_eq!(doc.get_property(para, Prop::Y), Some(80.0));
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(110.0, 70.0));
        assert!(!rect.contains(9.9, 30.0));
        assert_eq!(rect.bottom(), 70.0);
    }
}
