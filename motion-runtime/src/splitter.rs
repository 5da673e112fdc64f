//! # Splitter 模块
//!
//! 文本拆分：把元素的文本替换为逐字 / 逐词 / 逐行的包装节点，供动画逐个驱动。
//!
//! ## 生命周期
//!
//! - [`TextSplitter::split`] 记录原始子节点快照，替换为包装节点，
//!   并在根元素上打 `data-split` 标记
//! - [`TextSplitter::revert`] 是释放包装节点的唯一途径，恢复后的标记与原始完全一致
//! - 已拆分的元素不能再次拆分；[`SplitRegistry::resplit`] 负责先还原再拆分

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::dom::{Document, NodeId, NodeSnapshot};
use crate::error::{MotionError, MotionResult};

/// 拆分标记属性
pub const SPLIT_MARKER: &str = "data-split";

/// 拆分粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitUnit {
    Chars,
    Words,
    Lines,
}

impl SplitUnit {
    pub fn name(&self) -> &'static str {
        match self {
            SplitUnit::Chars => "chars",
            SplitUnit::Words => "words",
            SplitUnit::Lines => "lines",
        }
    }

    /// 包装节点的 class
    pub fn class(&self) -> &'static str {
        match self {
            SplitUnit::Chars => "split-char",
            SplitUnit::Words => "split-word",
            SplitUnit::Lines => "split-line",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            SplitUnit::Lines => "div",
            SplitUnit::Chars | SplitUnit::Words => "span",
        }
    }
}

/// 拆分产生的包装节点
#[derive(Debug, Clone, PartialEq)]
pub struct SplitNode {
    pub kind: SplitUnit,
    pub element: NodeId,
    pub text: String,
    pub index: usize,
}

/// 文本拆分器
///
/// 持有包装节点的所有权：包装节点只能通过 [`revert`](Self::revert) 释放。
#[derive(Debug)]
pub struct TextSplitter {
    root: NodeId,
    unit: SplitUnit,
    snapshot: Vec<NodeSnapshot>,
    units: Vec<SplitNode>,
    /// 空格占位（`&nbsp;`），只参与布局，不参与动画
    spacers: Vec<NodeId>,
    live: bool,
}

impl TextSplitter {
    /// 拆分 `node` 的文本
    ///
    /// # 错误
    /// - `NodeDetached`: 节点不存在或未挂载
    /// - `AlreadySplit`: 节点仍持有包装节点
    /// - `EmptyText`: 没有可拆分的文本
    pub fn split(doc: &mut Document, node: NodeId, unit: SplitUnit) -> MotionResult<Self> {
        if !doc.is_attached(node) {
            return Err(MotionError::NodeDetached { node });
        }
        if doc.has_attr(node, SPLIT_MARKER) {
            return Err(MotionError::AlreadySplit { node });
        }
        let text = doc.text_content(node).unwrap_or_default();
        if text.trim().is_empty() {
            return Err(MotionError::EmptyText { node });
        }

        let mut splitter = Self {
            root: node,
            unit,
            snapshot: doc.snapshot_children(node),
            units: Vec::new(),
            spacers: Vec::new(),
            live: true,
        };

        doc.clear_children(node);
        match unit {
            SplitUnit::Chars => splitter.build_chars(doc, &text)?,
            SplitUnit::Words => splitter.build_words(doc, &text)?,
            SplitUnit::Lines => splitter.build_lines(doc, &text)?,
        }
        doc.set_attr(node, SPLIT_MARKER, unit.name());

        debug!(node = %node, unit = unit.name(), count = splitter.units.len(), "文本拆分完成");
        Ok(splitter)
    }

    /// 按选择器拆分第一个匹配的元素
    pub fn split_selector(
        doc: &mut Document,
        selector: &str,
        unit: SplitUnit,
    ) -> MotionResult<Self> {
        let node = doc
            .query(selector)?
            .ok_or_else(|| MotionError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        Self::split(doc, node, unit)
    }

    fn wrap(&mut self, doc: &mut Document, text: &str) -> MotionResult<NodeId> {
        let element = doc.append_element(
            self.root,
            self.unit.tag(),
            &[("class", self.unit.class())],
            Some(text),
        )?;
        self.units.push(SplitNode {
            kind: self.unit,
            element,
            text: text.to_string(),
            index: self.units.len(),
        });
        Ok(element)
    }

    fn build_chars(&mut self, doc: &mut Document, text: &str) -> MotionResult<()> {
        for grapheme in text.graphemes(true) {
            if grapheme == " " {
                let spacer = doc.append_element(
                    self.root,
                    "span",
                    &[("class", "split-space")],
                    Some("\u{a0}"),
                )?;
                self.spacers.push(spacer);
            } else if grapheme.chars().all(char::is_whitespace) {
                let whitespace = doc.create_text(grapheme);
                doc.append_child(self.root, whitespace)?;
            } else {
                self.wrap(doc, grapheme)?;
            }
        }
        Ok(())
    }

    fn build_words(&mut self, doc: &mut Document, text: &str) -> MotionResult<()> {
        let words: Vec<&str> = text.split_whitespace().collect();
        for (index, word) in words.iter().enumerate() {
            self.wrap(doc, word)?;
            if index + 1 < words.len() {
                let space = doc.create_text(" ");
                doc.append_child(self.root, space)?;
            }
        }
        Ok(())
    }

    fn build_lines(&mut self, doc: &mut Document, text: &str) -> MotionResult<()> {
        for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
            self.wrap(doc, line)?;
        }
        Ok(())
    }

    /// 还原原始子节点
    ///
    /// 幂等：重复调用或根元素已被移除时直接返回。
    pub fn revert(&mut self, doc: &mut Document) -> MotionResult<()> {
        if !self.live {
            return Ok(());
        }
        self.live = false;
        self.units.clear();
        self.spacers.clear();

        if !doc.contains(self.root) {
            debug!(node = %self.root, "拆分根元素已移除，跳过还原");
            return Ok(());
        }
        doc.restore_children(self.root, &self.snapshot)?;
        doc.remove_attr(self.root, SPLIT_MARKER);
        Ok(())
    }

    // ========== 查询 ==========

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn unit(&self) -> SplitUnit {
        self.unit
    }

    pub fn units(&self) -> &[SplitNode] {
        &self.units
    }

    /// 可动画的包装节点
    pub fn nodes(&self) -> Vec<NodeId> {
        self.units.iter().map(|u| u.element).collect()
    }

    pub fn spacers(&self) -> &[NodeId] {
        &self.spacers
    }

    pub fn is_live(&self) -> bool {
        self.live
    }
}

/// 每个根元素上当前有效的拆分器
#[derive(Debug, Default)]
pub struct SplitRegistry {
    splits: HashMap<NodeId, TextSplitter>,
}

impl SplitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 先还原再拆分
    ///
    /// 已知的拆分器先 revert；节点带有标记但没有记录时（孤儿拆分），
    /// 把它压平为纯文本后再拆分。
    pub fn resplit(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        unit: SplitUnit,
    ) -> MotionResult<&TextSplitter> {
        if let Some(mut previous) = self.splits.remove(&node) {
            previous.revert(doc)?;
        } else if doc.has_attr(node, SPLIT_MARKER) {
            warn!(node = %node, "发现未登记的拆分，压平为纯文本");
            let text = doc.text_content(node).unwrap_or_default();
            doc.set_text(node, &text)?;
            doc.remove_attr(node, SPLIT_MARKER);
        }

        let splitter = TextSplitter::split(doc, node, unit)?;
        self.splits.insert(node, splitter);
        self.splits
            .get(&node)
            .ok_or(MotionError::NodeDetached { node })
    }

    /// 还原单个根元素
    ///
    /// # 返回
    /// 是否存在对应的拆分器
    pub fn revert(&mut self, doc: &mut Document, node: NodeId) -> MotionResult<bool> {
        match self.splits.remove(&node) {
            Some(mut splitter) => {
                splitter.revert(doc)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 还原全部；单个失败只记录日志
    pub fn revert_all(&mut self, doc: &mut Document) {
        let mut roots: Vec<NodeId> = self.splits.keys().copied().collect();
        roots.sort();
        for root in roots {
            if let Err(e) = self.revert(doc, root) {
                warn!(node = %root, error = %e, "还原拆分失败");
            }
        }
    }

    pub fn get(&self, node: NodeId) -> Option<&TextSplitter> {
        self.splits.get(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.splits.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(text: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let para = doc
            .append_element(root, "p", &[("class", "para")], Some(text))
            .unwrap();
        (doc, para)
    }

    #[test]
    fn test_split_words() {
        let (mut doc, para) = doc_with("Hi there");
        let split = TextSplitter::split(&mut doc, para, SplitUnit::Words).unwrap();

        let texts: Vec<&str> = split.units().iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["Hi", "there"]);
        insta::assert_snapshot!(
            doc.inner_markup(para).unwrap(),
            @r#"<span class="split-word">Hi</span> <span class="split-word">there</span>"#
        );
        assert_eq!(doc.attr(para, SPLIT_MARKER), Some("words"));
    }

    #[test]
    fn test_split_words_normalises_whitespace() {
        let (mut doc, para) = doc_with("  one \n\t two   three ");
        let split = TextSplitter::split(&mut doc, para, SplitUnit::Words).unwrap();
        assert_eq!(split.units().len(), 3);
        assert_eq!(doc.text_content(para).as_deref(), Some("one two three"));
    }

    #[test]
    fn test_split_chars_tracks_spacers() {
        let (mut doc, para) = doc_with("Hi yo");
        let split = TextSplitter::split(&mut doc, para, SplitUnit::Chars).unwrap();

        assert_eq!(split.nodes().len(), 4);
        assert_eq!(split.spacers().len(), 1);
        insta::assert_snapshot!(
            doc.inner_markup(para).unwrap(),
            @r#"<span class="split-char">H</span><span class="split-char">i</span><span class="split-space">&nbsp;</span><span class="split-char">y</span><span class="split-char">o</span>"#
        );
    }

    #[test]
    fn test_split_chars_uses_graphemes() {
        let (mut doc, para) = doc_with("e\u{301}👍🏽");
        let split = TextSplitter::split(&mut doc, para, SplitUnit::Chars).unwrap();
        let texts: Vec<&str> = split.units().iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["e\u{301}", "👍🏽"]);
    }

    #[test]
    fn test_split_lines_drops_blank_lines() {
        let (mut doc, para) = doc_with("first line\n\n   \nsecond line\n");
        let split = TextSplitter::split(&mut doc, para, SplitUnit::Lines).unwrap();
        let texts: Vec<&str> = split.units().iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["first line", "second line"]);
        assert_eq!(doc.tag(split.nodes()[0]), Some("div"));
    }

    #[test]
    fn test_revert_round_trip() {
        let mut doc = Document::new();
        let root = doc.root();
        let h2 = doc
            .append_element(root, "h2", &[("class", "title")], Some("My career "))
            .unwrap();
        doc.append_element(h2, "span", &[], Some("&")).unwrap();
        doc.append_element(h2, "br", &[], None).unwrap();
        let tail = doc.create_text(" experience");
        doc.append_child(h2, tail).unwrap();
        let original = doc.outer_markup(h2).unwrap();

        for unit in [SplitUnit::Chars, SplitUnit::Words, SplitUnit::Lines] {
            let mut split = TextSplitter::split(&mut doc, h2, unit).unwrap();
            assert_ne!(doc.outer_markup(h2).unwrap(), original);
            split.revert(&mut doc).unwrap();
            assert_eq!(doc.outer_markup(h2).unwrap(), original);
        }
    }

    #[test]
    fn test_revert_is_idempotent() {
        let (mut doc, para) = doc_with("Hi there");
        let original = doc.inner_markup(para).unwrap();
        let mut split = TextSplitter::split(&mut doc, para, SplitUnit::Chars).unwrap();

        split.revert(&mut doc).unwrap();
        split.revert(&mut doc).unwrap();
        assert!(!split.is_live());
        assert!(split.units().is_empty());
        assert_eq!(doc.inner_markup(para).unwrap(), original);
    }

    #[test]
    fn test_split_errors() {
        let (mut doc, para) = doc_with("   ");
        assert_eq!(
            TextSplitter::split(&mut doc, para, SplitUnit::Words).unwrap_err(),
            MotionError::EmptyText { node: para }
        );

        let (mut doc, para) = doc_with("text");
        let _split = TextSplitter::split(&mut doc, para, SplitUnit::Words).unwrap();
        assert_eq!(
            TextSplitter::split(&mut doc, para, SplitUnit::Words).unwrap_err(),
            MotionError::AlreadySplit { node: para }
        );

        let orphan = doc.create_element("p");
        assert_eq!(
            TextSplitter::split(&mut doc, orphan, SplitUnit::Words).unwrap_err(),
            MotionError::NodeDetached { node: orphan }
        );

        assert!(matches!(
            TextSplitter::split_selector(&mut doc, ".missing", SplitUnit::Chars),
            Err(MotionError::ElementNotFound { .. })
        ));
    }

    #[test]
    fn test_revert_after_root_removed() {
        let (mut doc, para) = doc_with("gone soon");
        let mut split = TextSplitter::split(&mut doc, para, SplitUnit::Words).unwrap();
        doc.remove(para);
        assert!(split.revert(&mut doc).is_ok());
        assert!(!split.is_live());
    }

    #[test]
    fn test_registry_resplit_reverts_first() {
        let (mut doc, para) = doc_with("Hi there");
        let original = doc.inner_markup(para).unwrap();
        let mut registry = SplitRegistry::new();

        registry.resplit(&mut doc, para, SplitUnit::Words).unwrap();
        let split = registry.resplit(&mut doc, para, SplitUnit::Chars).unwrap();
        assert_eq!(split.unit(), SplitUnit::Chars);
        assert_eq!(split.nodes().len(), 7);
        assert_eq!(registry.len(), 1);

        registry.revert_all(&mut doc);
        assert!(registry.is_empty());
        assert_eq!(doc.inner_markup(para).unwrap(), original);
    }

    #[test]
    fn test_registry_flattens_orphan_split() {
        let (mut doc, para) = doc_with("Hi there");
        // 拆分器被丢弃而未还原，节点上仍留有标记
        drop(TextSplitter::split(&mut doc, para, SplitUnit::Words).unwrap());

        let mut registry = SplitRegistry::new();
        let split = registry.resplit(&mut doc, para, SplitUnit::Words).unwrap();
        assert_eq!(split.units().len(), 2);

        registry.revert(&mut doc, para).unwrap();
        assert_eq!(doc.inner_markup(para).as_deref(), Some("Hi there"));
    }
}
