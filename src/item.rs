use std::{
    collections::HashSet,
    fmt::{Debug, Display},
    hash::Hash,
};

use crate::{Production, Token};

/// 回指指针, 指向图表中证明了某次 dot 前进的完成项.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackPointer {
    /// 完成项所在的状态集编号.
    pub set: usize,
    /// 完成项在状态集内的下标.
    pub index: usize,
}

impl Debug for BackPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.set, self.index)
    }
}

/// Earley 项: 带 dot 的产生式, 加上匹配开始的输入位置 (origin) 和推导历史.
///
/// 结构同一性只由 `(prod, dot, origin)` 决定, history 不参与相等和哈希,
/// 因为多条推导路径可以到达同一个带点项.
#[derive(Clone)]
pub struct Item<'a> {
    /// 项对应的产生式.
    prod: &'a Production<'a>,
    /// dot 所处的位置, 在 `0..=prod.len()` 范围中.
    dot: usize,
    /// 这个项从哪个输入位置开始匹配.
    origin: usize,
    /// dot 每跨过一个非终结符就追加一个回指指针, 顺序和尾部的非终结符一致.
    /// 每个项独立持有自己的 history, 不和其他项共享缓冲.
    history: Vec<BackPointer>,
}

impl PartialEq for Item<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.core() == other.core()
    }
}

impl Eq for Item<'_> {}

impl Hash for Item<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.core().hash(state);
    }
}

impl Debug for Item<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("Item({} ({}) {:?})", self, self.origin, self.history))
    }
}

impl Display for Item<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tail_s: String = self
            .prod
            .tail()
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}{} ", if i == self.dot { "⋅ " } else { "" }, t))
            .collect();
        f.pad(&format!(
            "{} -> {}",
            self.prod.head(),
            format!(
                "{}{}",
                tail_s.trim_end(),
                if self.dot == self.prod.len() {
                    " ⋅"
                } else {
                    ""
                }
            )
            .trim()
        ))
    }
}

impl<'a> Item<'a> {
    /// dot 位于产生式尾部最前端的初始项, 没有任何历史.
    #[must_use]
    pub(crate) fn initial(prod: &'a Production<'a>, origin: usize) -> Self {
        Self {
            prod,
            dot: 0,
            origin,
            history: Vec::new(),
        }
    }

    /// dot 处的符号, 产生式已经完全匹配时返回 [`None`] (产生式结束标记).
    #[must_use]
    pub fn next(&self) -> Option<Token<'a>> {
        self.prod.tail().get(self.dot).copied()
    }

    /// 返回 dot 前进一格的新项, 原项不变.
    ///
    /// 跨过非终结符时 `back_pointer` 指向证明这次前进的完成项, 跨过终结符时为 [`None`].
    /// 新项持有独立复制的 history, 不会和原项产生别名.
    #[must_use]
    pub(crate) fn advanced(&self, back_pointer: Option<BackPointer>) -> Self {
        let mut history = self.history.clone();
        history.extend(back_pointer);
        Self {
            prod: self.prod,
            dot: self.dot + 1,
            origin: self.origin,
            history,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.dot == self.prod.len()
    }

    #[must_use]
    pub(crate) fn core(&self) -> (&'a Production<'a>, usize, usize) {
        (self.prod, self.dot, self.origin)
    }

    #[must_use]
    pub fn prod(&self) -> &'a Production<'a> {
        self.prod
    }

    #[must_use]
    pub fn dot(&self) -> usize {
        self.dot
    }

    #[must_use]
    pub fn origin(&self) -> usize {
        self.origin
    }

    #[must_use]
    pub fn history(&self) -> &[BackPointer] {
        &self.history
    }
}

/// 图表中单个输入位置的状态集: 只追加, 保持插入顺序, 按结构同一性去重.
#[derive(Debug, Clone, Default)]
pub struct StateSet<'a> {
    items: Vec<Item<'a>>,
    seen: HashSet<(&'a Production<'a>, usize, usize)>,
}

impl PartialEq for StateSet<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for StateSet<'_> {}

impl<'a> StateSet<'a> {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 插入一个项, 返回 (下标, 是否为新项).
    ///
    /// 已经存在结构相等的项时不做任何修改, 保留最先发现的 history,
    /// 返回已有项的下标.
    pub(crate) fn push(&mut self, item: Item<'a>) -> (usize, bool) {
        if self.seen.insert(item.core()) {
            self.items.push(item);
            (self.items.len() - 1, true)
        } else {
            // 去重只看 (prod, dot, origin), 线性查找一定能命中.
            let index = self
                .items
                .iter()
                .position(|present| *present == item)
                .unwrap_or_else(|| unreachable!("seen 集与 items 不一致"));
            (index, false)
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Item<'a>] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        NonTerminal, Production, Terminal, Token,
        item::{BackPointer, Item, StateSet},
    };
    use pretty_assertions::assert_eq;

    fn prod_s_np_vp() -> Production<'static> {
        Production::new(
            "S".into(),
            vec![
                Token::from(NonTerminal::from("NP")),
                Token::from(NonTerminal::from("VP")),
            ],
        )
    }

    #[test]
    fn next_and_advance() {
        let prod = prod_s_np_vp();
        let item = Item::initial(&prod, 0);
        assert_eq!(item.next(), Some(NonTerminal::from("NP").into()));
        assert!(!item.is_complete());

        let bp = BackPointer { set: 1, index: 3 };
        let advanced = item.advanced(Some(bp));
        assert_eq!(advanced.dot(), 1);
        assert_eq!(advanced.next(), Some(NonTerminal::from("VP").into()));
        assert_eq!(advanced.history(), [bp]);
        // 原项不受影响.
        assert_eq!(item.dot(), 0);
        assert!(item.history().is_empty());

        let done = advanced.advanced(Some(BackPointer { set: 5, index: 0 }));
        assert!(done.is_complete());
        assert_eq!(done.next(), None);
        assert_eq!(done.history().len(), 2);
    }

    #[test]
    fn eq_ignores_history() {
        let prod = prod_s_np_vp();
        let a = Item::initial(&prod, 0).advanced(Some(BackPointer { set: 1, index: 0 }));
        let b = Item::initial(&prod, 0).advanced(Some(BackPointer { set: 1, index: 7 }));
        assert_eq!(a, b);
        assert_ne!(a.history(), b.history());
    }

    #[test]
    fn histories_do_not_alias() {
        let prod = prod_s_np_vp();
        let base = Item::initial(&prod, 0);
        let left = base.advanced(Some(BackPointer { set: 1, index: 0 }));
        let right = base.advanced(Some(BackPointer { set: 2, index: 4 }));
        // 从同一个项派生的两个项各自持有独立的历史.
        assert_eq!(left.history(), [BackPointer { set: 1, index: 0 }]);
        assert_eq!(right.history(), [BackPointer { set: 2, index: 4 }]);
        assert!(base.history().is_empty());
    }

    #[test]
    fn state_set_dedup() {
        let prod = prod_s_np_vp();
        let mut set = StateSet::new();
        assert_eq!(set.push(Item::initial(&prod, 0)), (0, true));
        assert_eq!(set.push(Item::initial(&prod, 1)), (1, true));
        // 结构相等的项不再插入, 返回已有下标.
        assert_eq!(set.push(Item::initial(&prod, 0)), (0, false));
        assert_eq!(set.len(), 2);
        // 历史不同也算同一个项, 保留最先发现的历史.
        let with_history =
            Item::initial(&prod, 1).advanced(Some(BackPointer { set: 1, index: 0 }));
        let plain = Item::initial(&prod, 1).advanced(None);
        assert_eq!(set.push(with_history.clone()), (2, true));
        assert_eq!(set.push(plain), (2, false));
        assert_eq!(set.items()[2].history(), with_history.history());
    }

    #[test]
    fn display_dot() {
        let prod = prod_s_np_vp();
        let item = Item::initial(&prod, 0);
        assert_eq!(format!("{}", item), "S -> ⋅ NP VP");
        assert_eq!(format!("{}", item.advanced(None)), "S -> NP ⋅ VP");
        assert_eq!(format!("{}", item.advanced(None).advanced(None)), "S -> NP VP ⋅");

        let eps = Production::new("A".into(), vec![]);
        assert_eq!(format!("{}", Item::initial(&eps, 2)), "A -> ⋅");

        let term = Production::new("N".into(), vec![Terminal::from("they").into()]);
        assert_eq!(
            format!("{:?}", Item::initial(&term, 3).advanced(None)),
            "Item(N -> they ⋅ (3) [])"
        );
    }
}
