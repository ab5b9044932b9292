use crate::{Chart, Terminal, Token};

/// 从接受项出发沿回指指针还原出来的一条规范推导.
///
/// 完成去重只保留最先发现的历史, 因此歧义输入也只还原一条推导,
/// 取舍由状态集的插入顺序决定.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    root: (usize, usize),
    trace: Vec<(usize, usize)>,
}

impl Derivation {
    /// 从 `root` 处的接受项做先序深度优先遍历, history 按记录顺序访问.
    pub(crate) fn extract(chart: &Chart<'_>, root: (usize, usize)) -> Self {
        let mut trace = Vec::new();
        let mut stack = vec![root];
        while let Some(coord) = stack.pop() {
            trace.push(coord);
            if let Some(item) = chart.item(coord) {
                // 逆序压栈, 弹出时恢复记录顺序.
                stack.extend(item.history().iter().rev().map(|bp| (bp.set, bp.index)));
            }
        }
        Self { root, trace }
    }

    /// 接受项的坐标 (状态集编号, 集内下标).
    #[must_use]
    pub fn root(&self) -> (usize, usize) {
        self.root
    }

    /// 推导涉及的所有项的坐标, 先序, 第一个元素是接受项自身.
    #[must_use]
    pub fn trace(&self) -> &[(usize, usize)] {
        &self.trace
    }

    /// 从左到右收集推导的叶子终结符, 结果等于去掉结束符的原输入.
    #[must_use]
    pub fn leaves<'a>(&self, chart: &Chart<'a>) -> Vec<Terminal<'a>> {
        let mut leaves = Vec::new();
        collect_leaves(chart, self.root, &mut leaves);
        leaves
    }

    /// 以缩进文本渲染推导树, 每行标注匹配的输入区间.
    #[must_use]
    pub fn render(&self, chart: &Chart<'_>) -> String {
        let mut out = String::new();
        render_node(chart, self.root, 0, &mut out);
        out.trim_end().to_string()
    }
}

fn collect_leaves<'a>(chart: &Chart<'a>, coord: (usize, usize), out: &mut Vec<Terminal<'a>>) {
    let Some(item) = chart.item(coord) else {
        return;
    };
    // 完成项的 history 和尾部的非终结符按顺序一一对应.
    let mut history = item.history().iter();
    for tok in item.prod().tail() {
        match tok {
            Token::Terminal(t) => out.push(*t),
            Token::NonTerminal(_) => {
                if let Some(bp) = history.next() {
                    collect_leaves(chart, (bp.set, bp.index), out);
                }
            }
        }
    }
}

fn render_node(chart: &Chart<'_>, coord: (usize, usize), depth: usize, out: &mut String) {
    let Some(item) = chart.item(coord) else {
        return;
    };
    out.push_str(&format!(
        "{}{} ({}..{})\n",
        "  ".repeat(depth),
        item,
        item.origin(),
        coord.0
    ));
    let mut history = item.history().iter();
    for tok in item.prod().tail() {
        if tok.is_non_term() {
            if let Some(bp) = history.next() {
                render_node(chart, (bp.set, bp.index), depth + 1, out);
            }
        }
    }
}
