use tracing::{debug, trace};

use crate::{
    Grammar, Terminal, Token,
    derivation::Derivation,
    error::Error,
    item::{BackPointer, Item, StateSet},
    token::EOF,
};

/// 图表构建中的一类操作.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Predict,
    Scan,
    Complete,
}

/// 一次成功插入新项的结构化记录, 代替混在算法里的直接输出.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    pub step: Step,
    /// 触发这步操作的项 (状态集编号, 集内下标).
    pub from: (usize, usize),
    /// 新插入的项.
    pub to: (usize, usize),
}

/// Earley 图表: 每个输入位置一个状态集, 一次 parse 调用构建一次, 之后只读.
#[derive(Debug)]
pub struct Chart<'a> {
    sets: Vec<StateSet<'a>>,
    events: Vec<StepEvent>,
}

impl PartialEq for Chart<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.sets == other.sets
    }
}

impl Eq for Chart<'_> {}

/// 一次 parse 调用的结果, 两种情况都保留图表供外部诊断.
///
/// 被拒绝是正常的可报告结果, 不是错误.
#[derive(Debug)]
pub enum ParseResult<'a> {
    Accepted {
        chart: Chart<'a>,
        derivation: Derivation,
    },
    Rejected {
        chart: Chart<'a>,
    },
}

impl<'a> ParseResult<'a> {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    #[must_use]
    pub fn chart(&self) -> &Chart<'a> {
        match self {
            Self::Accepted { chart, .. } | Self::Rejected { chart } => chart,
        }
    }

    #[must_use]
    pub fn derivation(&self) -> Option<&Derivation> {
        match self {
            Self::Accepted { derivation, .. } => Some(derivation),
            Self::Rejected { .. } => None,
        }
    }
}

impl<'a> Chart<'a> {
    /// 对一个以 [`EOF`] 结尾的句子构建图表并判定接受, 不限制项数量.
    pub fn parse(
        grammar: &Grammar<'a>,
        sentence: &[Terminal<'a>],
    ) -> Result<ParseResult<'a>, Error> {
        Self::parse_with_budget(grammar, sentence, usize::MAX)
    }

    /// 同 [`Chart::parse`], 但是限制整张图表最多插入 `budget` 个项.
    ///
    /// 项数量对句子长度是多项式量级的, budget 是嵌入方的安全阀.
    /// # Errors
    /// - [`Error::MissingEndMarker`] 句子末尾不是 [`EOF`].
    /// - [`Error::NonTerminalInInput`] 句子中出现了字母表声明的非终结符.
    /// - [`Error::BudgetExhausted`] 插入的项超过 `budget`.
    ///
    /// 不在字母表中的生词不是错误, 只会扫描失败从而正常拒绝.
    pub fn parse_with_budget(
        grammar: &Grammar<'a>,
        sentence: &[Terminal<'a>],
        budget: usize,
    ) -> Result<ParseResult<'a>, Error> {
        if sentence.last() != Some(&EOF) {
            Err(Error::MissingEndMarker)?
        }
        for (position, term) in sentence.iter().enumerate() {
            if grammar.alphabet().is_non_term(term.as_str()) {
                Err(Error::NonTerminalInInput {
                    position,
                    symbol: term.as_str().to_string(),
                })?
            }
        }
        let mut chart = Self {
            sets: (0..sentence.len()).map(|_| StateSet::new()).collect(),
            events: Vec::new(),
        };
        let mut inserted = 0usize;
        // 种子: 起始符的全部产生式.
        for &prod in grammar.prods_of(grammar.symbol_start()) {
            let (_, fresh) = chart.sets[0].push(Item::initial(prod, 0));
            if fresh {
                inserted += 1;
                if inserted > budget {
                    Err(Error::BudgetExhausted(budget))?
                }
            }
        }
        for i in 0..chart.sets.len() {
            // 状态集同时是工作队列: 按插入顺序处理, 产生的同位置新项追加到队列尾部,
            // 预测和完成在同一个位置内交错, 直到不再有新项 (不动点).
            let mut j = 0;
            while j < chart.sets[i].len() {
                let item = chart.sets[i].items()[j].clone();
                match item.next() {
                    // 预测: 期望一个非终结符, 把它的所有产生式加入当前状态集.
                    Some(Token::NonTerminal(nt)) => {
                        for &prod in grammar.prods_of(nt) {
                            chart.insert(
                                Step::Predict,
                                (i, j),
                                i,
                                Item::initial(prod, i),
                                &mut inserted,
                                budget,
                            )?;
                        }
                        // 可空 (含间接可空) 的 nt 在当前位置可能已经有完成项,
                        // 而它的完成步骤可能早已处理完, 这里直接跨过去, 不依赖处理顺序.
                        // 直接空产生式刚插入就是完成项, 同样由这条路径覆盖.
                        let nullable = chart.sets[i].items().iter().position(|done| {
                            done.is_complete() && done.prod().head() == nt && done.origin() == i
                        });
                        if let Some(index) = nullable {
                            let bp = BackPointer { set: i, index };
                            chart.insert(
                                Step::Complete,
                                (i, index),
                                i,
                                item.advanced(Some(bp)),
                                &mut inserted,
                                budget,
                            )?;
                        }
                    }
                    // 扫描: 期望的终结符和当前输入一致时把前进后的项放入下一个状态集.
                    Some(Token::Terminal(t)) => {
                        if t == sentence[i] {
                            // 文法校验保证 EOF 不出现在产生式中,
                            // 最后一个状态集不会发生扫描, i + 1 一定在范围内.
                            chart.insert(
                                Step::Scan,
                                (i, j),
                                i + 1,
                                item.advanced(None),
                                &mut inserted,
                                budget,
                            )?;
                        }
                    }
                    // 完成: 产生式完全匹配, 推进 origin 处所有等待这个头部的项.
                    None => {
                        let head = item.prod().head();
                        let bp = BackPointer { set: i, index: j };
                        // origin == i 时一边遍历一边追加会产生别名, 先收集再插入.
                        let advanced: Vec<Item<'a>> = chart.sets[item.origin()]
                            .items()
                            .iter()
                            .filter(|prior| {
                                matches!(prior.next(), Some(Token::NonTerminal(nt)) if nt == head)
                            })
                            .map(|prior| prior.advanced(Some(bp)))
                            .collect();
                        for next in advanced {
                            chart.insert(Step::Complete, (i, j), i, next, &mut inserted, budget)?;
                        }
                    }
                }
                j += 1;
            }
        }
        // 接受判定: 最后一个状态集中起始符的完成项, 且从位置 0 开始匹配.
        // 插入顺序决定歧义时的取舍, 取最先发现的那个.
        let start = grammar.symbol_start();
        let last = chart.sets.len() - 1;
        let accepted = chart.sets[last]
            .items()
            .iter()
            .position(|item| item.prod().head() == start && item.is_complete() && item.origin() == 0);
        debug!(
            "chart built, {} items in {} sets, accepted: {}",
            inserted,
            chart.sets.len(),
            accepted.is_some()
        );
        match accepted {
            Some(index) => {
                let derivation = Derivation::extract(&chart, (last, index));
                Ok(ParseResult::Accepted { chart, derivation })
            }
            None => Ok(ParseResult::Rejected { chart }),
        }
    }

    fn insert(
        &mut self,
        step: Step,
        from: (usize, usize),
        set: usize,
        item: Item<'a>,
        inserted: &mut usize,
        budget: usize,
    ) -> Result<(usize, bool), Error> {
        let (index, fresh) = self.sets[set].push(item);
        if fresh {
            *inserted += 1;
            if *inserted > budget {
                Err(Error::BudgetExhausted(budget))?
            }
            trace!(
                "{:?} on ({}, {}), generates ({}, {}): {}",
                step, from.0, from.1, set, index, self.sets[set].items()[index]
            );
            self.events.push(StepEvent {
                step,
                from,
                to: (set, index),
            });
        }
        Ok((index, fresh))
    }

    /// 按输入位置遍历状态集.
    #[must_use]
    pub fn sets(&self) -> &[StateSet<'a>] {
        &self.sets
    }

    /// 按坐标取项, 坐标不存在时返回 [`None`].
    #[must_use]
    pub fn item(&self, (set, index): (usize, usize)) -> Option<&Item<'a>> {
        self.sets.get(set)?.items().get(index)
    }

    /// 构建过程的结构化事件日志, 按发生顺序.
    #[must_use]
    pub fn events(&self) -> &[StepEvent] {
        &self.events
    }
}
