use bumpalo::Bump;
use std::{
    collections::{HashMap, HashSet},
    fmt::{Debug, Display},
};

use crate::{
    NonTerminal, Terminal, Token,
    error::{Error, ParseProductionError},
    token::{Alphabet, EOF},
};

#[derive(Clone, Hash, PartialOrd, Ord)]
pub struct Production<'a> {
    // 产生式 `->` 左侧内容.
    head: NonTerminal<'a>,
    // 产生式 `->` 右侧内容, 空序列表示 epsilon 产生式.
    tail: Vec<Token<'a>>,
}

impl Debug for Production<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Production")
            .field(&format_args!(
                "{:?} -> {}",
                self.head,
                self.tail
                    .iter()
                    .map(|t| format!("{:?} ", t))
                    .collect::<String>()
                    .trim_end()
            ))
            .finish()
    }
}

impl Display for Production<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(
            format!(
                "{} -> {}",
                self.head,
                self.tail
                    .iter()
                    .map(|t| format!("{} ", t))
                    .collect::<String>()
                    .trim_end()
            )
            .trim_end(),
        )
    }
}

impl PartialEq for Production<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.tail == other.tail
    }
}

impl Eq for Production<'_> {}

impl<'a> Production<'a> {
    #[must_use]
    pub fn new(head: NonTerminal<'a>, tail: Vec<Token<'a>>) -> Self {
        Self { head, tail }
    }

    #[must_use]
    pub fn head(&self) -> NonTerminal<'a> {
        self.head
    }

    #[must_use]
    pub fn tail(&self) -> &[Token<'a>] {
        &self.tail
    }

    /// 产生式尾部的 tokens 数量.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tail.len()
    }

    /// 是否为 epsilon 产生式.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tail.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Grammar<'a> {
    prods: Vec<&'a Production<'a>>,
    prod_indexes: HashMap<&'a Production<'a>, usize>,
    /// 按头部非终结符索引的产生式, 每组内保持书写顺序, 供 O(1) 查询.
    prods_by_head: HashMap<NonTerminal<'a>, Vec<&'a Production<'a>>>,
    alphabet: Alphabet<'a>,
    start: NonTerminal<'a>,
}

impl PartialEq for Grammar<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.prods == other.prods && self.start == other.start && self.alphabet == other.alphabet
    }
}

impl Eq for Grammar<'_> {}

impl<'a> Grammar<'a> {
    /// 从产生式列表和显式的字母表划分构造文法, 所有校验在任何图表构建之前完成.
    /// # Errors
    /// - [`Error::UnknownSymbol`] 产生式引用了划分之外的符号.
    /// - [`Error::SymbolKindMismatch`] 产生式中符号的种类和划分声明不一致.
    /// - [`Error::ReservedSymbol`] [`EOF`] 出现在产生式中.
    /// - [`Error::StartSymbolNotFound`] 起始符不是非终结符或者没有任何产生式.
    pub fn new(
        prods: Vec<Production<'a>>,
        start: NonTerminal<'a>,
        alphabet: Alphabet<'a>,
        bump: &'a Bump,
    ) -> Result<Self, Error> {
        if !alphabet.is_non_term(start.as_str()) {
            Err(Error::StartSymbolNotFound(start.as_str().to_string()))?
        }
        for prod in &prods {
            if alphabet.classify(prod.head().as_str())? != Token::from(prod.head()) {
                Err(Error::SymbolKindMismatch(prod.head().as_str().to_string()))?
            }
            for tok in prod.tail() {
                if tok.as_str() == EOF.as_str() {
                    Err(Error::ReservedSymbol(EOF.as_str().to_string()))?
                }
                if alphabet.classify(tok.as_str())? != *tok {
                    Err(Error::SymbolKindMismatch(tok.as_str().to_string()))?
                }
            }
        }
        let mut prod_indexes = HashMap::new();
        let mut prods_by_head: HashMap<_, Vec<_>> = HashMap::new();
        let mut prod_refs: Vec<&'a Production<'a>> = Vec::new();
        for prod in prods {
            let prod = &*bump.alloc(prod);
            let index = prod_refs.len();
            prod_indexes.entry(prod).or_insert(index);
            prods_by_head.entry(prod.head()).or_default().push(prod);
            prod_refs.push(prod);
        }
        let grammar = Self {
            prods: prod_refs,
            prod_indexes,
            prods_by_head,
            alphabet,
            start,
        };
        if grammar.prods_of(start).is_empty() {
            Err(Error::StartSymbolNotFound(start.as_str().to_string()))?
        }
        Ok(grammar)
    }

    /// 从 CFG 文本构造文法, 字母表划分由文本推导: 所有出现在 `->` 左侧的符号是非终结符,
    /// 其余符号是终结符. 空的候选式 (`|` 之间没有符号) 表示 epsilon 产生式.
    pub fn from_cfg(s: &'a str, start: NonTerminal<'a>, bump: &'a Bump) -> Result<Self, Error> {
        let mut non_terminals = HashSet::new();
        let mut splitted: Vec<(&str, &str)> = Vec::new();
        // 找出所有的非终结符.
        for (line_num, line) in s
            .lines()
            .enumerate()
            .filter(|(_, s)| !s.is_empty() && s.chars().any(|c| !c.is_whitespace()))
        {
            let parts = line.split_once("->").ok_or(Error::parse_production_error(
                line_num,
                ParseProductionError::NoArrow,
            ))?;
            let head_ident = parts.0.trim();
            splitted.push((head_ident, parts.1));
            non_terminals.insert(head_ident);
        }
        // 验证是否有起始符.
        if !non_terminals.contains(&start.as_str()) {
            Err(Error::parse_production_error(
                0,
                ParseProductionError::StartSymbolNotFound,
            ))?
        }
        // 解析所有产生式.
        let mut terminals = Vec::new();
        let mut prods = Vec::new();
        for (head_ident, tails) in splitted {
            for tail_s in tails.split('|') {
                let tail = tail_s
                    .split_ascii_whitespace()
                    .map(|s| {
                        let s = s.trim();
                        if non_terminals.contains(&s) {
                            Token::from(NonTerminal::from(s))
                        } else {
                            let t = Terminal::from(s);
                            terminals.push(t);
                            Token::from(t)
                        }
                    })
                    .collect();
                prods.push(Production::new(NonTerminal::from(head_ident), tail));
            }
        }
        let alphabet = Alphabet::new(
            terminals,
            non_terminals.into_iter().map(NonTerminal::from),
        )?;
        Self::new(prods, start, alphabet, bump)
    }

    /// 按产生式编号遍历产生式.
    pub fn prods(&self) -> &[&'a Production<'a>] {
        &self.prods
    }

    /// 获取产生式的编号, 如果产生式在文法中不存在, 那么返回 [`None`].
    #[must_use]
    pub fn index_of_prod(&self, prod: &Production<'a>) -> Option<usize> {
        self.prod_indexes.get(prod).copied()
    }

    #[must_use]
    pub fn symbol_start(&self) -> NonTerminal<'a> {
        self.start
    }

    #[must_use]
    pub fn alphabet(&self) -> &Alphabet<'a> {
        &self.alphabet
    }

    /// 获取以某个非终结符为头部的所有产生式, 结果可能为空, 组内保持书写顺序.
    #[must_use]
    pub fn prods_of(&self, nt: NonTerminal<'a>) -> &[&'a Production<'a>] {
        self.prods_by_head.get(&nt).map_or(&[], |v| v.as_slice())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        NonTerminal, Production, Terminal,
        error::{Error, ParseProductionError},
        grammar::Grammar,
        token::Alphabet,
    };
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_productions() {
        let input = "
            S -> NP VP
            NP -> N PP | N
            PP -> P NP
            N -> they | fish
            P -> in
        ";
        let bump = Bump::new();
        let grammar = Grammar::from_cfg(input, "S".into(), &bump).unwrap();

        let prods = [
            Production::new(
                "S".into(),
                vec![NonTerminal::from("NP").into(), NonTerminal::from("VP").into()],
            ),
            Production::new(
                "NP".into(),
                vec![NonTerminal::from("N").into(), NonTerminal::from("PP").into()],
            ),
            Production::new("NP".into(), vec![NonTerminal::from("N").into()]),
            Production::new(
                "PP".into(),
                vec![NonTerminal::from("P").into(), NonTerminal::from("NP").into()],
            ),
            Production::new("N".into(), vec![Terminal::from("they").into()]),
            Production::new("N".into(), vec![Terminal::from("fish").into()]),
            Production::new("P".into(), vec![Terminal::from("in").into()]),
        ];

        assert_eq!(grammar.symbol_start(), "S".into());
        assert_eq!(grammar.prods(), prods.iter().collect::<Vec<_>>());
        assert_eq!(
            grammar
                .prods()
                .iter()
                .map(|p| grammar.index_of_prod(p).unwrap())
                .collect::<Vec<_>>(),
            (0..prods.len()).collect::<Vec<_>>()
        );
        // 按头部查询, 保持书写顺序.
        assert_eq!(
            grammar.prods_of("NP".into()).to_vec(),
            vec![&prods[1], &prods[2]]
        );
        assert!(grammar.prods_of("VP".into()).is_empty());
        // VP 在左侧出现过, 是非终结符; they 没有, 是终结符.
        assert!(grammar.alphabet().is_non_term("VP"));
        assert!(grammar.alphabet().is_term("they"));
        assert!(grammar.alphabet().is_term("eof"));
    }

    #[test]
    fn epsilon_alternative() {
        let bump = Bump::new();
        let grammar = Grammar::from_cfg("S -> a S |", "S".into(), &bump).unwrap();
        assert_eq!(
            grammar.prods_of("S".into()).to_vec(),
            vec![
                &Production::new(
                    "S".into(),
                    vec![Terminal::from("a").into(), NonTerminal::from("S").into()]
                ),
                &Production::new("S".into(), vec![]),
            ]
        );
        assert!(grammar.prods()[1].is_empty());
        assert_eq!(format!("{}", grammar.prods()[1]), "S ->");
    }

    #[test]
    fn malformed_cfg() {
        let bump = Bump::new();
        assert_eq!(
            Grammar::from_cfg("S NP VP", "S".into(), &bump).unwrap_err(),
            Error::ParseProductionError {
                line: 0,
                cause: ParseProductionError::NoArrow
            }
        );
        assert_eq!(
            Grammar::from_cfg("S -> a", "T".into(), &bump).unwrap_err(),
            Error::ParseProductionError {
                line: 0,
                cause: ParseProductionError::StartSymbolNotFound
            }
        );
        // 结束符保留, 不允许写进产生式.
        assert_eq!(
            Grammar::from_cfg("S -> a eof", "S".into(), &bump).unwrap_err(),
            Error::ReservedSymbol("eof".to_string())
        );
    }

    #[test]
    fn explicit_partition_validation() {
        let bump = Bump::new();
        let alphabet = || {
            Alphabet::new(
                [Terminal::from("a")],
                [NonTerminal::from("S"), NonTerminal::from("A")],
            )
            .unwrap()
        };
        // 引用划分之外的符号.
        assert_eq!(
            Grammar::new(
                vec![Production::new(
                    "S".into(),
                    vec![Terminal::from("b").into()]
                )],
                "S".into(),
                alphabet(),
                &bump,
            )
            .unwrap_err(),
            Error::UnknownSymbol("b".to_string())
        );
        // 符号种类和划分声明不一致: A 声明为非终结符, 产生式中写成终结符.
        assert_eq!(
            Grammar::new(
                vec![Production::new(
                    "S".into(),
                    vec![Terminal::from("A").into()]
                )],
                "S".into(),
                alphabet(),
                &bump,
            )
            .unwrap_err(),
            Error::SymbolKindMismatch("A".to_string())
        );
        // 头部声明为终结符: 和尾部一样报种类不匹配, 不是未知符号.
        assert_eq!(
            Grammar::new(
                vec![Production::new("a".into(), vec![])],
                "S".into(),
                alphabet(),
                &bump,
            )
            .unwrap_err(),
            Error::SymbolKindMismatch("a".to_string())
        );
        // 起始符没有产生式.
        assert_eq!(
            Grammar::new(
                vec![Production::new(
                    "A".into(),
                    vec![Terminal::from("a").into()]
                )],
                "S".into(),
                alphabet(),
                &bump,
            )
            .unwrap_err(),
            Error::StartSymbolNotFound("S".to_string())
        );
    }
}
