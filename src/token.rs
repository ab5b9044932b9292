use std::{
    collections::BTreeSet,
    fmt::{Debug, Display},
};

use crate::error::Error;

#[derive(PartialEq, Eq, Clone, Hash, Copy, PartialOrd, Ord)]
pub struct Terminal<'a> {
    ident: &'a str,
}

impl Debug for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(r#"t{:?}"#, self.ident))
    }
}

impl Display for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.ident)
    }
}

impl<'a> From<&'a str> for Terminal<'a> {
    fn from(ident: &'a str) -> Self {
        Terminal { ident }
    }
}

impl<'a> Terminal<'a> {
    pub fn as_str(&self) -> &'a str {
        self.ident
    }
}

#[derive(PartialEq, Eq, Clone, Hash, Copy, PartialOrd, Ord)]
pub struct NonTerminal<'a> {
    ident: &'a str,
}

impl Debug for NonTerminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(r#"nt{:?}"#, self.ident))
    }
}

impl Display for NonTerminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.ident)
    }
}

/// 句子末尾的显式结束符, 永远属于终结符字母表, 不允许出现在产生式中.
pub const EOF: Terminal<'static> = Terminal { ident: "eof" };

impl<'a> From<&'a str> for NonTerminal<'a> {
    fn from(ident: &'a str) -> Self {
        Self { ident }
    }
}

impl<'a> NonTerminal<'a> {
    pub fn as_str(&self) -> &'a str {
        self.ident
    }
}

#[derive(Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Token<'a> {
    Terminal(Terminal<'a>),
    NonTerminal(NonTerminal<'a>),
}

impl Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(arg0) => f.pad(&format!("{:?}", arg0)),
            Self::NonTerminal(arg0) => f.pad(&format!("{:?}", arg0)),
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(arg0) => f.pad(&format!("{}", arg0)),
            Self::NonTerminal(arg0) => f.pad(&format!("{}", arg0)),
        }
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Terminal(l0), Self::Terminal(r0)) => l0 == r0,
            (Self::NonTerminal(l0), Self::NonTerminal(r0)) => l0 == r0,
            _ => false,
        }
    }
}

impl Eq for Token<'_> {}

impl Token<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Terminal(t) => t.as_str(),
            Self::NonTerminal(nt) => nt.as_str(),
        }
    }

    #[must_use]
    pub fn is_term(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    #[must_use]
    pub fn is_non_term(&self) -> bool {
        matches!(self, Self::NonTerminal(_))
    }
}

impl<'a> From<Terminal<'a>> for Token<'a> {
    fn from(value: Terminal<'a>) -> Self {
        Self::Terminal(value)
    }
}

impl<'a> From<NonTerminal<'a>> for Token<'a> {
    fn from(value: NonTerminal<'a>) -> Self {
        Self::NonTerminal(value)
    }
}

/// 符号字母表的显式划分: 终结符集合与非终结符集合.
///
/// 符号的归类只依赖划分的成员关系, 不依赖大小写之类的书写约定.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet<'a> {
    terms: BTreeSet<Terminal<'a>>,
    non_terms: BTreeSet<NonTerminal<'a>>,
}

impl<'a> Alphabet<'a> {
    /// 从两个符号集合构造字母表, [`EOF`] 自动加入终结符集合.
    /// # Errors
    /// - [`Error::AmbiguousSymbol`] 同一个符号同时声明为终结符和非终结符.
    /// - [`Error::ReservedSymbol`] [`EOF`] 被声明为非终结符.
    pub fn new(
        terms: impl IntoIterator<Item = Terminal<'a>>,
        non_terms: impl IntoIterator<Item = NonTerminal<'a>>,
    ) -> Result<Self, Error> {
        let mut terms: BTreeSet<_> = terms.into_iter().collect();
        terms.insert(EOF);
        let non_terms: BTreeSet<_> = non_terms.into_iter().collect();
        if non_terms.contains(&NonTerminal::from(EOF.as_str())) {
            Err(Error::ReservedSymbol(EOF.as_str().to_string()))?
        }
        if let Some(nt) = non_terms
            .iter()
            .find(|nt| terms.contains(&Terminal::from(nt.as_str())))
        {
            Err(Error::AmbiguousSymbol(nt.as_str().to_string()))?
        }
        Ok(Self { terms, non_terms })
    }

    /// 按划分归类一个符号.
    /// # Errors
    /// [`Error::UnknownSymbol`] 符号不在任何一个集合中.
    pub fn classify(&self, ident: &str) -> Result<Token<'a>, Error> {
        self.get_token(ident)
            .ok_or_else(|| Error::UnknownSymbol(ident.to_string()))
    }

    pub fn get_token<'b>(&self, ident: &'b str) -> Option<Token<'a>> {
        // 这里的返回值并不会引用输入参数 ident, 函数返回之后就结束对 ident 的使用, 因此无视此处生命周期的编译报错.
        let ident = unsafe { std::mem::transmute::<&'b str, &'a str>(ident) };
        self.non_terms
            .get(&NonTerminal::from(ident))
            .copied()
            .map(Token::from)
            .or_else(|| {
                self.terms
                    .get(&Terminal::from(ident))
                    .copied()
                    .map(Token::from)
            })
    }

    #[must_use]
    pub fn is_term(&self, ident: &str) -> bool {
        matches!(self.get_token(ident), Some(Token::Terminal(_)))
    }

    #[must_use]
    pub fn is_non_term(&self, ident: &str) -> bool {
        matches!(self.get_token(ident), Some(Token::NonTerminal(_)))
    }

    #[must_use]
    pub fn terms(&self) -> &BTreeSet<Terminal<'a>> {
        &self.terms
    }

    #[must_use]
    pub fn non_terms(&self) -> &BTreeSet<NonTerminal<'a>> {
        &self.non_terms
    }
}
