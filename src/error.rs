#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("Error parsing productions, line: {line}, cause: {cause:?}.")]
    ParseProductionError {
        line: usize,
        cause: ParseProductionError,
    },
    #[error("Symbol is not declared in the alphabet: {0}.")]
    UnknownSymbol(String),
    #[error("Symbol is declared both terminal and non-terminal: {0}.")]
    AmbiguousSymbol(String),
    #[error("Symbol kind does not match the alphabet declaration: {0}.")]
    SymbolKindMismatch(String),
    #[error("The end-of-input marker is reserved and cannot appear in a grammar: {0}.")]
    ReservedSymbol(String),
    #[error("Start symbol has no production: {0}.")]
    StartSymbolNotFound(String),
    #[error("Sentence does not end with the end-of-input marker.")]
    MissingEndMarker,
    #[error("Non-terminal in input sentence, position: {position}, symbol: {symbol}.")]
    NonTerminalInInput { position: usize, symbol: String },
    #[error("Item budget exhausted, limit: {0}.")]
    BudgetExhausted(usize),
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum ParseProductionError {
    #[error("No arrow in production line")]
    NoArrow,
    #[error("Start symbol not found")]
    StartSymbolNotFound,
}

impl Error {
    pub(crate) fn parse_production_error(line: usize, cause: ParseProductionError) -> Self {
        Self::ParseProductionError { line, cause }
    }
}
