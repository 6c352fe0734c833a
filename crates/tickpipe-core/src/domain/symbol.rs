use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 15;

/// Exchange ticker, trimmed and upper-cased.
///
/// Index tickers may start with `^` (`^GSPC`), Asian listings with a digit
/// (`7203.T`); currency pairs may carry an `=` suffix (`EURUSD=X`).
///
/// The same value doubles as the stream partition key, so every record for a
/// ticker lands on the same shard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();

        let mut chars = ticker.chars();
        match chars.next() {
            None => return Err(ValidationError::EmptySymbol),
            Some(ch) if !(ch.is_ascii_alphanumeric() || ch == '^') => {
                return Err(ValidationError::SymbolInvalidStart { ch })
            }
            Some(_) => {}
        }

        let len = ticker.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some((index, ch)) = ticker
            .chars()
            .enumerate()
            .skip(1)
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '=')))
        {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        Ok(Self(ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Partition key used when the symbol's records are written to a stream.
    pub fn partition_key(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_ticker_case_and_whitespace() {
        let symbol = Symbol::parse(" aapl ").expect("symbol should parse");
        assert_eq!(symbol.as_str(), "AAPL");
        assert_eq!(symbol.partition_key(), "AAPL");
    }

    #[test]
    fn accepts_share_class_suffix() {
        let symbol = Symbol::parse("brk-b").expect("symbol should parse");
        assert_eq!(symbol.as_str(), "BRK-B");
    }

    #[test]
    fn accepts_index_and_currency_pair_tickers() {
        assert_eq!(Symbol::parse("^gspc").expect("index").as_str(), "^GSPC");
        assert_eq!(Symbol::parse("eurusd=x").expect("pair").as_str(), "EURUSD=X");
    }

    #[test]
    fn accepts_numeric_exchange_listings() {
        assert_eq!(Symbol::parse("7203.t").expect("tokyo").as_str(), "7203.T");
        assert_eq!(Symbol::parse("0700.HK").expect("hong kong").as_str(), "0700.HK");
        assert_eq!(Symbol::parse("005930.KS").expect("seoul").as_str(), "005930.KS");
    }

    #[test]
    fn caret_is_only_allowed_first() {
        let err = Symbol::parse("GS^PC").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::SymbolInvalidChar { ch: '^', index: 2 }
        ));
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(Symbol::parse("   "), Err(ValidationError::EmptySymbol));
    }

    #[test]
    fn rejects_leading_punctuation() {
        let err = Symbol::parse(".AAPL").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidStart { ch: '.' }));
    }

    #[test]
    fn rejects_disallowed_characters() {
        let err = Symbol::parse("AAPL$").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::SymbolInvalidChar { ch: '$', index: 4 }
        ));
    }

    #[test]
    fn rejects_overlong_ticker() {
        let err = Symbol::parse("ABCDEFGHIJKLMNOP").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolTooLong { len: 16, .. }));
    }
}
