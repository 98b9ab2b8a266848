// ============================================================================
// Structure : Ticker
// ============================================================================
// Symbole boursier saisi par l'utilisateur (ex: "AAPL", "BRK.B")
//
// CONCEPTS RUST :
// 1. Newtype pattern : un String qui ne peut exister que validé
// 2. Constructeur faillible : parse() retourne Result
// 3. Display : permet format!("{}", ticker)
// ============================================================================

use std::fmt;

use crate::error::TickerError;

/// Ticker validé : au moins un caractère alphanumérique, sans espace, en majuscules
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    /// Normalise la saisie utilisateur
    ///
    /// CONCEPT RUST : Validation à la construction
    /// - "..", "." ou "-" seuls sont rejetés : ce ne sont pas des symboles
    /// - La ponctuation restante ("/", "#", "&") est encodée par le client HTTP
    pub fn parse(input: &str) -> Result<Self, TickerError> {
        let symbol = input.trim();
        if symbol.is_empty() {
            return Err(TickerError::Empty);
        }

        let has_alphanumeric = symbol.chars().any(char::is_alphanumeric);
        let has_blank = symbol.chars().any(|c| c.is_whitespace() || c.is_control());
        if !has_alphanumeric || has_blank {
            return Err(TickerError::Invalid(symbol.to_string()));
        }

        Ok(Self(symbol.to_uppercase()))
    }

    /// Symbole sous forme de &str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_uppercase() {
        let ticker = Ticker::parse("aapl").unwrap();
        assert_eq!(ticker.as_str(), "AAPL");
        assert_eq!(ticker.to_string(), "AAPL");
    }

    #[test]
    fn test_ticker_trimmed() {
        let ticker = Ticker::parse("  brk.b \n").unwrap();
        assert_eq!(ticker.as_str(), "BRK.B");
    }

    #[test]
    fn test_ticker_empty_rejected() {
        assert_eq!(Ticker::parse(""), Err(TickerError::Empty));
        assert_eq!(Ticker::parse("   "), Err(TickerError::Empty));
    }

    #[test]
    fn test_ticker_without_symbol_chars_rejected() {
        assert_eq!(Ticker::parse(".."), Err(TickerError::Invalid("..".to_string())));
        assert_eq!(Ticker::parse(" . "), Err(TickerError::Invalid(".".to_string())));
        assert!(matches!(Ticker::parse("BRK B"), Err(TickerError::Invalid(_))));
        assert_eq!(Ticker::parse("^gspc").unwrap().as_str(), "^GSPC");
    }
}
