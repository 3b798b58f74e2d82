//! Order book error types

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the order book engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// Invalid or duplicate initialization; the engine must be discarded
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Event applied before the engine was initialized
    #[error("order book not initialized - call initialize first")]
    NotInitialized,
    /// Incremental update received before any snapshot
    #[error("stale update: no snapshot has been applied yet")]
    StaleUpdate,
    /// Level with a non-positive price or negative amount
    #[error("invalid price level: price={price}, amount={amount}")]
    InvalidLevel { price: Decimal, amount: Decimal },
}

impl BookError {
    /// Whether the event loop may drop the offending event and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BookError::StaleUpdate | BookError::InvalidLevel { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = BookError::InvalidLevel {
            price: dec!(-1),
            amount: dec!(2),
        };
        assert_eq!(err.to_string(), "invalid price level: price=-1, amount=2");
        assert_eq!(
            BookError::Configuration("missing market id".into()).to_string(),
            "configuration error: missing market id"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(BookError::StaleUpdate.is_recoverable());
        assert!(BookError::InvalidLevel {
            price: dec!(0),
            amount: dec!(1)
        }
        .is_recoverable());
        assert!(!BookError::NotInitialized.is_recoverable());
        assert!(!BookError::Configuration(String::new()).is_recoverable());
    }
}
