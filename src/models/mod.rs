pub mod finance;
pub mod notifications;
pub mod quotes;
pub mod sales;
pub mod settings;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Limite superior de quantidade, espelhando o NUMERIC(12, 3) das colunas:
/// até 9 dígitos na parte inteira.
const MAX_QUANTITY: i64 = 1_000_000_000;

/// Quantidades precisam ser estritamente positivas e caber na coluna;
/// valores fora da faixa são rejeitados aqui, antes do cálculo de totais.
pub fn validate_positive_quantity(quantity: &Decimal) -> Result<(), ValidationError> {
    if !quantity.is_sign_positive() || quantity.is_zero() {
        let mut err = ValidationError::new("quantity_positive");
        err.message = Some("Quantity must be positive".into());
        return Err(err);
    }
    if *quantity >= Decimal::from(MAX_QUANTITY) {
        let mut err = ValidationError::new("quantity_out_of_range");
        err.message = Some("Quantity is too large".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn quantity_must_be_strictly_positive() {
        assert!(validate_positive_quantity(&dec("0.001")).is_ok());
        assert!(validate_positive_quantity(&dec("0")).is_err());
        assert!(validate_positive_quantity(&dec("-1")).is_err());
    }

    #[test]
    fn quantity_must_fit_the_column() {
        assert!(validate_positive_quantity(&dec("999999999.999")).is_ok());
        assert!(validate_positive_quantity(&dec("1000000000")).is_err());
        assert!(validate_positive_quantity(&dec("70000000000000000000000000000")).is_err());
    }
}
