// src/services/pricing.rs

// Cálculo de totais em centavos (inteiros). Nenhum valor monetário passa por
// ponto flutuante: quantidade é Decimal, preço unitário é i64 em centavos e o
// arredondamento é por linha, meio-para-cima, antes da soma.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Resultado do cálculo de um conjunto de linhas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: i64,
    pub total: i64,
}

/// Total de uma linha: `round(quantidade × preço_unitário)`, arredondando
/// para o centavo mais próximo (meio-para-cima).
pub fn line_total(quantity: Decimal, unit_price: i64) -> i64 {
    // Quantidades são validadas na entrada; satura se algo absurdo passar,
    // tanto no produto quanto na conversão de volta para centavos
    let Some(raw) = quantity.checked_mul(Decimal::from(unit_price)) else {
        return i64::MAX;
    };
    raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Subtotal e total de um conjunto de linhas `(quantidade, preço_unitário)`.
///
/// Vendas usam `floor_at_zero = true` (o total nunca fica negativo);
/// orçamentos usam `false` e podem ficar negativos se o desconto exceder o
/// subtotal. A assimetria é intencional.
pub fn compute_totals(lines: &[(Decimal, i64)], discount: i64, floor_at_zero: bool) -> Totals {
    let subtotal: i64 = lines
        .iter()
        .map(|&(quantity, unit_price)| line_total(quantity, unit_price))
        .sum();

    Totals {
        subtotal,
        total: apply_discount(subtotal, discount, floor_at_zero),
    }
}

/// Aplica o desconto sobre um subtotal já calculado. Usado também nas
/// atualizações parciais, onde o subtotal gravado é reaproveitado.
pub fn apply_discount(subtotal: i64, discount: i64, floor_at_zero: bool) -> i64 {
    let total = subtotal - discount;
    if floor_at_zero { total.max(0) } else { total }
}

/// Formata centavos como moeda brasileira: `130000` -> `"R$ 1.300,00"`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = abs / 100;
    let centavos = abs % 100;

    // Separador de milhar a cada 3 dígitos
    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{:02}", sign, grouped, centavos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn line_total_whole_quantity() {
        assert_eq!(line_total(dec("2"), 35000), 70000);
        assert_eq!(line_total(dec("1"), 60000), 60000);
    }

    #[test]
    fn line_total_rounds_half_up() {
        // 1.5 m³ × R$ 0,33 = 49,5 centavos -> 50
        assert_eq!(line_total(dec("1.5"), 33), 50);
        // 2.5 m³ × R$ 0,01 = 2,5 centavos -> 3 (meio-para-cima, não banker's)
        assert_eq!(line_total(dec("2.5"), 1), 3);
        // 0.333 × 100 = 33,3 -> 33
        assert_eq!(line_total(dec("0.333"), 100), 33);
    }

    #[test]
    fn line_total_saturates_instead_of_panicking() {
        // Quantidade absurda que estoura a multiplicação do Decimal
        assert_eq!(line_total(dec("70000000000000000000000000000"), 1000), i64::MAX);
        // Produto representável em Decimal, mas acima de i64 em centavos
        assert_eq!(line_total(dec("200000000000000000"), 100_000), i64::MAX);
    }

    #[test]
    fn subtotal_is_sum_of_rounded_lines() {
        // 2 × R$ 350,00 + 1 × R$ 600,00, sem desconto
        let lines = vec![(dec("2"), 35000), (dec("1"), 60000)];
        let totals = compute_totals(&lines, 0, false);
        assert_eq!(totals.subtotal, 130000);
        assert_eq!(totals.total, 130000);
    }

    #[test]
    fn recompute_is_deterministic() {
        let lines = vec![(dec("2.333"), 35000), (dec("0.5"), 12345)];
        let a = compute_totals(&lines, 500, true);
        let b = compute_totals(&lines, 500, true);
        assert_eq!(a, b);
    }

    #[test]
    fn sale_total_floors_at_zero() {
        // subtotal=50000, desconto=70000 -> 0, não -20000
        let lines = vec![(dec("1"), 50000)];
        let totals = compute_totals(&lines, 70000, true);
        assert_eq!(totals.subtotal, 50000);
        assert_eq!(totals.total, 0);
    }

    #[test]
    fn quote_total_may_go_negative() {
        // Orçamentos não têm piso em zero
        let lines = vec![(dec("1"), 50000)];
        let totals = compute_totals(&lines, 70000, false);
        assert_eq!(totals.total, -20000);
    }

    #[test]
    fn empty_lines_yield_zero_subtotal() {
        let totals = compute_totals(&[], 1000, true);
        assert_eq!(totals.subtotal, 0);
        assert_eq!(totals.total, 0);
    }

    #[test]
    fn format_brl_basic() {
        assert_eq!(format_brl(130000), "R$ 1.300,00");
        assert_eq!(format_brl(50), "R$ 0,50");
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(123456789), "R$ 1.234.567,89");
        assert_eq!(format_brl(-20000), "-R$ 200,00");
    }
}
