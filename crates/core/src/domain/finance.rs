use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub cantidad: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub cantidad: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    #[serde(with = "rust_decimal::serde::float")]
    pub monto: Decimal,
    pub descripcion: String,
    pub usu_gas: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id_gas: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub monto: Decimal,
    pub descripcion: String,
}

/// Renders an amount with two decimals, e.g. `$1250.50`.
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{format_money, NewExpense, SalesSummary};

    #[test]
    fn summary_decodes_numeric_totals() {
        let summary: SalesSummary =
            serde_json::from_str(r#"{"total": 1250.5, "cantidad": 14}"#).expect("decode");
        assert_eq!(summary.total, Decimal::new(12505, 1));
        assert_eq!(summary.cantidad, 14);
    }

    #[test]
    fn new_expense_serializes_amount_as_number() {
        let payload = serde_json::to_value(NewExpense {
            monto: Decimal::new(2550, 2),
            descripcion: "gas".to_string(),
            usu_gas: 3,
        })
        .expect("encode");
        assert_eq!(payload["monto"], serde_json::json!(25.5));
        assert_eq!(payload["usu_gas"], 3);
    }

    #[test]
    fn money_always_has_two_decimals() {
        assert_eq!(format_money(Decimal::new(12505, 1)), "$1250.50");
        assert_eq!(format_money(Decimal::new(3, 0)), "$3.00");
    }
}
