use bigdecimal::BigDecimal;
use num_traits::{ToPrimitive, Zero};
use serde::Serializer;

pub trait BigDecimalHelpers {
    fn to_f64_or_zero(&self) -> f64;
}

impl BigDecimalHelpers for BigDecimal {
    fn to_f64_or_zero(&self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }
}

/// Largest amount a `NUMERIC(14, 2)` column holds.
pub const MAX_AMOUNT: f64 = 999_999_999_999.99;

pub fn from_f64(value: f64) -> Option<BigDecimal> {
    BigDecimal::try_from(value).ok().map(|bd| bd.round(2))
}

/// True when `value` is still positive after rounding to cents and fits the
/// money columns.
pub fn is_storable_amount(value: f64) -> bool {
    match from_f64(value) {
        Some(amount) => amount > BigDecimal::zero() && amount < BigDecimal::from(1_000_000_000_000i64),
        None => false,
    }
}

/// Money goes over the wire as a plain JSON number.
pub fn serialize_as_f64<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(value.to_f64_or_zero())
}

/// `400` for whole amounts, `400.5` otherwise.
pub fn format_amount(value: &BigDecimal) -> String {
    let amount = value.to_f64_or_zero();
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storable_amounts_survive_rounding() {
        assert!(is_storable_amount(0.01));
        assert!(is_storable_amount(MAX_AMOUNT));
        assert!(!is_storable_amount(0.004));
        assert!(!is_storable_amount(0.0));
        assert!(!is_storable_amount(-5.0));
        assert!(!is_storable_amount(1e12));
        assert!(!is_storable_amount(f64::NAN));
    }

    #[test]
    fn formats_whole_and_fractional_amounts() {
        assert_eq!(format_amount(&from_f64(400.0).unwrap()), "400");
        assert_eq!(format_amount(&from_f64(99.5).unwrap()), "99.5");
    }

    #[test]
    fn serializes_money_as_number() {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize_as_f64")]
            budget: BigDecimal,
        }

        let json = serde_json::to_value(Wrapper { budget: from_f64(500.0).unwrap() }).unwrap();
        assert_eq!(json["budget"], serde_json::json!(500.0));
    }
}
