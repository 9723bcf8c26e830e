use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extras offered on the passenger step. Each carries one flat surcharge
/// per booking, not per passenger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AddOn {
    #[serde(rename = "Extra baggage")]
    ExtraBaggage,
    #[serde(rename = "Seat selection")]
    SeatSelection,
    #[serde(rename = "Travel insurance")]
    TravelInsurance,
    #[serde(rename = "Priority boarding")]
    PriorityBoarding,
    #[serde(rename = "Lounge access")]
    LoungeAccess,
    #[serde(rename = "Meal upgrade")]
    MealUpgrade,
    #[serde(rename = "Extra legroom")]
    ExtraLegroom,
    #[serde(rename = "WiFi access")]
    WifiAccess,
}

impl AddOn {
    /// Catalog order, which is also the order selections are listed in.
    pub const ALL: [AddOn; 8] = [
        AddOn::ExtraBaggage,
        AddOn::SeatSelection,
        AddOn::TravelInsurance,
        AddOn::PriorityBoarding,
        AddOn::LoungeAccess,
        AddOn::MealUpgrade,
        AddOn::ExtraLegroom,
        AddOn::WifiAccess,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AddOn::ExtraBaggage => "Extra baggage",
            AddOn::SeatSelection => "Seat selection",
            AddOn::TravelInsurance => "Travel insurance",
            AddOn::PriorityBoarding => "Priority boarding",
            AddOn::LoungeAccess => "Lounge access",
            AddOn::MealUpgrade => "Meal upgrade",
            AddOn::ExtraLegroom => "Extra legroom",
            AddOn::WifiAccess => "WiFi access",
        }
    }

    /// Surcharge in whole pounds.
    pub fn surcharge(&self) -> Decimal {
        let pounds = match self {
            AddOn::ExtraBaggage => 45,
            AddOn::SeatSelection => 35,
            AddOn::TravelInsurance => 28,
            AddOn::PriorityBoarding => 25,
            AddOn::LoungeAccess => 65,
            AddOn::MealUpgrade => 38,
            AddOn::ExtraLegroom => 55,
            AddOn::WifiAccess => 18,
        };
        Decimal::from(pounds)
    }

    pub fn from_name(name: &str) -> Option<AddOn> {
        AddOn::ALL.iter().copied().find(|a| a.name() == name)
    }
}

impl fmt::Display for AddOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown add-on: {0}")]
pub struct UnknownAddOn(pub String);

/// `base * passengers + sum(surcharges)`, to two decimal places.
pub fn quote_total(base_price: Decimal, passengers: u32, add_ons: &[AddOn]) -> Decimal {
    let extras: Decimal = add_ons.iter().map(AddOn::surcharge).sum();
    to_money(base_price * Decimal::from(passengers) + extras)
}

pub fn parse_add_ons<S: AsRef<str>>(names: &[S]) -> Result<Vec<AddOn>, UnknownAddOn> {
    names
        .iter()
        .map(|n| AddOn::from_name(n.as_ref()).ok_or_else(|| UnknownAddOn(n.as_ref().to_string())))
        .collect()
}

/// Rounds half away from zero to pennies and pins the scale at 2, so
/// `985` renders as `985.00`.
pub fn to_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_total_price_law() {
        let base = price("985.00");
        let one = [AddOn::LoungeAccess];
        let all_sum: Decimal = AddOn::ALL.iter().map(AddOn::surcharge).sum();
        assert_eq!(all_sum, Decimal::from(309));

        for n in [1u32, 2, 4] {
            let expected_base = base * Decimal::from(n);
            assert_eq!(quote_total(base, n, &[]), to_money(expected_base));
            assert_eq!(quote_total(base, n, &one), to_money(expected_base + Decimal::from(65)));
            assert_eq!(quote_total(base, n, &AddOn::ALL), to_money(expected_base + all_sum));
        }
    }

    #[test]
    fn test_total_renders_with_two_decimals() {
        assert_eq!(quote_total(price("1245"), 2, &[AddOn::WifiAccess]).to_string(), "2508.00");
        assert_eq!(quote_total(price("99.995"), 1, &[]).to_string(), "100.00");
    }

    #[test]
    fn test_names_round_trip_through_catalog() {
        for add_on in AddOn::ALL {
            assert_eq!(AddOn::from_name(add_on.name()), Some(add_on));
            let json = serde_json::to_string(&add_on).unwrap();
            assert_eq!(json, format!("\"{}\"", add_on.name()));
        }
    }

    #[test]
    fn test_unknown_add_on_is_reported() {
        let err = parse_add_ons(&["Seat selection", "Jetpack"]).unwrap_err();
        assert_eq!(err, UnknownAddOn("Jetpack".to_string()));
    }
}
