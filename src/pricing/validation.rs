//! Parse-and-validate boundary between raw form input and typed quote lines.
//!
//! Form fields arrive as strings. Everything that reaches the calculators
//! has been parsed here, so the engine can assume well-formed,
//! non-negative numbers.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{ClientInput, MaterialItem, MaterialMode, QuoteItem, ServiceFields};

use super::calculators::{checked_item_total, checked_quote_totals};
use super::requests::{MaterialInput, QuoteItemInput, ServiceInput};

/// Upper bound for any single price, quantity or factor
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Upper bound for the gross total of a line or a whole quote (10^15)
pub const MAX_TOTAL: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// VAT rates above this are rejected even when the policy allows any rate
pub const MAX_VAT_RATE: Decimal = Decimal::ONE_HUNDRED;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: String },

    #[error("Field '{field}' is not a number: '{value}'")]
    NotNumeric { field: String, value: String },

    #[error("Field '{field}' must not be negative")]
    Negative { field: String },

    #[error("Field '{field}' is too large (max {max})")]
    TooLarge { field: String, max: Decimal },

    #[error("Field '{field}' is too long (max {max} characters)")]
    TooLong { field: String, max: usize },

    #[error("Field '{field}' must be a whole percentage, got {value}")]
    NonIntegerVatRate { field: String, value: Decimal },

    #[error("Field '{field}' has unsupported VAT rate {rate}%")]
    UnsupportedVatRate { field: String, rate: Decimal },

    #[error("Field '{field}' has unknown material mode '{value}'")]
    UnknownMaterialMode { field: String, value: String },

    #[error("Field '{field}' totals more than {max}")]
    TotalTooLarge { field: String, max: Decimal },
}

impl ValidationError {
    /// Path of the offending field, e.g. `items[1].vat_rate`
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::NotNumeric { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::TooLarge { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::NonIntegerVatRate { field, .. }
            | ValidationError::UnsupportedVatRate { field, .. }
            | ValidationError::UnknownMaterialMode { field, .. }
            | ValidationError::TotalTooLarge { field, .. } => field,
        }
    }
}

/// VAT rates accepted at the input boundary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VatPolicy {
    /// Empty means any whole, non-negative rate is accepted
    pub allowed_rates: Vec<Decimal>,
}

impl VatPolicy {
    pub fn new(allowed_rates: Vec<Decimal>) -> Self {
        Self { allowed_rates }
    }

    /// Check a rate is whole, at most 100% and, when the policy lists rates,
    /// one of them
    pub fn check(&self, field: &str, rate: Decimal) -> Result<(), ValidationError> {
        if !rate.fract().is_zero() {
            return Err(ValidationError::NonIntegerVatRate {
                field: field.to_string(),
                value: rate,
            });
        }
        if rate > MAX_VAT_RATE {
            return Err(ValidationError::TooLarge {
                field: field.to_string(),
                max: MAX_VAT_RATE,
            });
        }
        if !self.allowed_rates.is_empty() && !self.allowed_rates.contains(&rate) {
            return Err(ValidationError::UnsupportedVatRate {
                field: field.to_string(),
                rate,
            });
        }
        Ok(())
    }
}

/// Parse a non-negative decimal from form text.
///
/// Accepts surrounding whitespace and a decimal comma (`12,50`). Returns
/// `Ok(None)` for blank input.
pub fn parse_amount(field: &str, raw: &str) -> Result<Option<Decimal>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let normalized = trimmed.replace(',', ".");
    let value = normalized
        .parse::<Decimal>()
        .map_err(|_| ValidationError::NotNumeric {
            field: field.to_string(),
            value: trimmed.to_string(),
        })?;

    check_amount(field, value)?;
    Ok(Some(value.normalize()))
}

fn check_amount(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if value > MAX_AMOUNT {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

fn required_amount(field: &str, raw: Option<&str>) -> Result<Decimal, ValidationError> {
    parse_amount(field, raw.unwrap_or(""))?.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })
}

fn optional_amount(field: &str, raw: Option<&str>) -> Result<Option<Decimal>, ValidationError> {
    match raw {
        Some(raw) => parse_amount(field, raw),
        None => Ok(None),
    }
}

fn required_name(field: &str, raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    check_len(field, name)?;
    Ok(name.to_string())
}

fn check_len(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Check a client payload before it is stored
pub fn validate_client(input: &ClientInput) -> Result<(), ValidationError> {
    required_name("name", &input.name)?;
    check_len("phone", &input.phone)?;
    check_len("email", &input.email)
}

fn parse_mode(field: &str, raw: Option<&str>) -> Result<MaterialMode, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(MaterialMode::default()),
        Some(value) => value
            .parse::<MaterialMode>()
            .map_err(|_| ValidationError::UnknownMaterialMode {
                field: field.to_string(),
                value: value.to_string(),
            }),
    }
}

fn parse_material(prefix: &str, input: &MaterialInput) -> Result<MaterialItem, ValidationError> {
    Ok(MaterialItem {
        name: required_name(&format!("{}.name", prefix), &input.name)?,
        price: required_amount(&format!("{}.price", prefix), input.price.as_deref())?,
        unit: input.unit.trim().to_string(),
        consumption: optional_amount(
            &format!("{}.consumption", prefix),
            input.consumption.as_deref(),
        )?,
        quantity: optional_amount(&format!("{}.quantity", prefix), input.quantity.as_deref())?,
    })
}

fn parse_materials(
    prefix: &str,
    inputs: &[MaterialInput],
) -> Result<Vec<MaterialItem>, ValidationError> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, m)| parse_material(&format!("{}.materials[{}]", prefix, i), m))
        .collect()
}

/// Parse a raw line into a typed `QuoteItem`.
///
/// `prefix` names the line in error paths (e.g. `items[0]`). Fields of the
/// inactive material mode are parsed and kept, never cleared.
pub fn parse_item(
    prefix: &str,
    input: &QuoteItemInput,
    policy: &VatPolicy,
) -> Result<QuoteItem, ValidationError> {
    let field = |name: &str| format!("{}.{}", prefix, name);

    let vat_field = field("vat_rate");
    let vat_rate = required_amount(&vat_field, input.vat_rate.as_deref())?;
    policy.check(&vat_field, vat_rate)?;

    let item = QuoteItem {
        service_id: input.service_id,
        name: required_name(&field("name"), &input.name)?,
        unit: input.unit.trim().to_string(),
        net_price: required_amount(&field("net_price"), input.net_price.as_deref())?,
        quantity: required_amount(&field("quantity"), input.quantity.as_deref())?,
        vat_rate,
        material_mode: parse_mode(&field("material_mode"), input.material_mode.as_deref())?,
        estimated_material_price: optional_amount(
            &field("estimated_material_price"),
            input.estimated_material_price.as_deref(),
        )?,
        materials: parse_materials(prefix, &input.materials)?,
    };

    check_line_total(prefix, &item)?;
    Ok(item)
}

/// Parse every line, reporting the first failure
pub fn parse_items(
    inputs: &[QuoteItemInput],
    policy: &VatPolicy,
) -> Result<Vec<QuoteItem>, ValidationError> {
    let items = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| parse_item(&format!("items[{}]", i), input, policy))
        .collect::<Result<Vec<_>, _>>()?;

    check_quote_total(&items)?;
    Ok(items)
}

/// Reject a line whose gross total overflows or exceeds [`MAX_TOTAL`]
pub fn check_line_total(prefix: &str, item: &QuoteItem) -> Result<(), ValidationError> {
    match checked_item_total(item) {
        Some(total) if total.gross <= MAX_TOTAL => Ok(()),
        _ => Err(ValidationError::TotalTooLarge {
            field: prefix.to_string(),
            max: MAX_TOTAL,
        }),
    }
}

/// Reject a set of lines whose combined gross overflows or exceeds
/// [`MAX_TOTAL`]. Lines are non-negative, so every partial sum the
/// calculators produce stays below the checked total.
pub fn check_quote_total(items: &[QuoteItem]) -> Result<(), ValidationError> {
    match checked_quote_totals(items) {
        Some(totals) if totals.total_gross() <= MAX_TOTAL => Ok(()),
        _ => Err(ValidationError::TotalTooLarge {
            field: "items".to_string(),
            max: MAX_TOTAL,
        }),
    }
}

/// Parse a catalog service payload
pub fn parse_service(
    input: &ServiceInput,
    policy: &VatPolicy,
) -> Result<ServiceFields, ValidationError> {
    let vat_rate = required_amount("vat_rate", input.vat_rate.as_deref())?;
    policy.check("vat_rate", vat_rate)?;

    Ok(ServiceFields {
        name: required_name("name", &input.name)?,
        unit: input.unit.trim().to_string(),
        net_price: required_amount("net_price", input.net_price.as_deref())?,
        vat_rate,
        material_mode: parse_mode("material_mode", input.material_mode.as_deref())?,
        estimated_material_price: optional_amount(
            "estimated_material_price",
            input.estimated_material_price.as_deref(),
        )?,
        materials: parse_materials("service", &input.materials)?,
    })
}

/// Re-check an already-typed line (e.g. one copied from the catalog)
/// against the amount limits and the current VAT policy
pub fn validate_item(
    prefix: &str,
    item: &QuoteItem,
    policy: &VatPolicy,
) -> Result<(), ValidationError> {
    let field = |name: &str| format!("{}.{}", prefix, name);

    check_amount(&field("net_price"), item.net_price)?;
    check_amount(&field("quantity"), item.quantity)?;
    check_amount(&field("vat_rate"), item.vat_rate)?;
    policy.check(&field("vat_rate"), item.vat_rate)?;
    if let Some(price) = item.estimated_material_price {
        check_amount(&field("estimated_material_price"), price)?;
    }
    for (i, m) in item.materials.iter().enumerate() {
        let material = format!("{}.materials[{}]", prefix, i);
        check_amount(&format!("{}.price", material), m.price)?;
        if let Some(consumption) = m.consumption {
            check_amount(&format!("{}.consumption", material), consumption)?;
        }
    }
    check_line_total(prefix, item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn policy() -> VatPolicy {
        VatPolicy::new(vec![dec!(0), dec!(5), dec!(8), dec!(23)])
    }

    fn input() -> QuoteItemInput {
        QuoteItemInput {
            service_id: None,
            name: "Drywall".to_string(),
            unit: "m2".to_string(),
            net_price: Some("45,50".to_string()),
            quantity: Some(" 12 ".to_string()),
            vat_rate: Some("8".to_string()),
            material_mode: Some("detailed".to_string()),
            estimated_material_price: Some(String::new()),
            materials: vec![MaterialInput {
                name: "Board".to_string(),
                unit: "pcs".to_string(),
                price: Some("32.10".to_string()),
                consumption: Some("0.35".to_string()),
                quantity: None,
            }],
        }
    }

    #[test]
    fn test_parse_amount_accepts_decimal_comma() {
        assert_eq!(parse_amount("x", "12,5").unwrap(), Some(dec!(12.5)));
        assert_eq!(parse_amount("x", "  7 ").unwrap(), Some(dec!(7)));
        assert_eq!(parse_amount("x", "").unwrap(), None);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        let err = parse_amount("items[0].quantity", "abc").unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotNumeric {
                field: "items[0].quantity".to_string(),
                value: "abc".to_string(),
            }
        );
        assert!(parse_amount("x", "NaN").is_err());
        assert!(parse_amount("x", "1.2.3").is_err());
    }

    #[test]
    fn test_parse_amount_rejects_negative_and_huge() {
        assert!(matches!(
            parse_amount("x", "-1"),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            parse_amount("x", "1000000001"),
            Err(ValidationError::TooLarge { .. })
        ));
        assert_eq!(parse_amount("x", "-0").unwrap(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_parse_item_success() {
        let item = parse_item("items[0]", &input(), &policy()).unwrap();
        assert_eq!(item.net_price, dec!(45.5));
        assert_eq!(item.quantity, dec!(12));
        assert_eq!(item.vat_rate, dec!(8));
        assert_eq!(item.material_mode, MaterialMode::Detailed);
        assert_eq!(item.estimated_material_price, None);
        assert_eq!(item.materials.len(), 1);
        assert_eq!(item.materials[0].consumption, Some(dec!(0.35)));
        assert!(item.is_custom());
    }

    #[test]
    fn test_parse_item_missing_required_fields() {
        let mut raw = input();
        raw.net_price = None;
        assert_eq!(
            parse_item("items[0]", &raw, &policy()).unwrap_err(),
            ValidationError::Required {
                field: "items[0].net_price".to_string()
            }
        );

        let mut raw = input();
        raw.quantity = Some("   ".to_string());
        assert_eq!(
            parse_item("items[0]", &raw, &policy()).unwrap_err().field(),
            "items[0].quantity"
        );

        let mut raw = input();
        raw.name = " ".to_string();
        assert!(matches!(
            parse_item("items[0]", &raw, &policy()),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_parse_item_vat_rules() {
        let mut raw = input();
        raw.vat_rate = Some("7.5".to_string());
        assert!(matches!(
            parse_item("items[0]", &raw, &policy()),
            Err(ValidationError::NonIntegerVatRate { .. })
        ));

        raw.vat_rate = Some("19".to_string());
        assert!(matches!(
            parse_item("items[0]", &raw, &policy()),
            Err(ValidationError::UnsupportedVatRate { .. })
        ));

        // An open policy accepts any whole rate
        assert!(parse_item("items[0]", &raw, &VatPolicy::default()).is_ok());
    }

    #[test]
    fn test_parse_item_mode_defaults_and_errors() {
        let mut raw = input();
        raw.material_mode = None;
        let item = parse_item("items[0]", &raw, &policy()).unwrap();
        assert_eq!(item.material_mode, MaterialMode::Estimated);
        // detailed fields are kept even though estimated is active
        assert_eq!(item.materials.len(), 1);

        raw.material_mode = Some("bulk".to_string());
        assert!(matches!(
            parse_item("items[0]", &raw, &policy()),
            Err(ValidationError::UnknownMaterialMode { .. })
        ));
    }

    #[test]
    fn test_parse_items_reports_indexed_material_path() {
        let mut bad = input();
        bad.materials[0].price = Some("-3".to_string());
        let err = parse_items(&[input(), bad], &policy()).unwrap_err();
        assert_eq!(err.field(), "items[1].materials[0].price");
    }

    #[test]
    fn test_parse_service() {
        let raw = ServiceInput {
            name: "Painting".to_string(),
            unit: "m2".to_string(),
            net_price: Some("18".to_string()),
            vat_rate: Some("23".to_string()),
            material_mode: Some("estimated".to_string()),
            estimated_material_price: Some("4,20".to_string()),
            materials: vec![],
        };
        let fields = parse_service(&raw, &policy()).unwrap();
        assert_eq!(fields.estimated_material_price, Some(dec!(4.2)));
        assert_eq!(fields.material_mode, MaterialMode::Estimated);
    }

    #[test]
    fn test_validate_item_rejects_negative_typed_values() {
        let mut item = parse_item("items[0]", &input(), &policy()).unwrap();
        assert!(validate_item("items[0]", &item, &policy()).is_ok());

        item.quantity = dec!(-2);
        assert_eq!(
            validate_item("items[0]", &item, &policy()).unwrap_err().field(),
            "items[0].quantity"
        );
    }

    #[test]
    fn test_validate_item_applies_current_vat_policy() {
        // catalog service saved while 19% was still configured
        let mut item = parse_item("items[2]", &input(), &policy()).unwrap();
        item.vat_rate = dec!(19);

        assert_eq!(
            validate_item("items[2]", &item, &policy()).unwrap_err(),
            ValidationError::UnsupportedVatRate {
                field: "items[2].vat_rate".to_string(),
                rate: dec!(19),
            }
        );
        assert!(validate_item("items[2]", &item, &VatPolicy::default()).is_ok());
    }

    #[test]
    fn test_open_policy_caps_vat_rate() {
        let open = VatPolicy::default();
        let mut raw = input();
        raw.vat_rate = Some("100".to_string());
        assert!(parse_item("items[0]", &raw, &open).is_ok());

        raw.vat_rate = Some("1000000000".to_string());
        assert_eq!(
            parse_item("items[0]", &raw, &open).unwrap_err(),
            ValidationError::TooLarge {
                field: "items[0].vat_rate".to_string(),
                max: MAX_VAT_RATE,
            }
        );
    }

    fn max_material() -> MaterialInput {
        MaterialInput {
            name: "Steel".to_string(),
            unit: "t".to_string(),
            price: Some("1000000000".to_string()),
            consumption: Some("1000000000".to_string()),
            quantity: None,
        }
    }

    #[test]
    fn test_line_with_many_max_materials_is_rejected() {
        let mut raw = input();
        raw.vat_rate = Some("23".to_string());
        raw.quantity = Some("1000000000".to_string());
        raw.materials = vec![max_material(); 80];

        assert_eq!(
            parse_item("items[0]", &raw, &policy()).unwrap_err(),
            ValidationError::TotalTooLarge {
                field: "items[0]".to_string(),
                max: MAX_TOTAL,
            }
        );
    }

    #[test]
    fn test_single_max_material_exceeds_total_ceiling() {
        let mut raw = input();
        raw.quantity = Some("1000000000".to_string());
        raw.materials = vec![max_material()];

        assert!(matches!(
            parse_item("items[0]", &raw, &VatPolicy::default()),
            Err(ValidationError::TotalTooLarge { .. })
        ));
    }

    #[test]
    fn test_quote_of_many_large_lines_is_rejected() {
        // each line grosses 2 * 10^13, eighty of them exceed the ceiling
        let mut raw = input();
        raw.vat_rate = Some("0".to_string());
        raw.net_price = Some("20000".to_string());
        raw.quantity = Some("1000000000".to_string());
        raw.materials.clear();
        raw.estimated_material_price = None;

        let line = parse_item("items[0]", &raw, &policy()).unwrap();
        assert_eq!(checked_item_total(&line).map(|t| t.gross), Some(dec!(20000000000000)));

        let inputs = vec![raw; 80];
        assert_eq!(
            parse_items(&inputs, &policy()).unwrap_err(),
            ValidationError::TotalTooLarge {
                field: "items".to_string(),
                max: MAX_TOTAL,
            }
        );
        assert!(parse_items(&inputs[..50], &policy()).is_ok());
    }

    #[test]
    fn test_max_total_is_ten_to_the_fifteenth() {
        assert_eq!(MAX_TOTAL, dec!(1000000000000000));
    }

    #[test]
    fn test_validate_client() {
        let mut client = ClientInput {
            name: "Anna Nowak".to_string(),
            ..Default::default()
        };
        assert!(validate_client(&client).is_ok());

        client.name = "  ".to_string();
        assert_eq!(
            validate_client(&client).unwrap_err(),
            ValidationError::Required {
                field: "name".to_string()
            }
        );

        client.name = "x".repeat(256);
        assert!(matches!(
            validate_client(&client),
            Err(ValidationError::TooLong { max: 255, .. })
        ));
    }
}
