//! Material aggregation for shopping lists.

use rust_decimal::Decimal;

use crate::models::{MaterialMode, QuoteItem, ShoppingListEntry};

/// Collect the materials to buy for a set of quote lines.
///
/// Each material of a detailed-mode line needs `consumption * line quantity`
/// units. Rows sharing name, unit and price are merged; order follows first
/// appearance. Estimated-mode lines have nothing itemized and are skipped.
pub fn shopping_entries(items: &[QuoteItem]) -> Vec<ShoppingListEntry> {
    let mut entries: Vec<ShoppingListEntry> = Vec::new();

    for item in items {
        if item.material_mode != MaterialMode::Detailed {
            continue;
        }

        for material in &item.materials {
            let needed = material.consumption_or_default() * item.quantity;

            match entries.iter_mut().find(|e| {
                e.name == material.name && e.unit == material.unit && e.unit_price == material.price
            }) {
                Some(entry) => entry.quantity += needed,
                None => entries.push(ShoppingListEntry {
                    name: material.name.clone(),
                    unit: material.unit.clone(),
                    quantity: needed,
                    unit_price: material.price,
                    checked: false,
                }),
            }
        }
    }

    entries
}

/// Total purchase cost of a shopping list
pub fn shopping_total(entries: &[ShoppingListEntry]) -> Decimal {
    entries.iter().map(ShoppingListEntry::cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaterialItem;
    use crate::pricing::calculators::calculate_item_materials;
    use rust_decimal_macros::dec;

    fn material(name: &str, price: Decimal, consumption: Option<Decimal>) -> MaterialItem {
        MaterialItem {
            name: name.to_string(),
            price,
            unit: "kg".to_string(),
            consumption,
            quantity: None,
        }
    }

    fn line(quantity: Decimal, mode: MaterialMode, materials: Vec<MaterialItem>) -> QuoteItem {
        QuoteItem {
            service_id: None,
            name: "line".to_string(),
            unit: "m2".to_string(),
            net_price: dec!(10),
            quantity,
            vat_rate: dec!(8),
            material_mode: mode,
            estimated_material_price: Some(dec!(3)),
            materials,
        }
    }

    #[test]
    fn test_entries_scale_with_line_quantity() {
        let items = vec![line(
            dec!(4),
            MaterialMode::Detailed,
            vec![material("Adhesive", dec!(2.5), Some(dec!(1.5)))],
        )];

        let entries = shopping_entries(&items);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, dec!(6));
        assert_eq!(entries[0].cost(), dec!(15));
        assert!(!entries[0].checked);
    }

    #[test]
    fn test_entries_merge_identical_materials() {
        let items = vec![
            line(
                dec!(2),
                MaterialMode::Detailed,
                vec![
                    material("Grout", dec!(3), None),
                    material("Primer", dec!(8), Some(dec!(0.2))),
                ],
            ),
            line(
                dec!(5),
                MaterialMode::Detailed,
                vec![material("Grout", dec!(3), Some(dec!(2)))],
            ),
        ];

        let entries = shopping_entries(&items);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Grout");
        assert_eq!(entries[0].quantity, dec!(12));
        assert_eq!(entries[1].name, "Primer");
        assert_eq!(entries[1].quantity, dec!(0.4));
    }

    #[test]
    fn test_different_price_is_separate_entry() {
        let items = vec![line(
            dec!(1),
            MaterialMode::Detailed,
            vec![
                material("Paint", dec!(20), None),
                material("Paint", dec!(25), None),
            ],
        )];
        assert_eq!(shopping_entries(&items).len(), 2);
    }

    #[test]
    fn test_estimated_lines_are_skipped() {
        let items = vec![line(
            dec!(3),
            MaterialMode::Estimated,
            vec![material("Ignored", dec!(1), None)],
        )];
        assert!(shopping_entries(&items).is_empty());
    }

    #[test]
    fn test_total_matches_detailed_material_cost() {
        let items = vec![
            line(
                dec!(3),
                MaterialMode::Detailed,
                vec![
                    material("A", dec!(5), Some(dec!(2))),
                    material("B", dec!(3), Some(dec!(1))),
                ],
            ),
            line(
                dec!(1.5),
                MaterialMode::Detailed,
                vec![material("A", dec!(5), Some(dec!(4)))],
            ),
            line(dec!(10), MaterialMode::Estimated, vec![]),
        ];

        let detailed_cost: Decimal = items
            .iter()
            .filter(|i| i.material_mode == MaterialMode::Detailed)
            .map(calculate_item_materials)
            .sum();

        assert_eq!(shopping_total(&shopping_entries(&items)), detailed_cost);
        assert_eq!(detailed_cost, dec!(69));
    }
}
