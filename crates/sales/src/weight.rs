//! Line weight aggregation and weight unit resolution.

use saleweight_core::DomainResult;
use saleweight_products::ProductWeights;
use saleweight_uom::{Uom, UomConverter, UomId};

use crate::order::OrderLine;

/// Digits shown for a weight when the order has no weight unit.
pub const DEFAULT_WEIGHT_DIGITS: u32 = 2;

/// Unit used when neither the order nor the configuration picks one.
pub const FALLBACK_WEIGHT_UOM: &str = "kg";

/// Display precision for weights expressed in `uom`.
pub fn weight_digits(uom: Option<&Uom>) -> u32 {
    uom.map_or(DEFAULT_WEIGHT_DIGITS, |uom| uom.digits)
}

/// Unit the order's weights are expressed in: the order's own choice, then
/// the configured default, then [`FALLBACK_WEIGHT_UOM`].
pub fn resolve_weight_uom(order_uom: Option<&UomId>, configured: Option<&UomId>) -> UomId {
    order_uom
        .or(configured)
        .cloned()
        .unwrap_or_else(|| UomId::new(FALLBACK_WEIGHT_UOM))
}

/// Weight one line contributes, converted into `target` (unrounded).
///
/// Returns `Ok(None)` for lines that weigh nothing: no product, a product
/// without weight, or a quantity that is not positive.
pub fn line_weight<P, C>(
    line: &OrderLine,
    products: &P,
    converter: &C,
    target: &UomId,
) -> DomainResult<Option<f64>>
where
    P: ProductWeights + ?Sized,
    C: UomConverter + ?Sized,
{
    if !(line.quantity > 0.0) {
        return Ok(None);
    }
    let Some(product_weight) = line.product_id.as_ref().and_then(|id| products.unit_weight(id))
    else {
        return Ok(None);
    };
    if !(product_weight.weight > 0.0) {
        return Ok(None);
    }

    let converted = converter.compute_qty(
        &product_weight.uom,
        product_weight.weight * line.quantity,
        target,
        false,
    )?;
    Ok(Some(converted))
}

/// Total weight of `lines` expressed in `target`.
///
/// Contributions are summed unrounded; with `round` set, the total is rounded
/// once to the target unit's rounding step. A product weighed in a unit that
/// is not convertible into `target` fails the whole computation.
pub fn compute_lines_weight<P, C>(
    lines: &[OrderLine],
    products: &P,
    converter: &C,
    target: &UomId,
    round: bool,
) -> DomainResult<f64>
where
    P: ProductWeights + ?Sized,
    C: UomConverter + ?Sized,
{
    let mut total = 0.0;
    for line in lines {
        if let Some(weight) = line_weight(line, products, converter, target)? {
            total += weight;
        }
    }

    if round {
        total = converter.uom(target)?.round(total);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use saleweight_core::{AggregateId, DomainError};
    use saleweight_products::{ProductId, ProductWeight};
    use saleweight_uom::UomCatalog;

    fn product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    fn line(line_no: u32, product_id: Option<ProductId>, quantity: f64) -> OrderLine {
        OrderLine {
            line_no,
            product_id,
            quantity,
        }
    }

    fn kg() -> UomId {
        UomId::new("kg")
    }

    #[test]
    fn no_lines_weigh_nothing() {
        let products: HashMap<ProductId, ProductWeight> = HashMap::new();
        let total =
            compute_lines_weight(&[], &products, &UomCatalog::standard(), &kg(), false).unwrap();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn two_lines_in_kilograms() {
        let box_id = product_id();
        let bag_id = product_id();
        let products = HashMap::from([
            (box_id, ProductWeight::new(2.5, "kg")),
            (bag_id, ProductWeight::new(1.0, "kg")),
        ]);
        let lines = [line(1, Some(box_id), 3.0), line(2, Some(bag_id), 1.0)];

        let total =
            compute_lines_weight(&lines, &products, &UomCatalog::standard(), &kg(), false).unwrap();
        assert!((total - 8.5).abs() < 1e-9);
    }

    #[test]
    fn lines_without_weight_or_quantity_contribute_zero() {
        let weighed = product_id();
        let unweighed = product_id();
        let products = HashMap::from([
            (weighed, ProductWeight::new(5.0, "kg")),
            (unweighed, ProductWeight::new(0.0, "kg")),
        ]);
        let lines = [
            line(1, Some(weighed), 0.0),
            line(2, Some(unweighed), 7.0),
            line(3, None, 3.0),
            line(4, Some(product_id()), 2.0),
        ];

        let total =
            compute_lines_weight(&lines, &products, &UomCatalog::standard(), &kg(), false).unwrap();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn mixed_units_convert_into_target() {
        let grams = product_id();
        let pounds = product_id();
        let products = HashMap::from([
            (grams, ProductWeight::new(500.0, "g")),
            (pounds, ProductWeight::new(1.0, "lb")),
        ]);
        let lines = [line(1, Some(grams), 2.0), line(2, Some(pounds), 1.0)];

        let total =
            compute_lines_weight(&lines, &products, &UomCatalog::standard(), &kg(), false).unwrap();
        assert!((total - 1.45359237).abs() < 1e-9);

        let rounded =
            compute_lines_weight(&lines, &products, &UomCatalog::standard(), &kg(), true).unwrap();
        assert_eq!(rounded, 1.45);
    }

    #[test]
    fn incompatible_product_unit_fails_loudly() {
        let rope = product_id();
        let products = HashMap::from([(rope, ProductWeight::new(3.0, "m"))]);
        let lines = [line(1, Some(rope), 1.0)];

        let err = compute_lines_weight(&lines, &products, &UomCatalog::standard(), &kg(), false)
            .unwrap_err();
        assert!(matches!(err, DomainError::UnitConversion(_)));
    }

    #[test]
    fn weight_digits_follow_unit() {
        let catalog = UomCatalog::standard();
        assert_eq!(weight_digits(None), 2);
        assert_eq!(weight_digits(catalog.get(&UomId::new("t"))), 3);
    }

    #[test]
    fn resolve_prefers_order_then_config_then_fallback() {
        let lb = UomId::new("lb");
        let g = UomId::new("g");
        assert_eq!(resolve_weight_uom(Some(&lb), Some(&g)), lb);
        assert_eq!(resolve_weight_uom(None, Some(&g)), g);
        assert_eq!(resolve_weight_uom(None, None), kg());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn weighed_lines() -> impl Strategy<Value = Vec<(f64, f64)>> {
            prop::collection::vec((0.0f64..100.0, 0.0f64..50.0), 0..20)
        }

        fn build(weighed: &[(f64, f64)]) -> (HashMap<ProductId, ProductWeight>, Vec<OrderLine>) {
            let mut products = HashMap::new();
            let mut lines = Vec::new();
            for (i, (weight, quantity)) in weighed.iter().enumerate() {
                let id = product_id();
                products.insert(id, ProductWeight::new(*weight, "g"));
                lines.push(line(i as u32 + 1, Some(id), *quantity));
            }
            (products, lines)
        }

        proptest! {
            /// Property: the total does not depend on line order.
            #[test]
            fn total_is_invariant_under_reordering(weighed in weighed_lines()) {
                let catalog = UomCatalog::standard();
                let (products, lines) = build(&weighed);
                let mut reversed = lines.clone();
                reversed.reverse();

                let forward = compute_lines_weight(&lines, &products, &catalog, &kg(), false).unwrap();
                let backward = compute_lines_weight(&reversed, &products, &catalog, &kg(), false).unwrap();
                prop_assert!((forward - backward).abs() <= 1e-9 * forward.max(1.0));
            }

            /// Property: zero quantities zero the total whatever the weights.
            #[test]
            fn zero_quantities_weigh_nothing(weights in prop::collection::vec(0.0f64..100.0, 0..20)) {
                let weighed: Vec<(f64, f64)> = weights.into_iter().map(|w| (w, 0.0)).collect();
                let (products, lines) = build(&weighed);
                let total = compute_lines_weight(&lines, &products, &UomCatalog::standard(), &kg(), false).unwrap();
                prop_assert_eq!(total, 0.0);
            }

            /// Property: changing the target unit only rescales the physical weight.
            #[test]
            fn target_unit_changes_scale_not_meaning(weighed in weighed_lines()) {
                let catalog = UomCatalog::standard();
                let (products, lines) = build(&weighed);
                let in_kg = compute_lines_weight(&lines, &products, &catalog, &kg(), false).unwrap();
                let in_lb = compute_lines_weight(&lines, &products, &catalog, &UomId::new("lb"), false).unwrap();
                let back = catalog.compute_qty(&UomId::new("lb"), in_lb, &kg(), false).unwrap();
                prop_assert!((back - in_kg).abs() <= 1e-9 * in_kg.max(1.0));
            }
        }
    }
}
