//! End-to-end flow: order lines, declared weight, carrier pricing and the
//! weight reaching shipments and invoices through the host hooks.

use chrono::Utc;

use saleweight_core::{AggregateId, TenantId};
use saleweight_events::execute;
use saleweight_products::{
    CreateProduct, Product, ProductCatalog, ProductCommand, ProductId, ProductWeight,
};
use saleweight_sales::{
    AddLine, ConfirmOrder, CreateSalesOrder, SaleField, SalesOrder, SalesOrderCommand,
    SalesOrderId, SetWeight, SetWeightUom,
};
use saleweight_shipping::{Carrier, CarrierId, ShipmentKind, WeightPriceBracket};
use saleweight_extension::{InMemoryHost, SaleWeightConfig, SaleWeightExtension};
use saleweight_uom::{UomCatalog, UomId};

struct Sale {
    tenant_id: TenantId,
    order_id: SalesOrderId,
    order: SalesOrder,
    products: ProductCatalog,
}

impl Sale {
    fn new() -> Self {
        saleweight_observability::init();

        let tenant_id = TenantId::new();
        let order_id = SalesOrderId::new(AggregateId::new());
        let mut order = SalesOrder::empty(order_id);
        execute(
            &mut order,
            &SalesOrderCommand::CreateSalesOrder(CreateSalesOrder {
                tenant_id,
                order_id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        Self {
            tenant_id,
            order_id,
            order,
            products: ProductCatalog::new(),
        }
    }

    fn product(&mut self, sku: &str, weight: f64, uom: &str) -> ProductId {
        let product_id = ProductId::new(AggregateId::new());
        let mut product = Product::empty(product_id);
        execute(
            &mut product,
            &ProductCommand::CreateProduct(CreateProduct {
                tenant_id: self.tenant_id,
                product_id,
                sku: sku.to_string(),
                name: sku.to_uppercase(),
                weight: Some(ProductWeight::new(weight, uom)),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        self.products.insert(product);
        product_id
    }

    fn run(&mut self, cmd: SalesOrderCommand) {
        execute(&mut self.order, &cmd).unwrap();
    }

    fn add_line(&mut self, product_id: Option<ProductId>, quantity: f64) {
        self.run(SalesOrderCommand::AddLine(AddLine {
            tenant_id: self.tenant_id,
            order_id: self.order_id,
            product_id,
            quantity,
            occurred_at: Utc::now(),
        }));
    }

    fn set_weight(&mut self, weight: Option<f64>) {
        self.run(SalesOrderCommand::SetWeight(SetWeight {
            tenant_id: self.tenant_id,
            order_id: self.order_id,
            weight,
            occurred_at: Utc::now(),
        }));
    }

    fn set_uom(&mut self, uom: &str) {
        self.run(SalesOrderCommand::SetWeightUom(SetWeightUom {
            tenant_id: self.tenant_id,
            order_id: self.order_id,
            weight_uom: Some(UomId::new(uom)),
            occurred_at: Utc::now(),
        }));
    }

    fn confirm(&mut self) {
        self.run(SalesOrderCommand::ConfirmOrder(ConfirmOrder {
            tenant_id: self.tenant_id,
            order_id: self.order_id,
            occurred_at: Utc::now(),
        }));
    }
}

fn extension() -> SaleWeightExtension {
    SaleWeightExtension::new(SaleWeightConfig::default(), UomCatalog::standard()).unwrap()
}

fn weight_carrier() -> Carrier {
    Carrier::weight_based(
        CarrierId::new(AggregateId::new()),
        "Parcel Post",
        UomCatalog::standard().get(&UomId::new("kg")).unwrap(),
        vec![
            WeightPriceBracket { weight: 0.0, price: 450 },
            WeightPriceBracket { weight: 10.0, price: 1200 },
        ],
    )
    .unwrap()
}

#[test]
fn lines_weight_sums_products_times_quantities() {
    let ext = extension();
    let mut sale = Sale::new();
    let crate_id = sale.product("crate", 2.5, "kg");
    let sack_id = sale.product("sack", 1.0, "kg");
    sale.add_line(Some(crate_id), 3.0);
    sale.add_line(Some(sack_id), 1.0);
    sale.add_line(None, 4.0);
    sale.set_uom("kg");

    let fields = ext.compute_all(&sale.order, None, &sale.products).unwrap();
    assert!((fields.weight_lines - 8.5).abs() < 1e-9);
    assert_eq!(fields.weight_digits, 2);
}

#[test]
fn declared_weight_replaces_line_weights_for_weight_carriers() {
    let ext = extension();
    let carrier = weight_carrier();
    let mut sale = Sale::new();
    let crate_id = sale.product("crate", 2.5, "kg");
    sale.add_line(Some(crate_id), 1.0);

    let context = ext.carrier_context(&sale.order, &carrier, &sale.products).unwrap();
    assert_eq!(context.weights().unwrap(), Some(vec![2.5]));

    sale.set_weight(Some(10.0));
    let context = ext.carrier_context(&sale.order, &carrier, &sale.products).unwrap();
    assert_eq!(context.weights().unwrap(), Some(vec![10.0]));
    assert_eq!(carrier.compute_cost(&context).unwrap(), 1200);
}

#[test]
fn flat_carriers_ignore_the_declared_weight() {
    let ext = extension();
    let carrier = Carrier::flat(CarrierId::new(AggregateId::new()), "Courier", 990).unwrap();
    let mut sale = Sale::new();
    sale.set_weight(Some(10.0));

    let context = ext.carrier_context(&sale.order, &carrier, &sale.products).unwrap();
    assert!(context.is_empty());
    assert_eq!(carrier.compute_cost(&context).unwrap(), 990);
}

#[test]
fn weight_edit_reprices_the_shipment() {
    let ext = extension();
    let carrier = weight_carrier();
    let mut sale = Sale::new();
    let crate_id = sale.product("crate", 2.5, "kg");
    sale.add_line(Some(crate_id), 2.0);

    let mut fields = ext.compute_all(&sale.order, Some(&carrier), &sale.products).unwrap();
    assert_eq!(fields.shipment_cost, Some(450));

    sale.set_weight(Some(12.0));
    let recomputed = ext
        .recompute(&sale.order, Some(&carrier), &sale.products, &[SaleField::Weight], &mut fields)
        .unwrap();
    assert_eq!(recomputed.last(), Some(&SaleField::ShipmentCost));
    assert_eq!(fields.shipment_cost, Some(1200));

    sale.set_weight(None);
    ext.recompute(&sale.order, Some(&carrier), &sale.products, &[SaleField::Weight], &mut fields)
        .unwrap();
    assert_eq!(fields.shipment_cost, Some(450));
}

#[test]
fn every_created_shipment_receives_the_order_weight() {
    let ext = extension();
    let mut host = InMemoryHost::new().with_shipments_per_order(2);
    let mut sale = Sale::new();
    sale.set_weight(Some(7.25));
    sale.set_uom("lb");

    let shipments = ext
        .create_shipments(&mut host, &sale.order, ShipmentKind::Out, Utc::now())
        .unwrap();
    assert_eq!(shipments.len(), 2);
    for shipment in host.shipments_for(sale.order_id) {
        assert_eq!(shipment.weight(), Some(7.25));
        assert_eq!(shipment.weight_uom(), Some(&UomId::new("lb")));
    }
    assert_eq!(host.saves(), 2);
}

#[test]
fn shipments_keep_their_weight_when_the_order_declares_none() {
    let ext = extension();
    let mut host = InMemoryHost::new().with_default_shipment_weight(1.2, "kg");
    let sale = Sale::new();

    let shipments = ext
        .create_shipments(&mut host, &sale.order, ShipmentKind::Out, Utc::now())
        .unwrap();
    assert_eq!(shipments[0].weight(), Some(1.2));
    assert_eq!(shipments[0].weight_uom(), Some(&UomId::new("kg")));
    assert_eq!(host.saves(), 0);
}

#[test]
fn no_shipments_is_not_an_error() {
    let ext = extension();
    let mut host = InMemoryHost::new().with_shipments_per_order(0);
    let mut sale = Sale::new();
    sale.set_weight(Some(3.0));

    let shipments = ext
        .create_shipments(&mut host, &sale.order, ShipmentKind::Return, Utc::now())
        .unwrap();
    assert!(shipments.is_empty());
    assert_eq!(host.saves(), 0);
}

#[test]
fn invoice_receives_weight_with_fallback_unit() {
    let ext = extension();
    let mut host = InMemoryHost::new();
    let mut sale = Sale::new();
    let sack_id = sale.product("sack", 1.0, "kg");
    sale.add_line(Some(sack_id), 5.0);
    sale.set_weight(Some(5.5));
    sale.confirm();

    let invoice = ext
        .create_invoice(&mut host, &sale.order, Utc::now())
        .unwrap()
        .unwrap();
    assert_eq!(invoice.weight(), Some(5.5));
    assert_eq!(invoice.weight_uom(), Some(&UomId::new("kg")));

    let stored = host.invoice(&invoice.id_typed()).unwrap();
    assert_eq!(stored, &invoice);
}

#[test]
fn missing_invoice_is_skipped() {
    let ext = extension();
    let mut host = InMemoryHost::new().without_invoicing();
    let mut sale = Sale::new();
    sale.add_line(None, 1.0);
    sale.set_weight(Some(2.0));
    sale.confirm();

    assert_eq!(ext.create_invoice(&mut host, &sale.order, Utc::now()).unwrap(), None);
}

#[test]
fn zero_weight_counts_as_undeclared() {
    let ext = extension();
    let carrier = weight_carrier();
    let mut sale = Sale::new();
    let crate_id = sale.product("crate", 2.5, "kg");
    sale.add_line(Some(crate_id), 4.0);
    sale.set_weight(Some(0.0));

    let context = ext.carrier_context(&sale.order, &carrier, &sale.products).unwrap();
    assert_eq!(context.weights().unwrap(), Some(vec![10.0]));
    let fields = ext.compute_all(&sale.order, Some(&carrier), &sale.products).unwrap();
    assert_eq!(fields.shipment_cost, Some(1200));

    let mut host = InMemoryHost::new().with_default_shipment_weight(9.0, "kg");
    let shipments = ext
        .create_shipments(&mut host, &sale.order, ShipmentKind::Out, Utc::now())
        .unwrap();
    assert_eq!(shipments[0].weight(), Some(9.0));
    assert_eq!(host.saves(), 0);

    sale.confirm();
    let invoice = ext
        .create_invoice(&mut host, &sale.order, Utc::now())
        .unwrap()
        .unwrap();
    assert_eq!(invoice.weight(), None);
}
