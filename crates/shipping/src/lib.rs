//! Shipping domain module: outgoing shipments, carriers and the context used
//! to price a carrier for a sale.

pub mod carrier;
pub mod context;
pub mod shipment;

pub use carrier::{Carrier, CarrierCostMethod, CarrierId, WeightPriceBracket};
pub use context::{CarrierContext, WEIGHTS_KEY, base_carrier_context, carrier_context};
pub use shipment::{
    CreateShipment, MarkShipped, SetShipmentWeight, Shipment, ShipmentCommand, ShipmentCreated,
    ShipmentEvent, ShipmentId, ShipmentKind, ShipmentShipped, ShipmentStatus, ShipmentWeightSet,
};
