//! Order request and confirmed order types.

mod model;
mod request;
mod status;

pub use model::{NewOrder, Order, OrderLine, WarehouseSummary};
pub use request::{OrderItemRequest, OrderRequest};
pub use status::OrderStatus;
