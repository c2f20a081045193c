use serde::{Deserialize, Serialize};

/// Declares an integer-backed identifier newtype.
///
/// Each identifier is a distinct type so customer, product, warehouse and
/// order ids cannot be mixed up even though they share a representation.
macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from its raw value.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw value.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

integer_id!(
    /// Unique identifier for a customer.
    CustomerId
);

integer_id!(
    /// Unique identifier for a product in the catalog.
    ProductId
);

integer_id!(
    /// Unique identifier for a warehouse.
    ///
    /// Ordering on this type is the tie-breaker when two warehouses are
    /// equally close to a shipping address.
    WarehouseId
);

integer_id!(
    /// Identifier assigned to an order when it is committed.
    OrderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_preserves_raw_value() {
        let id = WarehouseId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(WarehouseId::from(42_i64), id);
    }

    #[test]
    fn ids_order_by_raw_value() {
        assert!(WarehouseId::new(2) < WarehouseId::new(3));
        let mut ids = vec![ProductId::new(5), ProductId::new(1), ProductId::new(3)];
        ids.sort();
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(3), ProductId::new(5)]);
    }

    #[test]
    fn id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&CustomerId::new(7)).unwrap();
        assert_eq!(json, "7");
        let parsed: OrderId = serde_json::from_str("11").unwrap();
        assert_eq!(parsed, OrderId::new(11));
    }

    #[test]
    fn id_display() {
        assert_eq!(ProductId::new(3).to_string(), "3");
    }
}
