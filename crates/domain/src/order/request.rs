//! Incoming order request.

use common::{CustomerId, ProductId};
use serde::Deserialize;

use crate::error::DomainError;
use crate::value_objects::{PaymentCard, ShippingAddress};

/// A requested product and quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl OrderItemRequest {
    pub fn new(product_id: i64, quantity: u32) -> Self {
        Self {
            product_id: ProductId::new(product_id),
            quantity,
        }
    }
}

/// A request to place an order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub customer_id: CustomerId,
    pub shipping_address: ShippingAddress,
    #[serde(alias = "credit_card")]
    pub payment_card: PaymentCard,
    pub items: Vec<OrderItemRequest>,
}

impl OrderRequest {
    /// Checks the request shape: positive ids, at least one item, positive
    /// quantities, a complete address and a well-formed card.
    ///
    /// Whether the customer and products exist is checked later against the
    /// catalog.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.customer_id.as_i64() <= 0 {
            return Err(DomainError::InvalidCustomerId(self.customer_id));
        }
        if self.items.is_empty() {
            return Err(DomainError::NoItems);
        }
        for item in &self.items {
            if item.product_id.as_i64() <= 0 {
                return Err(DomainError::InvalidProductId(item.product_id));
            }
            if item.quantity == 0 {
                return Err(DomainError::InvalidQuantity {
                    product_id: item.product_id,
                    quantity: item.quantity,
                });
            }
        }
        self.shipping_address.validate()?;
        self.payment_card.validate()
    }

    /// Returns the requested product ids in request order.
    pub fn product_ids(&self) -> impl Iterator<Item = &ProductId> {
        self.items.iter().map(|item| &item.product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(items: Vec<OrderItemRequest>) -> OrderRequest {
        OrderRequest {
            customer_id: CustomerId::new(1),
            shipping_address: ShippingAddress::new(
                "123 Main St",
                "Springfield",
                "IL",
                "62701",
                "USA",
            ),
            payment_card: PaymentCard::new("4111111111111111", "12/30", "123"),
            items,
        }
    }

    #[test]
    fn test_valid_request() {
        let req = request(vec![OrderItemRequest::new(1, 2), OrderItemRequest::new(2, 1)]);
        assert!(req.validate().is_ok());
        let ids: Vec<_> = req.product_ids().map(|id| id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_empty_items_rejected() {
        assert_eq!(request(vec![]).validate(), Err(DomainError::NoItems));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let req = request(vec![OrderItemRequest::new(1, 0)]);
        assert!(matches!(
            req.validate(),
            Err(DomainError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[test]
    fn test_non_positive_ids_rejected() {
        let mut req = request(vec![OrderItemRequest::new(1, 1)]);
        req.customer_id = CustomerId::new(0);
        assert!(matches!(
            req.validate(),
            Err(DomainError::InvalidCustomerId(_))
        ));

        let req = request(vec![OrderItemRequest::new(-4, 1)]);
        assert!(matches!(req.validate(), Err(DomainError::InvalidProductId(_))));
    }

    #[test]
    fn test_deserializes_credit_card_alias() {
        let json = serde_json::json!({
            "customer_id": 1,
            "shipping_address": {
                "street": "123 Main St",
                "city": "Springfield",
                "state": "IL",
                "zip": "62701",
                "country": "USA"
            },
            "credit_card": { "number": "4111111111111111", "expiry": "12/30", "cvv": "123" },
            "items": [{ "product_id": 1, "quantity": 2 }]
        });
        let req: OrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.payment_card.last4(), "1111");
        assert_eq!(req.items, vec![OrderItemRequest::new(1, 2)]);
    }
}
