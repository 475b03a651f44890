use serde::{Deserialize, Serialize};

/// A catalog product. `quantity` is the total owned across all warehouses.
///
/// The same shape is returned by leftover listings, where `quantity`
/// carries the available quantity at one warehouse instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub size: String,
    pub code: String,
    pub quantity: u64,
}

/// Presentation tag attached to reserve / cancel results. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Reserved,
    Canceled,
}

/// A quantity of one product at one warehouse, used for reserve and cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseProduct {
    pub warehouse_id: i64,
    pub code: String,
    pub quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
}

impl WarehouseProduct {
    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProduct {
    pub warehouse_from_id: i64,
    pub warehouse_to_id: i64,
    pub code: String,
    pub quantity: u64,
}

/// New stock arriving at a warehouse; raises the product total by the same amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddProduct {
    pub code: String,
    pub quantity: u64,
    pub warehouse_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProduct {
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_omitted_until_tagged() {
        let wp = WarehouseProduct {
            warehouse_id: 3,
            code: "SKU-1".to_string(),
            quantity: 5,
            status: None,
        };

        let plain = serde_json::to_value(&wp).unwrap();
        assert!(plain.get("status").is_none());

        let tagged = serde_json::to_value(wp.with_status(ReservationStatus::Canceled)).unwrap();
        assert_eq!(tagged["status"], "canceled");
    }

    #[test]
    fn test_request_without_status_decodes() {
        let wp: WarehouseProduct =
            serde_json::from_str(r#"{"warehouse_id": 1, "code": "A", "quantity": 2}"#).unwrap();
        assert_eq!(wp.status, None);
        assert_eq!(wp.quantity, 2);
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let parsed = serde_json::from_str::<AddProduct>(
            r#"{"code": "A", "quantity": -4, "warehouse_id": 1}"#,
        );
        assert!(parsed.is_err());
    }
}
