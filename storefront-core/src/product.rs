use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::patch::{present, required};
use crate::CoreResult;

/// Catalog entry that orders can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Product {
    pub id: i64,
    #[validate(length(min = 1, max = 200, message = "product_name must be between 1 and 200 characters."))]
    pub product_name: String,
    #[validate(range(min = 0.0, message = "price must be a non-negative number."))]
    pub price: f64,
}

impl Product {
    /// Neither field is nullable.
    pub fn apply(&mut self, patch: ProductPatch) -> CoreResult<()> {
        if let Some(product_name) = patch.product_name {
            self.product_name = required("product_name", product_name)?;
        }
        if let Some(price) = patch.price {
            self.price = required("price", price)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 200, message = "product_name must be between 1 and 200 characters."))]
    pub product_name: String,
    #[validate(range(min = 0.0, message = "price must be a non-negative number."))]
    pub price: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    #[serde(default, deserialize_with = "present")]
    pub product_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_bounds() {
        let free = NewProduct { product_name: "Sticker".to_string(), price: 0.0 };
        assert!(free.validate().is_ok());

        let negative = NewProduct { product_name: "Refund".to_string(), price: -0.01 };
        let err = crate::CoreError::from(negative.validate().unwrap_err());
        assert_eq!(err.to_string(), "price must be a non-negative number.");
    }

    fn mug() -> Product {
        Product { id: 1, product_name: "Mug".to_string(), price: 9.5 }
    }

    #[test]
    fn test_patch_price_validation_and_apply() {
        let mut bad = mug();
        bad.apply(ProductPatch { price: Some(Some(-5.0)), ..Default::default() }).unwrap();
        assert!(bad.validate().is_err());

        let mut product = mug();
        let patch: ProductPatch = serde_json::from_str(r#"{"price": 12.0}"#).unwrap();
        product.apply(patch).unwrap();
        assert!(product.validate().is_ok());
        assert_eq!(product.product_name, "Mug");
        assert_eq!(product.price, 12.0);
    }

    #[test]
    fn test_patch_null_fields_are_rejected() {
        let patch: ProductPatch = serde_json::from_str(r#"{"price": null}"#).unwrap();
        let err = mug().apply(patch).unwrap_err();
        assert_eq!(err.to_string(), "price may not be null.");

        let patch: ProductPatch = serde_json::from_str(r#"{"product_name": null}"#).unwrap();
        let err = mug().apply(patch).unwrap_err();
        assert!(matches!(err, crate::CoreError::Validation(_)));
    }
}
