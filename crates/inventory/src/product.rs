use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Entity, ProductId};

use crate::validation::{MAX_NAME_LEN, optional_text, required_text};

/// Fixed product category set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Laptop,
    Phone,
    Tablet,
    Accessories,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Laptop,
        Category::Phone,
        Category::Tablet,
        Category::Accessories,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Laptop => "Laptop",
            Category::Phone => "Phone",
            Category::Tablet => "Tablet",
            Category::Accessories => "Accessories",
            Category::Other => "Other",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| DomainError::validation(format!("unknown category '{s}'")))
    }
}

/// Catalog entity: Product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}

/// Input for creating a product. `created_at` is stamped by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub product_id: ProductId,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
}

impl NewProduct {
    /// Validate and build the stored entity.
    pub fn into_product(self, created_at: DateTime<Utc>) -> DomainResult<Product> {
        Ok(Product {
            product_id: self.product_id,
            name: required_text("product name", &self.name, MAX_NAME_LEN)?,
            category: self.category,
            description: optional_text("description", self.description.as_deref(), None)?,
            created_at,
        })
    }
}

/// Editable product attributes. The id and creation timestamp never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
}

impl ProductUpdate {
    /// Validate and apply onto an existing product.
    pub fn apply_to(self, product: &mut Product) -> DomainResult<()> {
        let name = required_text("product name", &self.name, MAX_NAME_LEN)?;
        let description = optional_text("description", self.description.as_deref(), None)?;
        product.name = name;
        product.category = self.category;
        product.description = description;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            product_id: ProductId::parse("P1").unwrap(),
            name: name.to_string(),
            category: Category::Laptop,
            description: Some("  ".to_string()),
        }
    }

    #[test]
    fn into_product_normalizes_fields() {
        let now = Utc::now();
        let product = new_product("  ThinkPad X1 ").into_product(now).unwrap();
        assert_eq!(product.name, "ThinkPad X1");
        assert_eq!(product.description, None);
        assert_eq!(product.created_at, now);
        assert_eq!(product.id().as_str(), "P1");
    }

    #[test]
    fn into_product_rejects_blank_or_long_name() {
        let err = new_product(" ").into_product(Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank name"),
        }
        assert!(new_product(&"n".repeat(101)).into_product(Utc::now()).is_err());
    }

    #[test]
    fn update_keeps_identity_and_timestamp() {
        let now = Utc::now();
        let mut product = new_product("Old").into_product(now).unwrap();
        ProductUpdate {
            name: "New".to_string(),
            category: Category::Phone,
            description: Some("refurbished".to_string()),
        }
        .apply_to(&mut product)
        .unwrap();

        assert_eq!(product.product_id.as_str(), "P1");
        assert_eq!(product.created_at, now);
        assert_eq!(product.name, "New");
        assert_eq!(product.category, Category::Phone);
        assert_eq!(product.description.as_deref(), Some("refurbished"));
    }

    #[test]
    fn failed_update_leaves_product_untouched() {
        let mut product = new_product("Keep").into_product(Utc::now()).unwrap();
        let before = product.clone();
        let result = ProductUpdate {
            name: String::new(),
            category: Category::Other,
            description: None,
        }
        .apply_to(&mut product);
        assert!(result.is_err());
        assert_eq!(product, before);
    }

    #[test]
    fn category_parses_display_names() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
        assert!("Fridge".parse::<Category>().is_err());
        assert_eq!(
            serde_json::to_string(&Category::Accessories).unwrap(),
            "\"Accessories\""
        );
    }
}
