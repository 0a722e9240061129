//! # Admin Product Form
//!
//! ## Discount Auto-Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mode           edited field          recomputed field                  │
//! │  ────           ────────────          ────────────────                  │
//! │  ManualPrice    discounted price      pct = floor((p - dp) * 100 / p)   │
//! │  Percentage     discount percentage   dp  = floor(p - p * pct / 100)    │
//! │                                                                         │
//! │  Editing the price recomputes in the current mode.                      │
//! │  Clearing the price clears both discount fields.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use storefront_core::validation::split_comma_list;
use storefront_core::{Gender, Money, NewProduct, ValidationError, DEFAULT_CURRENCY};

/// Which discount field the admin is typing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscountMode {
    #[default]
    ManualPrice,
    Percentage,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub brand: String,
    pub description: String,
    price: String,
    discounted_price: String,
    discount_percentage: String,
    pub quantity: String,
    pub category: String,
    /// Comma-separated.
    pub subcategories: String,
    pub tags: String,
    pub sizes: String,
    pub colors: String,
    pub material: String,
    pub gender: String,
    pub bestseller: bool,
    pub featured: bool,
    pub new_arrival: bool,
    mode: DiscountMode,
}

impl ProductForm {
    /// An empty form in manual-price mode. Text fields are public; the
    /// price and discount fields go through the `set_*` methods.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn discounted_price(&self) -> &str {
        &self.discounted_price
    }

    pub fn discount_percentage(&self) -> &str {
        &self.discount_percentage
    }

    pub fn mode(&self) -> DiscountMode {
        self.mode
    }

    pub fn set_price(&mut self, value: &str) {
        self.price = value.to_string();
        if value.trim().is_empty() {
            self.discounted_price.clear();
            self.discount_percentage.clear();
            return;
        }
        self.recalculate();
    }

    /// Switches to manual-price mode and recomputes the percentage.
    pub fn set_discounted_price(&mut self, value: &str) {
        self.mode = DiscountMode::ManualPrice;
        self.discounted_price = value.to_string();
        self.recalculate();
    }

    /// Switches to percentage mode and recomputes the discounted price.
    pub fn set_discount_percentage(&mut self, value: &str) {
        self.mode = DiscountMode::Percentage;
        self.discount_percentage = value.to_string();
        self.recalculate();
    }

    fn recalculate(&mut self) {
        let Ok(price) = Money::from_str(&self.price) else {
            return;
        };

        match self.mode {
            DiscountMode::ManualPrice => {
                let Ok(dp) = Money::from_str(&self.discounted_price) else {
                    return;
                };
                if let Some(pct) = price.percent_off(dp) {
                    self.discount_percentage = pct.to_string();
                }
            }
            DiscountMode::Percentage => {
                let Ok(pct) = self.discount_percentage.trim().parse::<u32>() else {
                    return;
                };
                self.discounted_price = price.apply_percent_discount(pct).to_string();
            }
        }
    }

    /// Builds the payload once images have been uploaded.
    ///
    /// Only parsing happens here; the store validates the payload as a
    /// whole on creation.
    pub fn to_new_product(&self, image_urls: Vec<String>) -> Result<NewProduct, ValidationError> {
        let price = parse_money("Price", &self.price)?
            .ok_or_else(|| ValidationError::required("Price"))?;
        let discounted_price = parse_money("Discounted price", &self.discounted_price)?
            // An empty or zero discount means none
            .filter(|dp| !dp.is_zero());
        let discount_percentage =
            parse_optional::<u32>("Discount percentage", &self.discount_percentage)?
                .filter(|pct| *pct > 0);
        let quantity = parse_optional::<i64>("Quantity", &self.quantity)?.unwrap_or(0);
        let gender = match self.gender.trim() {
            "" => None,
            other => Some(other.parse::<Gender>()?),
        };

        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());

        Ok(NewProduct {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            discounted_price,
            discount_percentage,
            currency: DEFAULT_CURRENCY.to_string(),
            quantity,
            categories: non_empty(&self.category).into_iter().collect(),
            subcategories: split_comma_list(&self.subcategories),
            tags: split_comma_list(&self.tags),
            sizes: split_comma_list(&self.sizes),
            colors: split_comma_list(&self.colors),
            brand: non_empty(&self.brand),
            material: non_empty(&self.material),
            gender,
            image_urls,
            bestseller: self.bestseller,
            featured: self.featured,
            new_arrival: self.new_arrival,
        })
    }
}

fn parse_money(field: &str, input: &str) -> Result<Option<Money>, ValidationError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    Money::from_str(input)
        .map(Some)
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be an amount like 999 or 999.50".to_string(),
        })
}

fn parse_optional<T: FromStr>(field: &str, input: &str) -> Result<Option<T>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse()
        .map(Some)
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_price_mode_floors_percentage() {
        let mut form = ProductForm::default();
        form.set_price("999");
        form.set_discounted_price("500");

        assert_eq!(form.mode(), DiscountMode::ManualPrice);
        assert_eq!(form.discount_percentage(), "49");
    }

    #[test]
    fn test_percentage_mode_floors_to_whole_rupees() {
        let mut form = ProductForm::new();
        form.set_price("999");
        form.set_discount_percentage("33");

        assert_eq!(form.mode(), DiscountMode::Percentage);
        assert_eq!(form.discounted_price(), "669.00");
    }

    #[test]
    fn test_price_edit_recomputes_in_current_mode() {
        let mut form = ProductForm::default();
        form.set_price("1000");
        form.set_discount_percentage("25");
        assert_eq!(form.discounted_price(), "750.00");

        form.set_price("2000");
        assert_eq!(form.discounted_price(), "1500.00");
        assert_eq!(form.discount_percentage(), "25");
    }

    #[test]
    fn test_clearing_price_clears_discounts() {
        let mut form = ProductForm::default();
        form.set_price("1000");
        form.set_discounted_price("800");
        assert_eq!(form.discount_percentage(), "20");

        form.set_price("");
        assert_eq!(form.discounted_price(), "");
        assert_eq!(form.discount_percentage(), "");
    }

    #[test]
    fn test_unparseable_input_leaves_other_field_alone() {
        let mut form = ProductForm::default();
        form.set_price("1000");
        form.set_discounted_price("800");
        form.set_discounted_price("80x");
        assert_eq!(form.discount_percentage(), "20");
    }

    #[test]
    fn test_to_new_product_splits_lists() {
        let mut form = ProductForm {
            name: " Linen Shirt ".to_string(),
            category: "topware".to_string(),
            sizes: "S, M ,, L".to_string(),
            colors: "White".to_string(),
            gender: "Men".to_string(),
            quantity: "12".to_string(),
            ..ProductForm::default()
        };
        form.set_price("1499");

        let product = form
            .to_new_product(vec!["https://img.example/1.jpg".to_string()])
            .unwrap();
        assert_eq!(product.name, "Linen Shirt");
        assert_eq!(product.sizes, vec!["S", "M", "L"]);
        assert_eq!(product.gender, Some(Gender::Men));
        assert_eq!(product.quantity, 12);
        assert_eq!(product.price, Money::from_major(1499));
        assert_eq!(product.discounted_price, None);
        assert!(product.brand.is_none());
    }

    #[test]
    fn test_to_new_product_requires_price() {
        let form = ProductForm::default();
        assert_eq!(
            form.to_new_product(Vec::new()).unwrap_err(),
            ValidationError::required("Price")
        );
    }
}
