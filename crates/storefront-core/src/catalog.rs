//! # Catalog Filter/Sort Engine
//!
//! Turns the in-memory catalog plus a criteria record into the list a
//! view displays. Pure read-time transform, no side effects.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ?q=tee&gender=men&sort=low-to-high          (listing URL)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ListingQuery::parse ──► FilterCriteria                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  filter_products(&catalog, &criteria)                                   │
//! │       │                                                                 │
//! │       ├── every criterion empty? → whole catalog, original order        │
//! │       ├── keep products passing the AND of non-empty criteria           │
//! │       └── stable sort by effective price (ties keep catalog order)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<&Product>  (empty → "No products found")                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use crate::money::Money;
use crate::types::{Gender, Product};
use crate::{BESTSELLER_LIMIT, LATEST_LIMIT};

// =============================================================================
// Criteria
// =============================================================================

/// Sort applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Keep catalog order (shown as "relevance").
    #[default]
    None,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    /// Query-string spelling used by the listing page.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::None => "relevance",
            SortOrder::PriceAsc => "low-to-high",
            SortOrder::PriceDesc => "high-to-low",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Unknown spellings fall back to `None` rather than failing the page.
impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "low-to-high" | "price-asc" | "asc" => SortOrder::PriceAsc,
            "high-to-low" | "price-desc" | "desc" => SortOrder::PriceDesc,
            _ => SortOrder::None,
        })
    }
}

/// Everything a shopper can filter by.
///
/// A field left at its default (empty string, `None`, empty set) does not
/// constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Free text matched against name, brand, categories and tags.
    pub query: String,
    pub category: String,
    pub gender: Option<Gender>,
    /// Inclusive lower bound on the effective price.
    pub min_price: Option<Money>,
    /// Inclusive upper bound on the effective price.
    pub max_price: Option<Money>,
    pub brand: String,
    pub material: String,
    /// Matches when any of these intersects the product's colors.
    pub colors: Vec<String>,
    pub sort: SortOrder,
}

impl FilterCriteria {
    /// True when no field constrains or reorders the catalog.
    pub fn is_empty(&self) -> bool {
        !self.constrains() && self.sort == SortOrder::None
    }

    fn constrains(&self) -> bool {
        !self.query.trim().is_empty()
            || !self.category.trim().is_empty()
            || self.gender.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || !self.brand.trim().is_empty()
            || !self.material.trim().is_empty()
            || self.colors.iter().any(|c| !c.trim().is_empty())
    }

    /// True when `product` satisfies every non-empty criterion.
    pub fn matches(&self, product: &Product) -> bool {
        let query = self.query.trim();
        if !query.is_empty() {
            let hit = contains_ci(&product.name, query)
                || product.brand.as_deref().is_some_and(|b| contains_ci(b, query))
                || product.categories.iter().any(|c| contains_ci(c, query))
                || product.tags.iter().any(|t| contains_ci(t, query));
            if !hit {
                return false;
            }
        }

        let category = self.category.trim();
        if !category.is_empty() && !product.categories.iter().any(|c| contains_ci(c, category)) {
            return false;
        }

        if let Some(gender) = self.gender {
            if product.gender != Some(gender) {
                return false;
            }
        }

        let price = product.effective_price();
        if self.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| price > max) {
            return false;
        }

        if !text_matches(product.brand.as_deref(), &self.brand) {
            return false;
        }
        if !text_matches(product.material.as_deref(), &self.material) {
            return false;
        }

        let wanted: Vec<&str> = self
            .colors
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if !wanted.is_empty()
            && !product
                .colors
                .iter()
                .any(|have| wanted.iter().any(|w| eq_ci(have.trim(), w)))
        {
            return false;
        }

        true
    }
}

/// Case-insensitive substring test.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive equality, folded the same way as [`contains_ci`].
pub fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Empty needle matches anything; otherwise the field must exist and contain it.
fn text_matches(field: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || field.is_some_and(|f| contains_ci(f, needle))
}

// =============================================================================
// Engine
// =============================================================================

/// Filters and sorts the catalog for display.
///
/// ## Guarantees
/// - Empty criteria return every product in its original order
/// - Sorting is stable: equal effective prices keep catalog order
pub fn filter_products<'a>(products: &'a [Product], criteria: &FilterCriteria) -> Vec<&'a Product> {
    let mut visible: Vec<&Product> = if criteria.constrains() {
        products.iter().filter(|p| criteria.matches(p)).collect()
    } else {
        products.iter().collect()
    };

    // slice::sort_by_key is stable
    match criteria.sort {
        SortOrder::None => {}
        SortOrder::PriceAsc => visible.sort_by_key(|p| p.effective_price()),
        SortOrder::PriceDesc => visible.sort_by_key(|p| std::cmp::Reverse(p.effective_price())),
    }

    visible
}

// =============================================================================
// Home / Detail Selections
// =============================================================================

/// First products flagged as bestsellers, in catalog order.
pub fn bestsellers(products: &[Product]) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| p.bestseller)
        .take(BESTSELLER_LIMIT)
        .collect()
}

/// Newest products by creation time.
pub fn latest(products: &[Product]) -> Vec<&Product> {
    let mut newest: Vec<&Product> = products.iter().collect();
    newest.sort_by_key(|p| std::cmp::Reverse(p.created_at));
    newest.truncate(LATEST_LIMIT);
    newest
}

/// Products sharing a category with `product`, excluding itself.
pub fn related<'a>(products: &'a [Product], product: &Product) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| p.id != product.id && p.shares_category_with(product))
        .collect()
}

// =============================================================================
// Listing Query Parameters
// =============================================================================

/// The search page's URL state: `q`, `gender`, `category`, `sort`.
///
/// ## Toggle Semantics
/// ```text
/// ?gender=men  + toggle(gender, men)   → ?            (removed)
/// ?gender=men  + toggle(gender, women) → ?gender=women
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl ListingQuery {
    /// Parses a query string with or without the leading `?`.
    ///
    /// Unknown keys are ignored; blank values count as absent.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parsed = ListingQuery::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "q" => parsed.q = Some(value),
                "gender" => parsed.gender = Some(value),
                "category" => parsed.category = Some(value),
                "sort" => parsed.sort = Some(value),
                _ => {}
            }
        }

        parsed
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "q" => Some(&mut self.q),
            "gender" => Some(&mut self.gender),
            "category" => Some(&mut self.category),
            "sort" => Some(&mut self.sort),
            _ => None,
        }
    }

    /// Sets `key` to `value`, or removes it when it already holds `value`.
    pub fn toggle(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.slot(key) {
            if slot.as_deref() == Some(value) {
                *slot = None;
            } else {
                *slot = Some(value.to_string());
            }
        }
    }

    /// Renders the query string without a leading `?`, keys in fixed order.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let pairs = [
            ("q", &self.q),
            ("gender", &self.gender),
            ("category", &self.category),
            ("sort", &self.sort),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// Converts URL state into filter criteria.
    ///
    /// An unknown gender spelling leaves gender unconstrained.
    pub fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            query: self.q.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_default(),
            gender: self.gender.as_deref().and_then(|g| g.parse().ok()),
            sort: self
                .sort
                .as_deref()
                .map(|s| s.parse().unwrap_or_default())
                .unwrap_or_default(),
            ..FilterCriteria::default()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductStatus;
    use chrono::{TimeZone, Utc};

    fn product(id: &str, price: i64, discounted: Option<i64>) -> Product {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: String::new(),
            price: Money::from_minor(price),
            discounted_price: discounted.map(Money::from_minor),
            discount_percentage: None,
            currency: "INR".into(),
            quantity: 10,
            categories: vec!["topware".into()],
            subcategories: vec![],
            tags: vec![],
            sizes: vec![],
            colors: vec![],
            brand: None,
            material: None,
            gender: None,
            image_urls: vec![],
            bestseller: false,
            featured: false,
            new_arrival: false,
            is_deleted: false,
            status: ProductStatus::Active,
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(list: &[&Product]) -> Vec<String> {
        list.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_empty_criteria_returns_catalog_unchanged() {
        let catalog = vec![product("b", 300, None), product("a", 100, None), product("c", 200, None)];
        let criteria = FilterCriteria::default();
        assert!(criteria.is_empty());
        assert_eq!(ids(&filter_products(&catalog, &criteria)), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_uses_effective_price() {
        let catalog = vec![product("x", 1000, Some(800)), product("y", 500, None)];
        let criteria = FilterCriteria {
            sort: SortOrder::PriceAsc,
            ..Default::default()
        };
        let prices: Vec<i64> = filter_products(&catalog, &criteria)
            .iter()
            .map(|p| p.effective_price().minor())
            .collect();
        assert_eq!(prices, vec![500, 800]);
    }

    #[test]
    fn test_price_range_is_inclusive_on_effective_price() {
        let catalog = vec![
            product("a", 1000, Some(800)),
            product("b", 500, None),
            product("c", 900, None),
            product("d", 2000, Some(1500)),
        ];
        let criteria = FilterCriteria {
            min_price: Some(Money::from_minor(500)),
            max_price: Some(Money::from_minor(900)),
            ..Default::default()
        };
        let visible = filter_products(&catalog, &criteria);
        assert_eq!(ids(&visible), vec!["a", "b", "c"]);
        for p in &catalog {
            let price = p.effective_price().minor();
            let inside = (500..=900).contains(&price);
            assert_eq!(visible.iter().any(|v| v.id == p.id), inside);
        }
    }

    #[test]
    fn test_ascending_then_descending_reverses_non_tied() {
        let catalog = vec![
            product("a", 300, None),
            product("b", 100, None),
            product("c", 200, Some(150)),
            product("d", 400, None),
        ];
        let asc = filter_products(
            &catalog,
            &FilterCriteria {
                sort: SortOrder::PriceAsc,
                ..Default::default()
            },
        );
        let desc = filter_products(
            &catalog,
            &FilterCriteria {
                sort: SortOrder::PriceDesc,
                ..Default::default()
            },
        );
        let mut reversed = ids(&asc);
        reversed.reverse();
        assert_eq!(ids(&desc), reversed);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = vec![
            product("first", 500, None),
            product("cheap", 100, None),
            product("second", 600, Some(500)),
        ];
        let asc = filter_products(
            &catalog,
            &FilterCriteria {
                sort: SortOrder::PriceAsc,
                ..Default::default()
            },
        );
        assert_eq!(ids(&asc), vec!["cheap", "first", "second"]);
        let desc = filter_products(
            &catalog,
            &FilterCriteria {
                sort: SortOrder::PriceDesc,
                ..Default::default()
            },
        );
        assert_eq!(ids(&desc), vec!["first", "second", "cheap"]);
    }

    #[test]
    fn test_color_filter_matches_any_intersection() {
        let mut mono = product("mono", 100, None);
        mono.colors = vec!["Black".into(), "White".into()];
        let mut red = product("red", 100, None);
        red.colors = vec!["Red".into()];
        let catalog = vec![mono, red];

        let criteria = FilterCriteria {
            colors: vec!["red".into()],
            ..Default::default()
        };
        assert_eq!(ids(&filter_products(&catalog, &criteria)), vec!["red"]);

        let criteria = FilterCriteria {
            colors: vec!["White".into(), "Red".into()],
            ..Default::default()
        };
        assert_eq!(filter_products(&catalog, &criteria).len(), 2);
    }

    #[test]
    fn test_color_filter_folds_case_like_text_criteria() {
        let mut beige = product("beige", 100, None);
        beige.colors = vec!["ÉCRU".into()];
        beige.brand = Some("Élan".into());
        let catalog = vec![beige];

        let by_color = FilterCriteria {
            colors: vec!["écru".into()],
            ..Default::default()
        };
        let by_brand = FilterCriteria {
            brand: "élan".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_products(&catalog, &by_color)), vec!["beige"]);
        assert_eq!(ids(&filter_products(&catalog, &by_brand)), vec!["beige"]);
    }

    #[test]
    fn test_text_criteria_are_case_insensitive_substrings() {
        let mut shirt = product("shirt", 100, None);
        shirt.brand = Some("Urban Thread".into());
        shirt.material = Some("Organic Cotton".into());
        shirt.tags = vec!["casual".into()];
        let plain = product("plain", 100, None);
        let catalog = vec![shirt, plain];

        let by_brand = FilterCriteria {
            brand: "thread".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_products(&catalog, &by_brand)), vec!["shirt"]);

        let by_material = FilterCriteria {
            material: "COTTON".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_products(&catalog, &by_material)), vec!["shirt"]);

        let by_tag = FilterCriteria {
            query: "Casu".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_products(&catalog, &by_tag)), vec!["shirt"]);
    }

    #[test]
    fn test_criteria_are_anded() {
        let mut men = product("men", 100, None);
        men.gender = Some(Gender::Men);
        let mut women = product("women", 100, None);
        women.gender = Some(Gender::Women);
        women.categories = vec!["bottomware".into()];
        let catalog = vec![men, women];

        let criteria = FilterCriteria {
            gender: Some(Gender::Women),
            category: "topware".into(),
            ..Default::default()
        };
        assert!(filter_products(&catalog, &criteria).is_empty());

        let criteria = FilterCriteria {
            gender: Some(Gender::Men),
            ..Default::default()
        };
        assert_eq!(ids(&filter_products(&catalog, &criteria)), vec!["men"]);
    }

    #[test]
    fn test_bestsellers_latest_related() {
        let mut catalog: Vec<Product> = (0..12)
            .map(|i| {
                let mut p = product(&format!("p{i}"), 100, None);
                p.bestseller = i % 2 == 0;
                p.created_at = Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).unwrap();
                p
            })
            .collect();
        catalog[3].categories = vec!["footware".into()];

        assert_eq!(ids(&bestsellers(&catalog)), vec!["p0", "p2", "p4", "p6"]);

        let newest = latest(&catalog);
        assert_eq!(newest.len(), 10);
        assert_eq!(newest[0].id, "p11");

        let rel = related(&catalog, &catalog[0]);
        assert_eq!(rel.len(), 10);
        assert!(rel.iter().all(|p| p.id != "p0" && p.id != "p3"));
    }

    #[test]
    fn test_listing_query_parse_and_criteria() {
        let query = ListingQuery::parse("?q=linen+shirt&gender=Women&sort=high-to-low&page=2");
        assert_eq!(query.q.as_deref(), Some("linen shirt"));
        let criteria = query.to_criteria();
        assert_eq!(criteria.gender, Some(Gender::Women));
        assert_eq!(criteria.sort, SortOrder::PriceDesc);
        assert_eq!(criteria.query, "linen shirt");
    }

    #[test]
    fn test_listing_query_toggle() {
        let mut query = ListingQuery::parse("gender=men&category=topware");
        query.toggle("gender", "men");
        assert_eq!(query.gender, None);
        query.toggle("gender", "women");
        assert_eq!(query.gender.as_deref(), Some("women"));
        query.toggle("unknown", "x");
        assert_eq!(query.to_query_string(), "gender=women&category=topware");
    }

    #[test]
    fn test_unknown_sort_falls_back_to_relevance() {
        let query = ListingQuery::parse("sort=popular");
        assert_eq!(query.to_criteria().sort, SortOrder::None);
    }
}
