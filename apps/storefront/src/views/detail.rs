//! Product detail page state: image carousel and size selection.

use storefront_core::Product;

/// Carousel over a product's images. Moving past either end wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Carousel { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// Jumps to a thumbnail. Out-of-range picks are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }
}

/// What the shopper has picked on the detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub product: Product,
    pub carousel: Carousel,
    pub selected_size: Option<String>,
}

impl ProductDetail {
    pub fn new(product: Product) -> Self {
        let carousel = Carousel::new(product.image_urls.len());
        ProductDetail {
            product,
            carousel,
            selected_size: None,
        }
    }

    pub fn current_image(&self) -> Option<&str> {
        self.product
            .image_urls
            .get(self.carousel.index())
            .map(String::as_str)
    }

    /// Picks a size the product offers. Returns false otherwise.
    pub fn select_size(&mut self, size: &str) -> bool {
        match self.product.find_size(size) {
            Some(size) => {
                self.selected_size = Some(size.to_string());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carousel_wraps_both_ways() {
        let mut carousel = Carousel::new(3);
        carousel.prev();
        assert_eq!(carousel.index(), 2);
        carousel.next();
        assert_eq!(carousel.index(), 0);
        carousel.next();
        carousel.next();
        carousel.next();
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn test_empty_carousel_stays_put() {
        let mut carousel = Carousel::new(0);
        carousel.next();
        carousel.prev();
        carousel.select(2);
        assert_eq!(carousel.index(), 0);
    }
}
