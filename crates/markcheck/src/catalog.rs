//! Selectors for every catalog element the checks touch.
//!
//! Defaults match the storefront's current markup; each one can be overridden
//! from the `selectors:` block of the suite config.

use serde::{Deserialize, Serialize};

use crate::locator::{Selector, SelectorTemplate};

/// One expandable section on the product detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccordionSelectors {
    /// Section title used in messages
    pub title: String,
    /// Clickable header
    pub header: Selector,
    /// Element carrying `aria-expanded`
    pub summary: Selector,
    /// Collapsible panel whose height is checked
    pub expander: Selector,
}

impl AccordionSelectors {
    fn under(title: &str, test_id: &str) -> Self {
        Self {
            title: title.to_string(),
            header: Selector::css(format!("[data-testid='{test_id}'] button")),
            summary: Selector::css(format!("[data-testid='{test_id}'] [aria-expanded]")),
            expander: Selector::css(format!(
                "[data-testid='{test_id}'] [data-testid='accordion-panel']"
            )),
        }
    }
}

/// A page region whose images are checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRegion {
    /// Region name used in logs
    pub name: String,
    /// Image elements in the region
    pub images: Selector,
}

impl ImageRegion {
    fn new(name: &str, images: Selector) -> Self {
        Self {
            name: name.to_string(),
            images,
        }
    }
}

/// Catalog selectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSelectors {
    /// Login username field
    pub username: Selector,
    /// Login password field
    pub password: Selector,
    /// Login submit button
    pub login_button: Selector,
    /// Promotional popup shown on landing
    pub promo_popup: Selector,
    /// Close button of the promotional popup
    pub popup_close: Selector,
    /// Cookie consent button
    pub cookie_accept: Selector,
    /// Top navigation link to the promotions listing
    pub promotions_link: Selector,
    /// Women filter control
    pub women_filter: Selector,
    /// Men filter control
    pub men_filter: Selector,
    /// Product tile candidates for a display name; the locator keeps only
    /// tiles whose trimmed text equals the name
    pub product_by_name: SelectorTemplate,
    /// "View More Products" pagination control
    pub view_more: Selector,
    /// Global search box
    pub search_input: Selector,
    /// Product tile by product ID
    pub product_by_id: SelectorTemplate,
    /// Color swatch by color name
    pub color_swatch: SelectorTemplate,
    /// Product title on the detail page
    pub product_title: Selector,
    /// Size options
    pub sizes: Selector,
    /// Active/default size option
    pub active_size: Selector,
    /// Markdown price
    pub markdown_price: Selector,
    /// Regular price
    pub regular_price: Selector,
    /// Expandable sections, checked in order
    pub accordions: Vec<AccordionSelectors>,
    /// Image regions, checked in order
    pub image_regions: Vec<ImageRegion>,
}

impl Default for CatalogSelectors {
    fn default() -> Self {
        Self {
            username: Selector::css("input[name='username']"),
            password: Selector::css("input[name='password']"),
            login_button: Selector::css("button[type='submit']"),
            promo_popup: Selector::test_id("markdown-promo-modal"),
            popup_close: Selector::role("button", "Close"),
            cookie_accept: Selector::css("#onetrust-accept-btn-handler"),
            promotions_link: Selector::xpath("//nav//a[normalize-space(.)='We Made Too Much']"),
            women_filter: Selector::xpath("//input[@type='checkbox'][@value='Women']"),
            men_filter: Selector::xpath("//input[@type='checkbox'][@value='Men']"),
            product_by_name: SelectorTemplate::new(
                "//a[@data-testid='product-tile-name'][normalize-space(.)={value}]",
            ),
            view_more: Selector::role("link", "View More Products"),
            search_input: Selector::css("input[type='search']"),
            product_by_id: SelectorTemplate::new("[data-testid='product-tile'][data-product-id={value}]"),
            color_swatch: SelectorTemplate::new(
                "//div[@data-testid='color-swatches']//button[contains(@title, {value}) or contains(@aria-label, {value})]",
            ),
            product_title: Selector::test_id("product-title"),
            sizes: Selector::css("[data-testid='size-selector'] button"),
            active_size: Selector::css("[data-testid='size-selector'] button:not([disabled])"),
            markdown_price: Selector::test_id("markdown-price"),
            regular_price: Selector::test_id("regular-price"),
            accordions: vec![
                AccordionSelectors::under("Why We Made This", "why-we-made-this"),
                AccordionSelectors::under("Product Details", "product-details"),
                AccordionSelectors::under("Item Reviews", "item-reviews"),
            ],
            image_regions: vec![
                ImageRegion::new(
                    "carousel thumbnails",
                    Selector::xpath(
                        "//div[starts-with(@class,'carousel_thumbnailsContainer')]//button/picture/img",
                    ),
                ),
                ImageRegion::new("slides", Selector::role("img", "Slide")),
                ImageRegion::new(
                    "why we made this",
                    Selector::xpath("//div[@data-testid='why-we-made-this']//picture/img"),
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_three_accordions_and_regions() {
        let s = CatalogSelectors::default();
        assert_eq!(s.accordions.len(), 3);
        assert_eq!(s.accordions[0].title, "Why We Made This");
        assert_eq!(s.image_regions.len(), 3);
    }

    #[test]
    fn test_default_templates_render() {
        let s = CatalogSelectors::default();
        assert!(s.product_by_name.render("Fast and Free Short").is_ok());
        assert!(s.product_by_id.render("prod11020158").is_ok());
        let swatch = s.color_swatch.render("Black").unwrap();
        assert!(swatch.to_string().contains("contains(@title, 'Black')"));
    }

    #[test]
    fn test_partial_override_from_yaml() {
        let yaml = r#"
view_more: "role=button[name=\"Load more\"]"
sizes: "ul.sizes li"
"#;
        let s: CatalogSelectors = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(s.view_more, Selector::role("button", "Load more"));
        assert_eq!(s.sizes, Selector::css("ul.sizes li"));
        assert_eq!(s.product_title, Selector::test_id("product-title"));
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let s = CatalogSelectors::default();
        let yaml = serde_yaml_ng::to_string(&s).unwrap();
        let back: CatalogSelectors = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, s);
    }
}
