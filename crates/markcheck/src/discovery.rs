//! Product discovery on the promotions listing.
//!
//! The listing streams tiles in as the page is scrolled and eventually falls
//! back to a "View More Products" link. When neither yields the product by
//! its display name, the product ID is typed into the global search box.

use tracing::{debug, info, warn};
use url::Url;

use crate::catalog::CatalogSelectors;
use crate::driver::{ElementState, PageDriver};
use crate::locator::{Locator, Selector};
use crate::outcome::{Finding, Outcome};
use crate::result::{AbsentOk, MarkcheckError, MarkcheckResult};
use crate::row::{CategoryFilter, TestRow};
use crate::wait::Timing;

/// How (and whether) the product detail page was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateOutcome {
    /// Tile matched by exact display name
    ByName,
    /// Tile matched by product ID through search
    ById {
        /// Number of tiles carrying the ID (the first was opened)
        matches: usize,
    },
    /// Neither name nor ID matched
    NotFound,
}

impl LocateOutcome {
    /// Whether the detail page is open
    #[must_use]
    pub const fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound)
    }

    /// Catalog note for this result, if one is worth writing
    #[must_use]
    pub fn report(&self, row: &TestRow) -> Option<Outcome> {
        match self {
            Self::ByName => None,
            Self::ById { .. } => Some(Outcome::info(
                Finding::Catalog,
                format!(
                    "Product \"{}\" not found by name; opened by product ID {}.",
                    row.expected_product_name, row.markdown_product_id
                ),
            )),
            Self::NotFound => Some(Outcome::fail(
                Finding::Catalog,
                format!(
                    "Product \"{}\" and product ID {} are not available in the catalog.",
                    row.expected_product_name, row.markdown_product_id
                ),
            )),
        }
    }
}

/// Resolve the promotions listing URL.
///
/// A configured URL wins; otherwise the `href` of the promotions navigation
/// link on the current page is resolved against `base`. No URL at all means
/// the catalog layout is broken.
pub async fn resolve_listing<D: PageDriver + ?Sized>(
    page: &mut D,
    selectors: &CatalogSelectors,
    configured: Option<Url>,
    base: &Url,
) -> MarkcheckResult<Url> {
    if let Some(url) = configured {
        return Ok(url);
    }
    let link = Locator::new(selectors.promotions_link.clone());
    let href = page
        .attribute(&link, "href")
        .await
        .absent_ok()?
        .flatten()
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| {
            MarkcheckError::structural(format!(
                "no href found for promotions link {}",
                selectors.promotions_link
            ))
        })?;
    base.join(href.trim()).map_err(|e| {
        MarkcheckError::structural(format!("promotions link href {href:?} is not a URL: {e}"))
    })
}

/// Finds a row's product and opens its detail page
#[derive(Debug, Clone, Copy)]
pub struct ProductLocator<'a> {
    selectors: &'a CatalogSelectors,
    timing: &'a Timing,
    listing: &'a Url,
}

impl<'a> ProductLocator<'a> {
    /// Create a locator for the listing at `listing`
    #[must_use]
    pub const fn new(selectors: &'a CatalogSelectors, timing: &'a Timing, listing: &'a Url) -> Self {
        Self {
            selectors,
            timing,
            listing,
        }
    }

    /// Find `row`'s product and leave the page on its detail view.
    ///
    /// Absence is an answer (`NotFound`), never an error; only driver
    /// failures and unusable selector templates propagate.
    pub async fn locate<D: PageDriver + ?Sized>(
        &self,
        page: &mut D,
        row: &TestRow,
    ) -> MarkcheckResult<LocateOutcome> {
        info!(url = %self.listing, "navigating to listing");
        page.goto(self.listing.as_str()).await?;
        self.probe_filters(page).await;
        self.apply_filter(page, row.category()).await?;

        if self.scroll_for_name(page, row.expected_product_name.trim()).await? {
            return Ok(LocateOutcome::ByName);
        }
        self.search_by_id(page, row.markdown_product_id.trim()).await
    }

    /// Wait for any gender filter control so the listing has rendered.
    ///
    /// The women control is tried first, the men control second; neither
    /// showing up is only logged.
    async fn probe_filters<D: PageDriver + ?Sized>(&self, page: &mut D) {
        let timeout = self.timing.filter_probe_timeout();
        if page
            .wait_for(&self.selectors.women_filter, ElementState::Visible, timeout)
            .await
            .is_ok()
        {
            return;
        }
        info!("unable to find women filter, trying men filter");
        if let Err(e) = page
            .wait_for(&self.selectors.men_filter, ElementState::Visible, timeout)
            .await
        {
            warn!(error = %e, "no category filter control on listing");
        }
    }

    async fn apply_filter<D: PageDriver + ?Sized>(
        &self,
        page: &mut D,
        filter: CategoryFilter,
    ) -> MarkcheckResult<()> {
        let control = match filter {
            CategoryFilter::Women => &self.selectors.women_filter,
            CategoryFilter::Men => &self.selectors.men_filter,
            CategoryFilter::Unfiltered => {
                info!("not selecting any category");
                return Ok(());
            }
        };
        info!(category = %filter, "selecting category");
        if page
            .click(&Locator::new(control.clone()))
            .await
            .absent_ok()?
            .is_none()
        {
            warn!(category = %filter, "category filter missing, listing stays unfiltered");
        }
        Ok(())
    }

    /// Scroll and paginate until a tile named `name` appears and is clicked.
    ///
    /// Returns `false` once the listing stops growing and has no pagination
    /// control, or after the configured number of rounds.
    async fn scroll_for_name<D: PageDriver + ?Sized>(
        &self,
        page: &mut D,
        name: &str,
    ) -> MarkcheckResult<bool> {
        let tile = self.selectors.product_by_name.render(name)?;
        let view_more = Locator::new(self.selectors.view_more.clone());
        let settle = self.timing.lazy_load_settle();

        for round in 0..self.timing.max_scroll_rounds {
            if let Some(index) = exact_tile(page, &tile, name).await? {
                info!(product = name, index, "product found, clicking");
                page.click(&Locator::nth(tile, index)).await?;
                return Ok(true);
            }

            let before = page.scroll_height().await?;
            page.scroll_to_bottom().await?;
            page.wait_for_timeout(settle).await;
            let after = page.scroll_height().await?;
            debug!(round, before, after, "scrolled listing");
            if after > before {
                continue;
            }

            if page.count(view_more.selector()).await? == 0 {
                info!(product = name, "product not found and no more products to load");
                return Ok(false);
            }
            info!("clicking 'View More Products'");
            page.click(&view_more).await?;
            page.wait_for_timeout(settle).await;
        }

        warn!(
            product = name,
            rounds = self.timing.max_scroll_rounds,
            "listing never reported its end, giving up on name search"
        );
        Ok(false)
    }

    async fn search_by_id<D: PageDriver + ?Sized>(
        &self,
        page: &mut D,
        id: &str,
    ) -> MarkcheckResult<LocateOutcome> {
        if id.is_empty() {
            warn!("row has no product ID, skipping search fallback");
            return Ok(LocateOutcome::NotFound);
        }
        info!(product_id = id, "searching by product ID");
        let input = Locator::new(self.selectors.search_input.clone());
        if page.fill(&input, id).await.absent_ok()?.is_none() {
            warn!(selector = %self.selectors.search_input, "search box not found");
            return Ok(LocateOutcome::NotFound);
        }
        page.press(&input, "Enter").await?;
        page.wait_for_timeout(self.timing.search_settle()).await;

        let tile: Selector = self.selectors.product_by_id.render(id)?;
        let matches = page.count(&tile).await?;
        match matches {
            0 => {
                info!(product_id = id, "no search results");
                Ok(LocateOutcome::NotFound)
            }
            n => {
                if n > 1 {
                    info!(product_id = id, matches = n, "several tiles share the ID, opening the first");
                }
                page.click(&Locator::new(tile)).await?;
                Ok(LocateOutcome::ById { matches: n })
            }
        }
    }
}

/// Index of the first tile whose text equals `name` once trimmed.
///
/// The tile selector also matches names differing only in inner whitespace;
/// those tiles are skipped here.
async fn exact_tile<D: PageDriver + ?Sized>(
    page: &mut D,
    tile: &Selector,
    name: &str,
) -> MarkcheckResult<Option<usize>> {
    let name = name.trim();
    let texts = page.all_text_contents(tile).await?;
    let index = texts.iter().position(|text| text.trim() == name);
    if index.is_none() && !texts.is_empty() {
        debug!(product = name, candidates = texts.len(), "only near-matching tiles rendered");
    }
    Ok(index)
}
