//! Image stage: every product image URL must fetch successfully.

use tracing::{debug, info, warn};
use url::Url;

use super::ColorConfirmed;
use crate::catalog::{CatalogSelectors, ImageRegion};
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::outcome::{Finding, Outcome};

/// First usable URL of a `srcset` value (data URIs skipped)
#[must_use]
pub fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset_urls(srcset).find(|candidate| !is_data_uri(candidate))
}

/// Candidate URLs of a `srcset` value, in order.
///
/// A URL runs to the next whitespace, so commas inside it (as in data URIs)
/// stay part of it; its descriptor runs to the next comma.
fn srcset_urls(srcset: &str) -> impl Iterator<Item = &str> {
    let mut rest = srcset;
    std::iter::from_fn(move || loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (token, after) = rest.split_at(end);
        let url = token.trim_end_matches(',');
        rest = if url.len() < token.len() {
            after
        } else {
            after.find(',').map_or("", |i| &after[i + 1..])
        };
        if !url.is_empty() {
            return Some(url);
        }
    })
}

/// Inline data URIs cannot be broken and are never fetched
#[must_use]
pub fn is_data_uri(src: &str) -> bool {
    src.trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Resolve `raw` against the page URL
fn absolute(raw: &str, base: Option<&Url>) -> Option<Url> {
    Url::parse(raw)
        .ok()
        .or_else(|| base.and_then(|b| b.join(raw).ok()))
}

/// Fetch every image URL in the configured regions and report broken ones
pub async fn verify_images<D: PageDriver + ?Sized>(
    page: &mut D,
    selectors: &CatalogSelectors,
    _color: &ColorConfirmed,
) -> Outcome {
    let base = page
        .current_url()
        .await
        .ok()
        .and_then(|u| Url::parse(&u).ok());

    let mut urls = Vec::new();
    for region in &selectors.image_regions {
        urls.extend(region_urls(page, region, base.as_ref()).await);
    }
    info!(urls = urls.len(), "checking image URLs");

    let mut broken = Vec::new();
    for url in urls {
        match page.fetch(url.as_str()).await {
            Ok(status) if status.ok() => {}
            Ok(status) => {
                warn!(url = %url, status = status.status, "broken image");
                broken.push(url.to_string());
            }
            Err(e) => {
                warn!(url = %url, error = %e, "error checking image");
                broken.push(url.to_string());
            }
        }
    }

    if broken.is_empty() {
        info!("no broken images");
        Outcome::pass(Finding::Image, "No broken images.")
    } else {
        Outcome::fail(Finding::Image, broken.join("\n"))
    }
}

/// Direct source plus first source-set candidate of each image in `region`
async fn region_urls<D: PageDriver + ?Sized>(
    page: &mut D,
    region: &ImageRegion,
    base: Option<&Url>,
) -> Vec<Url> {
    let count = match page.count(&region.images).await {
        Ok(n) => n,
        Err(e) => {
            warn!(region = region.name.as_str(), error = %e, "image region unreadable");
            return Vec::new();
        }
    };
    debug!(region = region.name.as_str(), images = count, "collecting images");

    let mut urls = Vec::new();
    for i in 0..count {
        let img = Locator::nth(region.images.clone(), i);
        let src = first_attribute(page, &img, &["src", "data-src"]).await;
        let srcset = first_attribute(page, &img, &["srcset", "data-srcset"]).await;

        let candidates = src
            .as_deref()
            .filter(|s| !is_data_uri(s))
            .into_iter()
            .chain(srcset.as_deref().and_then(first_srcset_candidate));
        for raw in candidates {
            match absolute(raw.trim(), base) {
                Some(url) => urls.push(url),
                None => debug!(src = raw, "invalid image URL skipped"),
            }
        }
    }
    urls
}

async fn first_attribute<D: PageDriver + ?Sized>(
    page: &mut D,
    img: &Locator,
    names: &[&str],
) -> Option<String> {
    for name in names {
        if let Ok(Some(value)) = page.attribute(img, name).await {
            if !value.trim().is_empty() {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage};
    use crate::verify::color::confirmed_for_tests;

    const PAGE: &str = "https://shop.example/p/pace-short/prod1";

    fn one_region(images: &str) -> CatalogSelectors {
        CatalogSelectors {
            image_regions: vec![ImageRegion {
                name: "thumbnails".to_string(),
                images: crate::locator::Selector::css(images),
            }],
            ..CatalogSelectors::default()
        }
    }

    mod srcset_tests {
        use super::*;

        #[test]
        fn test_first_candidate() {
            assert_eq!(
                first_srcset_candidate("/a.jpg 1x, /b.jpg 2x"),
                Some("/a.jpg")
            );
            assert_eq!(
                first_srcset_candidate("data:image/gif;base64,R0lG 1x, /b.jpg 2x"),
                Some("/b.jpg")
            );
            assert_eq!(first_srcset_candidate(""), None);
        }

        #[test]
        fn test_data_uri_commas_stay_in_candidate() {
            let urls: Vec<&str> =
                srcset_urls("data:image/gif;base64,R0lGOD 1x, /b.jpg 2x,/c.jpg").collect();
            assert_eq!(urls, ["data:image/gif;base64,R0lGOD", "/b.jpg", "/c.jpg"]);
            assert_eq!(
                first_srcset_candidate("data:image/png;base64,AA,BB"),
                None
            );
            assert_eq!(first_srcset_candidate("/a.jpg, /b.jpg 2x"), Some("/a.jpg"));
        }

        #[test]
        fn test_data_uri_detection() {
            assert!(is_data_uri("data:image/png;base64,AAAA"));
            assert!(is_data_uri("DATA:image/png;base64,AAAA"));
            assert!(!is_data_uri("/img/data.png"));
            assert!(!is_data_uri("dat"));
        }
    }

    mod verify_tests {
        use super::*;

        #[tokio::test]
        async fn test_relative_urls_resolved_and_fetched() {
            let s = one_region("img.thumb");
            let mut page = MockPage::new().with_element(
                &s.image_regions[0].images,
                MockElement::new()
                    .attr("src", "/img/a.jpg")
                    .attr("srcset", "/img/a-1x.jpg 1x, /img/a-2x.jpg 2x"),
            );
            page.set_current_url(PAGE);
            let outcome = verify_images(&mut page, &s, &confirmed_for_tests()).await;
            assert!(outcome.is_pass());
            assert_eq!(outcome.column(), None);
            assert!(page.was_called("fetch:https://shop.example/img/a.jpg"));
            assert!(page.was_called("fetch:https://shop.example/img/a-1x.jpg"));
            assert!(!page.was_called("fetch:https://shop.example/img/a-2x.jpg"));
        }

        #[tokio::test]
        async fn test_data_uri_in_srcset_falls_through_to_next_candidate() {
            let s = one_region("img.thumb");
            let mut page = MockPage::new().with_element(
                &s.image_regions[0].images,
                MockElement::new().attr("srcset", "data:image/gif;base64,R0lGOD 1x, /b.jpg 2x"),
            );
            page.set_current_url(PAGE);
            let outcome = verify_images(&mut page, &s, &confirmed_for_tests()).await;
            assert!(outcome.is_pass());
            assert!(page.was_called("fetch:https://shop.example/b.jpg"));
            assert!(!page.was_called("fetch:https://shop.example/p/pace-short/R0lGOD"));
            assert_eq!(page.call_count("fetch:"), 1);
        }

        #[tokio::test]
        async fn test_data_uri_never_fetched() {
            let s = one_region("img.thumb");
            let mut page = MockPage::new().with_element(
                &s.image_regions[0].images,
                MockElement::new().attr("src", "data:image/png;base64,iVBORw0KGgo="),
            );
            page.set_current_url(PAGE);
            let outcome = verify_images(&mut page, &s, &confirmed_for_tests()).await;
            assert!(outcome.is_pass());
            assert_eq!(page.call_count("fetch:"), 0);
        }

        #[tokio::test]
        async fn test_lazy_placeholder_attribute() {
            let s = one_region("img.thumb");
            let mut page = MockPage::new().with_element(
                &s.image_regions[0].images,
                MockElement::new().attr("data-src", "https://cdn.example/lazy.jpg"),
            );
            let outcome = verify_images(&mut page, &s, &confirmed_for_tests()).await;
            assert!(outcome.is_pass());
            assert!(page.was_called("fetch:https://cdn.example/lazy.jpg"));
        }

        #[tokio::test]
        async fn test_broken_urls_listed_one_per_line() {
            let s = one_region("img.thumb");
            let images = &s.image_regions[0].images;
            let mut page = MockPage::new()
                .with_element(images, MockElement::new().attr("src", "https://cdn.example/a.jpg"))
                .with_element(images, MockElement::new().attr("src", "https://cdn.example/b.jpg"))
                .with_element(images, MockElement::new().attr("src", "https://cdn.example/c.jpg"));
            page.set_fetch_status("https://cdn.example/a.jpg", 404);
            page.fail_fetch("https://cdn.example/c.jpg");
            let outcome = verify_images(&mut page, &s, &confirmed_for_tests()).await;
            assert!(outcome.is_fail());
            assert_eq!(
                outcome.message,
                "https://cdn.example/a.jpg\nhttps://cdn.example/c.jpg"
            );
        }

        #[tokio::test]
        async fn test_all_regions_are_collected() {
            let s = CatalogSelectors::default();
            let mut page = MockPage::new();
            for (i, region) in s.image_regions.iter().enumerate() {
                page.add_element(
                    &region.images,
                    MockElement::new().attr("src", format!("https://cdn.example/{i}.jpg")),
                );
            }
            verify_images(&mut page, &s, &confirmed_for_tests()).await;
            assert_eq!(page.call_count("fetch:"), 3);
        }
    }
}
