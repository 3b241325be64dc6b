use log::{debug, info};
use select::document::Document;
use select::predicate::Name;
use url::Url;

use crate::apod::Apod;
use crate::error::{ApodError, TransferError};

/// The picture of the day, ready to download.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde0", derive(serde::Serialize))]
pub struct ImageReference {
    /// Display title, taken from the feed item.
    pub name: String,
    /// Absolute url of the image resource.
    pub url: Url,
}

/// The `src` of the first `<img>` in document order that has one.
///
/// `<img>` tags without a `src` attribute are skipped. An empty `src` still
/// counts and resolves to the page itself.
pub fn first_img_src(doc: &Document) -> Option<&str> {
    doc.find(Name("img")).find_map(|n| n.attr("src"))
}

/// Resolve a possibly relative `src` against the page it was found on.
pub fn resolve_src(base: &Url, src: &str) -> Result<Url, ApodError> {
    base.join(src.trim())
        .map_err(|error| ApodError::malformed_url(src, error))
}

impl Apod {
    /// Fetch the detail page at `page_link` and locate the image it shows.
    pub async fn locate_image(
        &self,
        page_link: &Url,
        title: &str,
    ) -> Result<ImageReference, ApodError> {
        info!("Getting the first img tag src url of {}", page_link);

        let body = async {
            let resp = self.get(page_link).await?;
            Ok::<_, TransferError>(resp.bytes().await?)
        }
        .await
        .map_err(|error| ApodError::PageFetch {
            url: page_link.clone(),
            error,
        })?;

        let doc = Document::from(&*String::from_utf8_lossy(&body));
        let src = first_img_src(&doc).ok_or_else(|| ApodError::NoImageFound {
            url: page_link.clone(),
        })?;
        debug!("Found img src {:?}", src);

        let url = resolve_src(page_link, src)?;
        info!("Resolved the full image url {}", url);

        Ok(ImageReference {
            name: title.to_string(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/apod/ap240101.html").unwrap()
    }

    #[test]
    fn no_image() {
        let doc = Document::from("<p>no image</p>");
        assert_eq!(first_img_src(&doc), None);
    }

    #[test]
    fn skips_img_without_src() {
        let doc = Document::from(r#"<img alt="x"/><img src="/a.jpg"/>"#);
        let src = first_img_src(&doc).unwrap();
        assert_eq!(src, "/a.jpg");
        assert_eq!(
            resolve_src(&base(), src).unwrap().as_str(),
            "https://example.com/a.jpg"
        );
    }

    #[test]
    fn first_src_wins() {
        let doc = Document::from(
            r#"<html><body><a href="image/big.jpg"><img src="image/240101.jpg" alt="moon"></a>
            <img src="image/other.jpg"></body></html>"#,
        );
        assert_eq!(first_img_src(&doc), Some("image/240101.jpg"));
    }

    #[test]
    fn empty_src_is_the_page() {
        let doc = Document::from(r#"<img src=""><img src="b.jpg">"#);
        let src = first_img_src(&doc).unwrap();
        assert_eq!(src, "");
        assert_eq!(resolve_src(&base(), src).unwrap(), base());

        let doc = Document::from(r#"<p><img src=""></p>"#);
        assert_eq!(first_img_src(&doc), Some(""));
    }

    #[test]
    fn resolve_relative() {
        assert_eq!(
            resolve_src(&base(), "image/240101.jpg").unwrap().as_str(),
            "https://example.com/apod/image/240101.jpg"
        );
        assert_eq!(
            resolve_src(&base(), "../image/x.jpg?size=full#top")
                .unwrap()
                .as_str(),
            "https://example.com/image/x.jpg?size=full#top"
        );
        assert_eq!(
            resolve_src(&base(), "//cdn.example.com/x.jpg")
                .unwrap()
                .as_str(),
            "https://cdn.example.com/x.jpg"
        );
    }

    #[test]
    fn resolve_absolute() {
        assert_eq!(
            resolve_src(&base(), "https://cdn.example.com/full.jpg")
                .unwrap()
                .as_str(),
            "https://cdn.example.com/full.jpg"
        );
    }

    #[test]
    fn resolve_malformed() {
        assert!(matches!(
            resolve_src(&base(), "http://[::1"),
            Err(ApodError::MalformedUrl { .. })
        ));
    }
}
