use log::{debug, info};
use rss::Channel;
use url::Url;

use crate::apod::Apod;
use crate::error::{ApodError, FeedError, TransferError};

/// The newest item of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde0", derive(serde::Serialize))]
pub struct FeedEntry {
    /// Title of the item, empty if the feed omits it.
    pub title: String,
    /// Link to the detail page of the item.
    pub link: Url,
}

/// A parsed syndication document.
#[derive(Debug, Clone)]
pub enum Feed {
    Rss(Channel),
    Atom(atom_syndication::Feed),
}

impl Feed {
    /// Parse `body` as RSS, falling back to Atom if it has no `<rss>` root.
    pub fn read_from(body: &[u8]) -> Result<Self, FeedError> {
        match Channel::read_from(body) {
            Ok(channel) => Ok(Feed::Rss(channel)),
            Err(rss::Error::InvalidStartTag) => {
                Ok(Feed::Atom(atom_syndication::Feed::read_from(body)?))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Number of items or entries.
    pub fn len(&self) -> usize {
        match self {
            Feed::Rss(channel) => channel.items().len(),
            Feed::Atom(feed) => feed.entries().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Title and link of the first item, `None` if there is no item.
    fn first(&self) -> Option<(Option<&str>, Option<&str>)> {
        match self {
            Feed::Rss(channel) => channel
                .items()
                .first()
                .map(|item| (item.title(), item.link())),
            Feed::Atom(feed) => feed.entries().first().map(|entry| {
                let link = entry
                    .links()
                    .iter()
                    .find(|l| l.rel() == "alternate")
                    .or_else(|| entry.links().first())
                    .map(|l| l.href());
                (Some(entry.title().value.as_str()), link)
            }),
        }
    }
}

/// Select the first item of the feed.
///
/// Feeds list their items newest first, so this is the latest entry.
pub fn latest_entry(feed: &Feed, feed_url: &Url) -> Result<FeedEntry, ApodError> {
    let (title, link) = feed.first().ok_or_else(|| ApodError::EmptyFeed {
        url: feed_url.clone(),
    })?;

    let link = link.ok_or_else(|| ApodError::IncompleteEntry {
        url: feed_url.clone(),
        field: "link",
    })?;
    let link = Url::parse(link.trim()).map_err(|error| ApodError::malformed_url(link, error))?;

    Ok(FeedEntry {
        title: title.unwrap_or_default().trim().to_string(),
        link,
    })
}

impl Apod {
    /// Fetch and parse the feed at `feed_url` and return its newest entry.
    pub async fn fetch_latest_entry(&self, feed_url: &Url) -> Result<FeedEntry, ApodError> {
        info!("Parsing feed {}", feed_url);

        let body = async {
            let resp = self.get(feed_url).await?;
            Ok::<_, TransferError>(resp.bytes().await?)
        }
        .await
        .map_err(|error| ApodError::FeedFetch {
            url: feed_url.clone(),
            error,
        })?;

        let feed = Feed::read_from(&body[..]).map_err(|error| ApodError::FeedParse {
            url: feed_url.clone(),
            error,
        })?;
        debug!("Feed {} lists {} items", feed_url, feed.len());

        latest_entry(&feed, feed_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_with(items: &[(&str, &str)]) -> Feed {
        let items: String = items
            .iter()
            .map(|(title, link)| {
                format!(
                    "<item><title>{}</title><link>{}</link></item>",
                    title, link
                )
            })
            .collect();
        let xml = format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>APOD</title><link>https://apod.nasa.gov/apod/</link><description>Astronomy Picture of the Day</description>{}</channel></rss>"#,
            items
        );
        Feed::read_from(xml.as_bytes()).unwrap()
    }

    fn atom_with(entries: &str) -> Feed {
        let xml = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
<title>APOD</title><id>urn:apod</id><updated>2024-01-01T00:00:00Z</updated>
{}
</feed>"#,
            entries
        );
        let feed = Feed::read_from(xml.as_bytes()).unwrap();
        assert!(matches!(feed, Feed::Atom(_)));
        feed
    }

    fn feed_url() -> Url {
        Url::parse("https://apod.nasa.gov/apod.rss").unwrap()
    }

    #[test]
    fn first_item_wins() {
        let feed = feed_with(&[
            ("Orion Nebula", "https://apod.nasa.gov/apod/ap240103.html"),
            ("Crab Nebula", "https://apod.nasa.gov/apod/ap240102.html"),
            ("Moon", "https://apod.nasa.gov/apod/ap240101.html"),
        ]);
        assert_eq!(feed.len(), 3);
        let entry = latest_entry(&feed, &feed_url()).unwrap();
        assert_eq!(entry.title, "Orion Nebula");
        assert_eq!(
            entry.link.as_str(),
            "https://apod.nasa.gov/apod/ap240103.html"
        );

        let feed = feed_with(&[("Moon", "https://apod.nasa.gov/apod/ap240101.html")]);
        let entry = latest_entry(&feed, &feed_url()).unwrap();
        assert_eq!(entry.title, "Moon");
    }

    #[test]
    fn empty_feed() {
        let feed = feed_with(&[]);
        assert!(feed.is_empty());
        assert!(matches!(
            latest_entry(&feed, &feed_url()),
            Err(ApodError::EmptyFeed { .. })
        ));

        let feed = atom_with("");
        assert!(matches!(
            latest_entry(&feed, &feed_url()),
            Err(ApodError::EmptyFeed { .. })
        ));
    }

    #[test]
    fn missing_link() {
        let mut channel = match feed_with(&[("Moon", "https://apod.nasa.gov/apod/ap240101.html")]) {
            Feed::Rss(channel) => channel,
            Feed::Atom(_) => unreachable!(),
        };
        channel.items_mut()[0].set_link(None::<String>);
        assert!(matches!(
            latest_entry(&Feed::Rss(channel), &feed_url()),
            Err(ApodError::IncompleteEntry { field: "link", .. })
        ));

        let feed = atom_with("<entry><title>Moon</title><id>urn:1</id></entry>");
        assert!(matches!(
            latest_entry(&feed, &feed_url()),
            Err(ApodError::IncompleteEntry { field: "link", .. })
        ));
    }

    #[test]
    fn relative_link_is_malformed() {
        let feed = feed_with(&[("Moon", "apod/ap240101.html")]);
        assert!(matches!(
            latest_entry(&feed, &feed_url()),
            Err(ApodError::MalformedUrl { .. })
        ));
    }

    #[test]
    fn atom_first_entry_alternate_link() {
        let feed = atom_with(
            r#"<entry><title>Moon</title><id>urn:1</id>
<link rel="enclosure" href="https://apod.nasa.gov/apod/image/2401/moon.jpg"/>
<link rel="alternate" href="https://apod.nasa.gov/apod/ap240101.html"/></entry>
<entry><title>Orion Nebula</title><id>urn:0</id>
<link href="https://apod.nasa.gov/apod/ap231231.html"/></entry>"#,
        );
        assert_eq!(feed.len(), 2);
        let entry = latest_entry(&feed, &feed_url()).unwrap();
        assert_eq!(entry.title, "Moon");
        assert_eq!(
            entry.link.as_str(),
            "https://apod.nasa.gov/apod/ap240101.html"
        );
    }

    #[test]
    fn neither_rss_nor_atom() {
        assert!(matches!(
            Feed::read_from(b"<html><body>Service unavailable</body></html>"),
            Err(FeedError::Atom(_))
        ));
        assert!(Feed::read_from(b"").is_err());
    }
}
