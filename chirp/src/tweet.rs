use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// Timestamp format used by every v1.1 endpoint, e.g.
/// `Wed Oct 10 20:19:24 +0000 2018`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Display format served to the facade, no leading zero on the hour or the
/// day, e.g. `8:19 PM - 10 Oct 2018`.
const DISPLAY_FORMAT: &str = "%-I:%M %p - %-d %b %Y";

/// A tweet as the provider sends it, reduced to the fields the domain model
/// consumes. Unknown fields are ignored during deserialization.
#[derive(Deserialize, Debug)]
pub struct RawTweet {
    pub created_at: Box<str>,
    pub text: Box<str>,
    #[serde(default)]
    pub entities: RawEntities,
    pub favorite_count: u64,
    pub retweet_count: u64,
    pub user: RawUser,
}

#[derive(Deserialize, Default, Debug)]
pub struct RawEntities {
    #[serde(default)]
    pub hashtags: Box<[RawHashtag]>,
}

#[derive(Deserialize, Debug)]
pub struct RawHashtag {
    pub text: Box<str>,
}

#[derive(Deserialize, Debug)]
pub struct RawUser {
    pub id: u64,
    pub name: Box<str>,
    pub screen_name: Box<str>,
}

/// A tweet author. Only constructed as part of a [`Tweet`].
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct Account {
    pub id: u64,
    pub fullname: Box<str>,
    /// Profile path derived from the screen name, e.g. `/jack`.
    pub href: Box<str>,
}

impl Account {
    fn from_raw(raw: RawUser) -> Self {
        Self {
            id: raw.id,
            fullname: raw.name,
            href: format!("/{}", raw.screen_name).into_boxed_str(),
        }
    }
}

/// The domain model of a single tweet. Immutable once constructed; either
/// every field is populated or construction fails.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct Tweet {
    pub account: Account,
    /// Display-formatted `created_at`.
    pub date: Box<str>,
    /// Hashtag texts in provider order, each prefixed with `#`.
    pub hashtags: Vec<String>,
    pub likes: u64,
    /// Reply counts are only exposed on the premium product tiers; the
    /// standard search and timeline payloads never carry one.
    pub replies: u64,
    pub retweets: u64,
    pub text: Box<str>,
}

impl Tweet {
    /// Converts a raw tweet into the domain model. Fails if `created_at`
    /// does not match the provider's fixed timestamp format.
    pub fn from_raw(raw: RawTweet) -> Result<Self, NormalizeError> {
        let date = format_created_at(&raw.created_at).map_err(NormalizeError::Timestamp)?;
        let hashtags = raw
            .entities
            .hashtags
            .iter()
            .map(|tag| format!("#{}", tag.text))
            .collect();

        Ok(Self {
            account: Account::from_raw(raw.user),
            date,
            hashtags,
            likes: raw.favorite_count,
            replies: 0,
            retweets: raw.retweet_count,
            text: raw.text,
        })
    }
}

fn format_created_at(created_at: &str) -> Result<Box<str>, chrono::ParseError> {
    let parsed = DateTime::parse_from_str(created_at, CREATED_AT_FORMAT)?;
    Ok(parsed.format(DISPLAY_FORMAT).to_string().into_boxed_str())
}
