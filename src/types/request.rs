//! Request parameter definitions
//!
//! Query parameters accepted by the VOD search and picture endpoints.

use serde::{Deserialize, Serialize};

/// Sort direction for VOD search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl SortOrder {
    /// Query string value
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(crate::Error::config(
                "sort_order",
                &format!("Expected asc or desc, got {}", s),
            )),
        }
    }
}

/// Filters for the VOD search endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchVodParams {
    /// Genre filter
    #[serde(rename = "filter_genres", skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
    /// Meeting (race weekend) key filter
    #[serde(rename = "filter_MeetingKey", skip_serializing_if = "Option::is_none")]
    pub meeting_key: Option<String>,
    /// Object subtype filter (e.g. "Replay")
    #[serde(rename = "filter_objectSubtype", skip_serializing_if = "Option::is_none")]
    pub object_subtype: Option<String>,
    /// Order-by-FOM filter
    #[serde(rename = "filter_orderByFom", skip_serializing_if = "Option::is_none")]
    pub order_by_fom: Option<String>,
    /// Season filter
    #[serde(rename = "filter_season", skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    /// Year filter
    #[serde(rename = "filter_year", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Page size
    #[serde(rename = "maxResults", skip_serializing_if = "Option::is_none")]
    pub max_results: Option<String>,
    /// Sort field
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Sort direction
    #[serde(rename = "sortOrder", skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl SearchVodParams {
    /// Create an empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by genre
    pub fn with_genres(mut self, genres: impl Into<String>) -> Self {
        self.genres = Some(genres.into());
        self
    }

    /// Filter by meeting key
    pub fn with_meeting_key(mut self, meeting_key: impl Into<String>) -> Self {
        self.meeting_key = Some(meeting_key.into());
        self
    }

    /// Filter by object subtype
    pub fn with_object_subtype(mut self, object_subtype: impl Into<String>) -> Self {
        self.object_subtype = Some(object_subtype.into());
        self
    }

    /// Filter by FOM ordering
    pub fn with_order_by_fom(mut self, order_by_fom: impl Into<String>) -> Self {
        self.order_by_fom = Some(order_by_fom.into());
        self
    }

    /// Filter by season
    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self
    }

    /// Filter by year
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Limit the number of results
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results.to_string());
        self
    }

    /// Sort by the given field
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Sort direction
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    /// Query pairs in a stable order, absent filters omitted
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let fields: [(&'static str, Option<&str>); 9] = [
            ("filter_genres", self.genres.as_deref()),
            ("filter_MeetingKey", self.meeting_key.as_deref()),
            ("filter_objectSubtype", self.object_subtype.as_deref()),
            ("filter_orderByFom", self.order_by_fom.as_deref()),
            ("filter_season", self.season.as_deref()),
            ("filter_year", self.year.as_deref()),
            ("maxResults", self.max_results.as_deref()),
            ("orderBy", self.order_by.as_deref()),
            ("sortOrder", self.sort_order.as_ref().map(SortOrder::as_str)),
        ];

        fields
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v.to_string())))
            .collect()
    }

    /// Whether no filter is set
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// Options for the image resizer endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PictureOptions {
    /// Request high quality output (`q=HI`)
    pub high_quality: bool,
    /// Request landscape orientation (`o=L`)
    pub landscape: bool,
    /// Serve a fallback image when the slug is unknown (`fallback=true`)
    pub fallback: bool,
}

impl PictureOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set high quality flag
    pub fn with_high_quality(mut self, high_quality: bool) -> Self {
        self.high_quality = high_quality;
        self
    }

    /// Set landscape flag
    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.landscape = landscape;
        self
    }

    /// Set fallback flag
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Query pairs for the image resizer, after width and height
    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        if self.high_quality {
            pairs.push(("q", "HI"));
        }
        if self.landscape {
            pairs.push(("o", "L"));
        }
        if self.fallback {
            pairs.push(("fallback", "true"));
        }
        pairs
    }
}
