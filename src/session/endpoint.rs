//! Endpoint URL construction
//!
//! API paths have the shape
//! `{base}/{apiVersion}/{A|R}/{language}/{platform}/{command}[/{extra}]*[?{query}]`.
//! Segments are percent-encoded individually so caller-supplied values can
//! never alter the path structure.

use crate::{
    Result,
    types::{Language, LoginStatus, PictureOptions, Platform},
};
use url::Url;

/// Session values that are embedded in every API path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathContext {
    /// Anonymous or registered
    pub login_status: LoginStatus,
    /// Content language
    pub language: Language,
    /// Playback platform
    pub platform: Platform,
}

/// URL factory for the API and image origins
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    image_base: Url,
}

impl Endpoints {
    /// Parse both origins
    pub fn new(base_url: &str, image_base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let image_base = Url::parse(image_base_url)?;

        for (field, url) in [("base_url", &base), ("image_base_url", &image_base)] {
            if url.cannot_be_a_base() {
                return Err(crate::Error::config(
                    field,
                    &format!("{} cannot be used as a base URL", url),
                ));
            }
        }

        Ok(Self { base, image_base })
    }

    /// Service origin
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Build an API URL
    ///
    /// `command` may contain `/` separated fixed segments such as
    /// `ALL/USER/LOCATION`; `extra` segments are appended after it.
    pub fn api(
        &self,
        version: &str,
        context: PathContext,
        command: &str,
        extra: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url> {
        let mut url = self.base.clone();
        append_segments(
            &mut url,
            [
                version,
                context.login_status.as_str(),
                context.language.code(),
                context.platform.code(),
            ]
            .into_iter()
            .chain(command.split('/'))
            .chain(extra.iter().copied()),
        )?;
        append_query(&mut url, query.iter().copied());
        Ok(url)
    }

    /// Configuration snapshot URL
    pub fn config(&self) -> Result<Url> {
        let mut url = self.base.clone();
        append_segments(&mut url, ["config"])?;
        Ok(url)
    }

    /// Image resizer URL
    pub fn picture(
        &self,
        slug: &str,
        width: u32,
        height: u32,
        options: &PictureOptions,
    ) -> Result<Url> {
        let mut url = self.image_base.clone();
        append_segments(&mut url, slug.split('/').filter(|s| !s.is_empty()))?;

        let width = width.to_string();
        let height = height.to_string();
        let mut query = vec![("width", width.as_str()), ("height", height.as_str())];
        query.extend(options.query_pairs());
        append_query(&mut url, query);
        Ok(url)
    }
}

fn append_segments<'a>(url: &mut Url, segments: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let base = url.to_string();
    let mut path = url
        .path_segments_mut()
        .map_err(|_| crate::Error::config("base_url", &format!("{} cannot be a base", base)))?;
    path.pop_if_empty().extend(segments);
    Ok(())
}

fn append_query<'a>(url: &mut Url, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) {
    let mut pairs = pairs.into_iter().peekable();
    if pairs.peek().is_none() {
        return;
    }
    url.query_pairs_mut().extend_pairs(pairs);
}
