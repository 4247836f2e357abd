//! Type definitions for the F1TV client
//!
//! This module contains the request parameters, response envelopes and
//! session-level value types.

pub mod internal;
pub mod request;
pub mod response;

pub use internal::*;
pub use request::{PictureOptions, SearchVodParams, SortOrder};
pub use response::{
    ApiResult, Config, ContentPlayResult, ContentVideoContainer, ContentVideoResult,
    EntitlementResult, LiveNowResult, LocationDefaults, LocationResult, SearchVodResult,
    UserLocation,
};
