//! Request descriptors for the provider's catalog, process and statistical APIs
//!
//! Each descriptor serializes to the JSON body the provider expects and is
//! built fresh per call. All requests target Sentinel-2 L2A.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeDelta, Utc};
use geojson::Geometry;
use serde::Serialize;

use crate::evalscript::NDVI_STATS_EVALSCRIPT;
use crate::geometry::{BoundingBox, Crs, PolygonGeometry};

/// Provider identifier for Sentinel-2 Level-2A
pub const SENTINEL2_L2A: &str = "sentinel-2-l2a";

/// Length of the trailing catalog search window
pub const CATALOG_WINDOW_DAYS: i64 = 365;

/// Items requested per catalog page
pub const CATALOG_PAGE_LIMIT: u32 = 100;

pub const STATS_AGGREGATION_INTERVAL: &str = "P5D";
pub const STATS_WIDTH: u32 = 512;
pub const STATS_HEIGHT: f64 = 461.953;

pub const PNG_MIME: &str = "image/png";

/// Inclusive time window covered by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Whole calendar days from the start of `start` to the last second of `end`
    pub fn days(start: NaiveDate, end: NaiveDate) -> Self {
        let from = start.and_time(NaiveTime::MIN).and_utc();
        let to = end.and_time(NaiveTime::MIN).and_utc() + TimeDelta::days(1)
            - TimeDelta::seconds(1);
        Self { from, to }
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.from.date_naive() && date <= self.to.date_naive()
    }

    /// RFC 3339 interval notation `from/to`
    pub fn interval(&self) -> String {
        format!(
            "{}/{}",
            self.from.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.to.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Bounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    pub properties: BoundsProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundsProperties {
    pub crs: &'static str,
}

impl BoundsProperties {
    fn for_crs(crs: Crs) -> Self {
        Self { crs: crs.url() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataInput {
    #[serde(rename = "type")]
    pub collection: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_filter: Option<DataFilter>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFilter {
    pub time_range: TimeRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestInput {
    pub bounds: Bounds,
    pub data: Vec<DataInput>,
}

/// Catalog search over the trailing year
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSearchRequest {
    pub collections: Vec<&'static str>,
    pub datetime: String,
    pub intersects: Geometry,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<u64>,
    #[serde(skip)]
    window: TimeRange,
}

impl CatalogSearchRequest {
    /// Window `[now - 365 days, now]`, ending at call time
    pub fn trailing_year(polygon: &PolygonGeometry, now: DateTime<Utc>) -> Self {
        let window = TimeRange {
            from: now - TimeDelta::days(CATALOG_WINDOW_DAYS),
            to: now,
        };

        Self {
            collections: vec![SENTINEL2_L2A],
            datetime: window.interval(),
            intersects: polygon.geometry.clone(),
            limit: CATALOG_PAGE_LIMIT,
            next: None,
            window,
        }
    }

    /// Same search positioned at a later result page
    pub fn with_next(&self, next: u64) -> Self {
        Self {
            next: Some(next),
            ..self.clone()
        }
    }

    pub fn window(&self) -> TimeRange {
        self.window
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutput {
    pub responses: Vec<OutputResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputResponse {
    pub identifier: &'static str,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFormat {
    #[serde(rename = "type")]
    pub mime: &'static str,
}

/// Single-day rendering through the process API
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    pub input: RequestInput,
    pub output: ProcessOutput,
    pub evalscript: String,
}

#[bon::bon]
impl ProcessRequest {
    /// Imagery for one calendar day clipped to `bbox` (and `geometry` when given)
    #[builder]
    pub fn imagery(
        bbox: BoundingBox,
        geometry: Option<PolygonGeometry>,
        date: NaiveDate,
        #[builder(into)] evalscript: String,
    ) -> Self {
        Self {
            input: RequestInput {
                bounds: Bounds {
                    bbox: Some(bbox.bounds),
                    geometry: geometry.map(|g| g.geometry),
                    properties: BoundsProperties::for_crs(bbox.crs),
                },
                data: vec![DataInput {
                    collection: SENTINEL2_L2A,
                    data_filter: Some(DataFilter {
                        time_range: TimeRange::days(date, date),
                    }),
                }],
            },
            output: ProcessOutput {
                responses: vec![OutputResponse {
                    identifier: "default",
                    format: OutputFormat { mime: PNG_MIME },
                }],
            },
            evalscript,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregationInterval {
    pub of: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub time_range: TimeRange,
    pub aggregation_interval: AggregationInterval,
    pub width: u32,
    pub height: f64,
    pub evalscript: &'static str,
}

/// NDVI time series through the statistical API
#[derive(Debug, Clone, Serialize)]
pub struct StatisticalRequest {
    pub input: RequestInput,
    pub aggregation: Aggregation,
}

impl StatisticalRequest {
    /// Interval and output size are fixed; callers only choose area and dates
    pub fn ndvi(polygon: &PolygonGeometry, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            input: RequestInput {
                bounds: Bounds {
                    bbox: None,
                    geometry: Some(polygon.geometry.clone()),
                    properties: BoundsProperties::for_crs(polygon.crs),
                },
                data: vec![DataInput {
                    collection: SENTINEL2_L2A,
                    data_filter: None,
                }],
            },
            aggregation: Aggregation {
                time_range: TimeRange::days(start, end),
                aggregation_interval: AggregationInterval {
                    of: STATS_AGGREGATION_INTERVAL,
                },
                width: STATS_WIDTH,
                height: STATS_HEIGHT,
                evalscript: NDVI_STATS_EVALSCRIPT,
            },
        }
    }
}
