//! Upstream record shapes mapped onto the stable tool output schemas.
//!
//! Every output struct serializes all of its keys; a field the provider did
//! not send becomes `null`. Keys the provider sends that are not declared
//! here are dropped.

use crate::utils::text::decode_best_effort;
use crate::utils::time::timestamp_field;
use serde::Serialize;
use serde_json::{Map, Value};

/// Endpoint families served by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    MarketNews,
    CompanyNews,
    EarningsCalendar,
    Quote,
    BasicFinancials,
    EarningsSurprises,
}

/// How records are laid out in a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Top-level JSON array of records.
    List,
    /// Object holding the record array under a key; a missing key means no records.
    Wrapped(&'static str),
    /// The body itself is the single record.
    Object,
}

#[derive(Debug, Clone, Copy)]
pub struct EndpointSpec {
    pub kind: EndpointKind,
    pub path: &'static str,
    pub shape: ResponseShape,
}

pub const ENDPOINTS: &[EndpointSpec] = &[
    EndpointSpec {
        kind: EndpointKind::MarketNews,
        path: "news",
        shape: ResponseShape::List,
    },
    EndpointSpec {
        kind: EndpointKind::CompanyNews,
        path: "company-news",
        shape: ResponseShape::List,
    },
    EndpointSpec {
        kind: EndpointKind::EarningsCalendar,
        path: "calendar/earnings",
        shape: ResponseShape::Wrapped("earningsCalendar"),
    },
    EndpointSpec {
        kind: EndpointKind::Quote,
        path: "quote",
        shape: ResponseShape::Object,
    },
    EndpointSpec {
        kind: EndpointKind::BasicFinancials,
        path: "stock/metric",
        shape: ResponseShape::Object,
    },
    EndpointSpec {
        kind: EndpointKind::EarningsSurprises,
        path: "stock/earnings",
        shape: ResponseShape::List,
    },
];

impl EndpointKind {
    pub fn spec(self) -> &'static EndpointSpec {
        ENDPOINTS
            .iter()
            .find(|spec| spec.kind == self)
            .unwrap_or(&ENDPOINTS[0])
    }

    pub fn path(self) -> &'static str {
        self.spec().path
    }

    pub fn shape(self) -> ResponseShape {
        self.spec().shape
    }
}

/// Request-side values a record may echo back (the uppercased symbol).
#[derive(Debug, Clone, Default)]
pub struct RecordContext {
    pub symbol: Option<String>,
}

impl RecordContext {
    pub fn for_symbol(symbol: &str) -> Self {
        Self {
            symbol: Some(normalize_symbol(symbol)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    pub id: Option<i64>,
    pub category: Option<String>,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub related: Option<String>,
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsEvent {
    pub date: Option<String>,
    pub symbol: Option<String>,
    pub hour: Option<String>,
    pub quarter: Option<i64>,
    pub year: Option<i64>,
    pub eps_actual: Option<f64>,
    pub eps_estimate: Option<f64>,
    pub revenue_actual: Option<f64>,
    pub revenue_estimate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub current_price: Option<f64>,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicFinancials {
    pub symbol: Option<String>,
    pub metric_type: Option<String>,
    pub metric: Map<String, Value>,
    pub series: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsSurprise {
    pub symbol: Option<String>,
    pub period: Option<String>,
    pub year: Option<i64>,
    pub quarter: Option<i64>,
    pub actual: Option<f64>,
    pub estimate: Option<f64>,
    pub surprise: Option<f64>,
    pub surprise_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedRecord {
    News(NewsArticle),
    Earnings(EarningsEvent),
    Quote(Quote),
    Financials(BasicFinancials),
    Surprise(EarningsSurprise),
}

pub fn normalize(kind: EndpointKind, raw: &Value, ctx: &RecordContext) -> NormalizedRecord {
    match kind {
        EndpointKind::MarketNews | EndpointKind::CompanyNews => {
            NormalizedRecord::News(normalize_article(raw))
        }
        EndpointKind::EarningsCalendar => NormalizedRecord::Earnings(normalize_earnings_event(raw)),
        EndpointKind::Quote => NormalizedRecord::Quote(normalize_quote(raw, ctx)),
        EndpointKind::BasicFinancials => {
            NormalizedRecord::Financials(normalize_basic_financials(raw, ctx))
        }
        EndpointKind::EarningsSurprises => {
            NormalizedRecord::Surprise(normalize_earnings_surprise(raw))
        }
    }
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

pub fn normalize_article(raw: &Value) -> NewsArticle {
    NewsArticle {
        id: int_field(raw, "id"),
        category: str_field(raw, "category"),
        headline: str_field(raw, "headline").map(|s| decode_best_effort(&s)),
        summary: str_field(raw, "summary").map(|s| decode_best_effort(&s)),
        source: str_field(raw, "source"),
        url: str_field(raw, "url"),
        image: str_field(raw, "image"),
        related: str_field(raw, "related"),
        datetime: timestamp_field(raw.get("datetime")),
    }
}

pub fn normalize_earnings_event(raw: &Value) -> EarningsEvent {
    EarningsEvent {
        date: str_field(raw, "date"),
        symbol: symbol_field(raw, "symbol"),
        hour: str_field(raw, "hour"),
        quarter: int_field(raw, "quarter"),
        year: int_field(raw, "year"),
        eps_actual: num_field(raw, "epsActual"),
        eps_estimate: num_field(raw, "epsEstimate"),
        revenue_actual: num_field(raw, "revenueActual"),
        revenue_estimate: num_field(raw, "revenueEstimate"),
    }
}

pub fn normalize_quote(raw: &Value, ctx: &RecordContext) -> Quote {
    Quote {
        symbol: ctx
            .symbol
            .clone()
            .or_else(|| symbol_field(raw, "symbol"))
            .unwrap_or_default(),
        current_price: num_field(raw, "c"),
        change: num_field(raw, "d"),
        percent_change: num_field(raw, "dp"),
        high: num_field(raw, "h"),
        low: num_field(raw, "l"),
        open: num_field(raw, "o"),
        previous_close: num_field(raw, "pc"),
        timestamp: timestamp_field(raw.get("t")),
    }
}

pub fn normalize_basic_financials(raw: &Value, ctx: &RecordContext) -> BasicFinancials {
    BasicFinancials {
        symbol: symbol_field(raw, "symbol").or_else(|| ctx.symbol.clone()),
        metric_type: str_field(raw, "metricType"),
        metric: object_field(raw, "metric"),
        series: object_field(raw, "series"),
    }
}

pub fn normalize_earnings_surprise(raw: &Value) -> EarningsSurprise {
    EarningsSurprise {
        symbol: symbol_field(raw, "symbol"),
        period: str_field(raw, "period"),
        year: int_field(raw, "year"),
        quarter: int_field(raw, "quarter"),
        actual: num_field(raw, "actual"),
        estimate: num_field(raw, "estimate"),
        surprise: num_field(raw, "surprise"),
        surprise_percent: num_field(raw, "surprisePercent"),
    }
}

fn str_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

fn symbol_field(raw: &Value, key: &str) -> Option<String> {
    str_field(raw, key).map(|s| normalize_symbol(&s))
}

fn num_field(raw: &Value, key: &str) -> Option<f64> {
    match raw.get(key)? {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

fn int_field(raw: &Value, key: &str) -> Option<i64> {
    match raw.get(key)? {
        Value::Number(num) => num
            .as_i64()
            .or_else(|| num.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn object_field(raw: &Value, key: &str) -> Map<String, Value> {
    raw.get(key)
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default()
}
