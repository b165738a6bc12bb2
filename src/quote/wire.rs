use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct ChartEnvelope {
    pub(crate) chart: Option<ChartNode>,
}

#[derive(Deserialize)]
pub(crate) struct ChartNode {
    pub(crate) result: Option<Vec<ChartResult>>,
    pub(crate) error: Option<ChartError>,
}

#[derive(Deserialize)]
pub(crate) struct ChartError {
    pub(crate) code: String,
    pub(crate) description: String,
}

#[derive(Deserialize)]
pub(crate) struct ChartResult {
    #[serde(default)]
    pub(crate) meta: Option<MetaNode>,
    #[serde(default)]
    pub(crate) timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub(crate) indicators: Option<Indicators>,
}

#[derive(Deserialize, Clone, Default)]
pub(crate) struct MetaNode {
    #[serde(default, rename = "longName")]
    pub(crate) long_name: Option<String>,
    #[serde(default, rename = "shortName")]
    pub(crate) short_name: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct Indicators {
    #[serde(default)]
    pub(crate) quote: Vec<QuoteBlock>,
}

#[derive(Deserialize, Default)]
pub(crate) struct QuoteBlock {
    #[serde(default)]
    pub(crate) open: Vec<Option<f64>>,
    #[serde(default)]
    pub(crate) close: Vec<Option<f64>>,
}
