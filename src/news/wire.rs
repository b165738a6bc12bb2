use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct Rss {
    pub(crate) channel: Option<Channel>,
}

#[derive(Deserialize)]
pub(crate) struct Channel {
    #[serde(default, rename = "item")]
    pub(crate) items: Vec<Item>,
}

#[derive(Deserialize)]
pub(crate) struct Item {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) link: Option<String>,
    #[serde(default, rename = "pubDate")]
    pub(crate) pub_date: Option<String>,
    #[serde(default)]
    pub(crate) source: Option<Source>,
    #[serde(default, rename = "category")]
    pub(crate) categories: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct Source {
    #[serde(default, rename = "$text")]
    pub(crate) name: Option<String>,
}
