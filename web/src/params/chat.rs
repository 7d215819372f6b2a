use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IndexParams {
    pub(crate) source_name: Option<String>,
}
