use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeleteParams {
    pub(crate) id: Option<String>,
}
