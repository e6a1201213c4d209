use crate::{
    error::ConfigurationError,
    util::{display_value, encode_uri_component},
};

use super::Model;

impl Model {
    /// Endpoint for this model.
    ///
    /// The base comes from the class's URL root, else from the owning
    /// collection. Persisted models get their encoded id appended after a
    /// single `/`.
    pub fn url(&self) -> Result<String, ConfigurationError> {
        let base = self
            .inner
            .class
            .prototype()
            .url_root()
            .and_then(|root| root.resolve(self))
            .or_else(|| {
                self.collection()
                    .and_then(|c| c.url())
                    .filter(|u| !u.is_empty())
            })
            .ok_or(ConfigurationError::MissingUrl)?;

        if self.is_new() {
            return Ok(base);
        }

        let id = self.id().map(|v| display_value(&v)).unwrap_or_default();
        let mut url = base;
        if !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(&encode_uri_component(&id));
        Ok(url)
    }
}
