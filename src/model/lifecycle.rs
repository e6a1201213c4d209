//! Validation and the sync lifecycle.
//!
//! `fetch`, `save` and `destroy` share one completion protocol:
//!   - backend error → the completion gets the error, nothing else happens,
//!     and the error is returned as [`ModelError::Sync`];
//!   - success → (`fetch`/`save` only) the parsed response is written through
//!     [`Model::set`], then the completion runs, then `sync` is emitted.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    error::{ConfigurationError, ModelError, Result, SyncError},
    reactive::ModelEvent,
    sync::{Completion, DestroyOptions, SyncBackend, SyncOutcome, SyncVerb},
    util::is_truthy,
};

use super::{Attributes, Model};

impl Model {
    /// True until the id attribute holds a truthy value.
    pub fn is_new(&self) -> bool {
        !self.id().is_some_and(|id| is_truthy(&id))
    }

    /// Run the class's `validate` hook against the current attributes.
    ///
    /// On failure the error is recorded, `invalid` is emitted and `false` is
    /// returned. Classes without a hook are always valid.
    pub fn is_valid(&self) -> bool {
        self.validate_attributes(&self.to_json())
    }

    /// The error from the most recent validation, if it failed.
    pub fn validation_error(&self) -> Option<Value> {
        self.inner.validation_error.lock().clone()
    }

    fn validate_attributes(&self, attrs: &Attributes) -> bool {
        let Some(validate) = self.inner.class.prototype().validate() else {
            return true;
        };
        let error = validate(attrs).filter(is_truthy);
        *self.inner.validation_error.lock() = error.clone();
        match error {
            None => true,
            Some(error) => {
                self.fire(ModelEvent::Invalid {
                    model: self.clone(),
                    error,
                });
                false
            }
        }
    }

    /// Convert a raw response into attributes. Without a `parse` hook an
    /// object response is taken as-is and anything else yields nothing.
    pub fn parse(&self, response: &Value) -> Attributes {
        match self.inner.class.prototype().parse() {
            Some(parse) => parse(self, response),
            None => match response {
                Value::Object(map) => map.clone(),
                _ => Attributes::new(),
            },
        }
    }

    /// Read the model from the backend and apply the response.
    pub async fn fetch(&self, done: Option<Completion>) -> Result<SyncOutcome> {
        let backend = self.backend()?;
        self.sync_and_apply(backend, SyncVerb::Read, done).await
    }

    /// Create or update the model on the backend.
    ///
    /// Returns [`SyncOutcome::Invalid`] without contacting the backend when
    /// validation fails.
    pub async fn save(&self, done: Option<Completion>) -> Result<SyncOutcome> {
        if !self.is_valid() {
            return Ok(SyncOutcome::Invalid);
        }
        let backend = self.backend()?;
        let verb = if self.is_new() {
            SyncVerb::Create
        } else {
            SyncVerb::Update
        };
        self.sync_and_apply(backend, verb, done).await
    }

    /// Delete the model.
    ///
    /// A new model is never sent to the backend: the completion runs with no
    /// response, `destroy` is emitted and [`SyncOutcome::Local`] returned.
    /// Otherwise `destroy` is emitted before the request, or after a
    /// successful response when `options.wait` is set.
    pub async fn destroy(
        &self,
        options: DestroyOptions,
        done: Option<Completion>,
    ) -> Result<SyncOutcome> {
        if self.is_new() {
            if let Some(done) = done {
                done(self, Ok(None));
            }
            self.fire_destroy();
            return Ok(SyncOutcome::Local);
        }

        let backend = self.backend()?;
        if !options.wait {
            self.fire_destroy();
        }

        tracing::debug!(cid = %self.cid(), verb = %SyncVerb::Delete, "sync started");
        match backend.sync(SyncVerb::Delete, self).await {
            Err(error) => self.fail(SyncVerb::Delete, error, done),
            Ok(response) => {
                if options.wait {
                    self.fire_destroy();
                }
                self.succeed(SyncVerb::Delete, response, done)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn backend(&self) -> Result<Arc<dyn SyncBackend>> {
        self.inner.class.prototype().sync().ok_or_else(|| {
            ConfigurationError::MissingSync {
                class: self.inner.class.name().to_string(),
            }
            .into()
        })
    }

    async fn sync_and_apply(
        &self,
        backend: Arc<dyn SyncBackend>,
        verb: SyncVerb,
        done: Option<Completion>,
    ) -> Result<SyncOutcome> {
        tracing::debug!(cid = %self.cid(), verb = %verb, "sync started");
        match backend.sync(verb, self).await {
            Err(error) => self.fail(verb, error, done),
            Ok(response) => {
                self.set_all(self.parse(&response));
                self.succeed(verb, response, done)
            }
        }
    }

    fn succeed(
        &self,
        verb: SyncVerb,
        response: Value,
        done: Option<Completion>,
    ) -> Result<SyncOutcome> {
        if let Some(done) = done {
            done(self, Ok(Some(&response)));
        }
        self.fire(ModelEvent::Sync {
            model: self.clone(),
            response: response.clone(),
        });
        tracing::debug!(cid = %self.cid(), verb = %verb, "sync finished");
        Ok(SyncOutcome::Synced(response))
    }

    fn fail(
        &self,
        verb: SyncVerb,
        error: SyncError,
        done: Option<Completion>,
    ) -> Result<SyncOutcome> {
        tracing::warn!(cid = %self.cid(), verb = %verb, error = %error, "sync failed");
        if let Some(done) = done {
            done(self, Err(&error));
        }
        Err(ModelError::Sync(error))
    }

    fn fire_destroy(&self) {
        self.fire(ModelEvent::Destroy {
            model: self.clone(),
            collection: self.collection(),
        });
    }
}
