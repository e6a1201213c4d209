pub mod error;
pub mod util;

pub mod class;
pub mod model;
pub mod reactive;
pub mod sync;

pub use class::{extend, ModelClass, ProtoProps, UrlRoot};
pub use error::{ConfigurationError, DispatchError, ModelError, Result, SyncError, SyncErrorKind};
pub use model::{Attributes, Collection, Model};
pub use reactive::{Listen, ModelEvent, Rebind};
pub use sync::{completion, Completion, DestroyOptions, SyncBackend, SyncOutcome, SyncVerb};
