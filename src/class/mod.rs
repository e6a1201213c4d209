//! Class derivation for models.
//!
//! A [`ModelClass`] pairs a [`Prototype`] (behavior shared by its instances)
//! with static properties and a construction function. [`extend`] derives a
//! child class whose prototype delegates to the parent's.

pub mod extend;
pub mod model_class;
pub mod prototype;

pub use extend::{extend, ProtoProps};
pub use model_class::ModelClass;
pub use prototype::{
    ConstructorFn, EscapeFn, InitializeFn, MethodFn, ParseFn, Prototype, UrlResolverFn, UrlRoot,
    ValidateFn,
};
