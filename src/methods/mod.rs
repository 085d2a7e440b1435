//! Sign-in methods lookup

pub mod lookup;
pub mod types;

pub use lookup::{
    FallbackDefaults, HttpMethodsLookup, LookupError, LookupGeneration, MethodsLookup,
    MethodsSource, ResolvedMethods, fallback_methods, resolve_methods,
};
pub use types::{LookupRequest, LookupResponse, Method};
