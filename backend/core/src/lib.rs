//! `plexus-core`: data model and collaborator traits shared by the
//! extension pipeline.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{PlexusError, Result};
pub use traits::{Container, CustomRegistrar, Factory, ImplementationLoader};
pub use types::{
    Construction, ConstructorFn, ExtensionDefinition, Implementation, LoadedModule,
    PrioritySpec, ResolvedExtension, Service,
};
