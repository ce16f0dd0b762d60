//! Module loading, linking, and in-archive dependency resolution.
//!
//! This module turns one open [`Archive`]( crate::Archive ) into constructed
//! [`Component`]( crate::Component )s. The loading process, per module entry:
//!
//! 1. Compiles the entry's bytes into a wasmtime [`Module`]( wasmtime::Module )
//! 2. Satisfies the module's imports from the archive being loaded, through a
//!    [`ResolutionContext`] scoped to exactly that load
//! 3. Stubs any still-unresolved function import with a host function that
//!    fails with [`MissingDependency`] when first called
//! 4. Instantiates the module and inspects its exports for the component
//!    contract
//!
//! A failing entry never aborts its archive: the failure is logged with the
//! entry's full path, one line per underlying cause, and loading continues.

mod load_error ;
mod resolver ;
mod host_imports ;
mod instantiate ;
mod load_archive ;

pub use load_error::{ LoadError, MissingDependency };
pub(crate) use resolver::ResolutionContext ;
pub(crate) use host_imports::{ HostState, host_linker };
pub(crate) use instantiate::link_and_instantiate ;
pub(crate) use load_archive::{ load_archive_entries, log_failure };
