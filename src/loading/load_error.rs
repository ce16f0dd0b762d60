use std::path::PathBuf ;
use thiserror::Error ;

use crate::archive::ArchiveError ;



/// Errors that can occur while loading modules from an archive.
///
/// Loading attempts to proceed gracefully, collecting errors and constructing
/// as many components as possible. These errors are returned alongside the
/// successful components via [`PartialSuccess`]( crate::PartialSuccess ) and
/// are never fatal to the archive batch.
#[derive( Error, Debug )]
pub enum LoadError {

	/// The archive itself could not be opened or enumerated.
	#[error( "Failed to open archive '{0}': {1}" )]
	FailedToOpenArchive( PathBuf, ArchiveError ),

	/// An entry listed by the archive could not be read back.
	#[error( "Failed to read entry '{0}': {1}" )]
	FailedToReadEntry( String, ArchiveError ),

	/// Wasmtime failed to compile the entry's bytes (invalid binary or
	/// unsupported features).
	#[error( "Failed to compile module '{0}': {1}" )]
	FailedToCompileModule( String, wasmtime::Error ),

	/// A resolved dependency instance could not be defined into the linker.
	#[error( "Failed to link dependency '{0}': {1}" )]
	FailedToLinkDependency( String, wasmtime::Error ),

	/// Instantiation failed (an unresolvable non-function import, a failing
	/// start function, or a resource limit).
	#[error( "Failed to instantiate module '{0}': {1}" )]
	FailedToInstantiate( String, wasmtime::Error ),

	/// The module looked like a component but its `name`/`version` exports
	/// could not be called.
	#[error( "Failed to describe component '{0}': {1}" )]
	FailedToDescribe( String, wasmtime::Error ),

	/// A dependency cycle was detected inside the archive. Cycles are
	/// forbidden; the offending request resolves as "not found".
	#[error( "Loop detected loading '{0}'" )]
	LoopDetected( String ),

}

impl LoadError {

	/// The wasmtime error chain behind this failure, when there is one.
	pub(crate) fn runtime_cause( &self ) -> Option<&wasmtime::Error> {
		match self {
			Self::FailedToCompileModule( _, err )
			| Self::FailedToLinkDependency( _, err )
			| Self::FailedToInstantiate( _, err )
			| Self::FailedToDescribe( _, err ) => Some( err ),
			_ => None,
		}
	}

}

/// A module import that neither the host's loading path nor the archive
/// resolver could satisfy.
///
/// Stubbed imports fail with this error when first called, so a missing
/// dependency surfaces on the lifecycle call that needs it — typically
/// `initialize` — rather than at instantiation. The manager recovers it by
/// error-chain downcast to drive fallback resolution.
#[derive( Error, Debug, Clone )]
#[error( "Missing dependency module '{0}'" )]
pub struct MissingDependency( pub String );
