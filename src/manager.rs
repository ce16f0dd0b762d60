//! Provider lifecycle control and named message dispatch.

use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use thiserror::Error ;

use crate::archive::Archive ;
use crate::component::{ ComponentHandle, InitError };
use crate::envelope::Envelope ;
use crate::host::PluginHost ;



/// Where a provider is in its lifecycle.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum ProviderState {
	/// Constructed, but `initialize` has not succeeded.
	Loaded,
	Initialized,
	Running,
	Stopped,
}

/// Errors from lifecycle operations. Unlike initialization and dispatch,
/// `start`/`stop` failures are not insulated per provider: the first failure
/// stops the sequence and propagates.
#[derive( Error, Debug )]
pub enum LifecycleError {
	#[error( "Provider '{0}' is poisoned by an earlier failure" )]
	PoisonedProvider( String ),
	#[error( "Provider '{0}' raised: {1}" )]
	ProviderException( String, wasmtime::Error ),
}

struct ProviderEntry {
	name: String,
	version: String,
	handle: ComponentHandle,
	state: ProviderState,
}

/// Owns the set of loaded protocol providers, in discovery order.
///
/// Membership changes only during [`adopt`]( Self::adopt ); every later
/// operation only reads the list. Name lookup returns the *first* provider
/// with a matching name, so discovery order decides ties.
pub struct ProviderManager {
	providers: Vec<ProviderEntry>,
}

impl ProviderManager {

	pub fn new() -> Self {
		Self { providers: Vec::new() }
	}

	/// Convenience constructor: [`new`]( Self::new ) + [`adopt`]( Self::adopt ).
	pub fn with_providers(
		components: Vec<ComponentHandle>,
		args: &[String],
		host: &PluginHost,
	) -> Self {
		let mut manager = Self::new();
		manager.adopt( components, args, host );
		manager
	}

	/// Takes ownership of the provider subset of `components` and initializes
	/// each in order.
	///
	/// Components that don't implement the provider contract are skipped. An
	/// `initialize` failing on a missing dependency triggers one fallback
	/// attempt: the extensions directory is searched for a
	/// `<providerName>_<version>` archive and initialization is repeated with
	/// dependency resolution scoped to that archive. If the fallback also
	/// fails, or no archive matches, the provider stays
	/// [`ProviderState::Loaded`] and the remaining providers continue — one
	/// bad provider never prevents the others from starting.
	pub fn adopt( &mut self, components: Vec<ComponentHandle>, args: &[String], host: &PluginHost ) {

		for handle in components {

			let ( name, version, is_provider ) = match handle.lock() {
				Ok( guard ) => ( guard.name().to_owned(), guard.version().to_owned(), guard.is_provider() ),
				Err( _ ) => {
					tracing::error!( "component lock poisoned; skipping" );
					continue ;
				},
			};
			if !is_provider {
				tracing::debug!( component = %name, "component is not a protocol provider" );
				continue ;
			}

			let mut entry = ProviderEntry { name, version, handle, state: ProviderState::Loaded };
			initialize_provider( &mut entry, args, host );
			self.providers.push( entry );

		}

	}

	pub fn len( &self ) -> usize { self.providers.len() }

	pub fn is_empty( &self ) -> bool { self.providers.is_empty() }

	/// Provider names, in discovery order.
	pub fn names( &self ) -> impl Iterator<Item = &str> {
		self.providers.iter().map( |entry| entry.name.as_str() )
	}

	/// Lifecycle state of the named provider.
	pub fn state( &self, name: &str ) -> Option<ProviderState> {
		self.providers.iter()
			.find( |entry| entry.name == name )
			.map( |entry| entry.state )
	}

	/// The first provider whose name equals `name`; `None` for an absent
	/// provider or an empty name.
	pub fn provider( &self, name: &str ) -> Option<ComponentHandle> {
		if name.is_empty() { return None }
		self.providers.iter()
			.find( |entry| entry.name == name )
			.map( |entry| Arc::clone( &entry.handle ))
	}

	/// Starts every provider in list order.
	///
	/// # Errors
	/// The first provider failure propagates; earlier providers stay running.
	pub fn start( &mut self ) -> Result<(), LifecycleError> {
		for entry in &mut self.providers {
			entry.handle.lock()
				.map_err( |_| LifecycleError::PoisonedProvider( entry.name.clone() ))?
				.start()
				.map_err( |err| LifecycleError::ProviderException( entry.name.clone(), err ))?;
			entry.state = ProviderState::Running ;
			tracing::info!( provider = %entry.name, "provider started" );
		}
		Ok(())
	}

	/// Stops every provider in list order. Safe to call repeatedly; a
	/// provider's own `stop` is responsible for idempotence.
	///
	/// # Errors
	/// Mirrors [`start`]( Self::start ): the first failure propagates.
	pub fn stop( &mut self ) -> Result<(), LifecycleError> {
		for entry in &mut self.providers {
			entry.handle.lock()
				.map_err( |_| LifecycleError::PoisonedProvider( entry.name.clone() ))?
				.stop()
				.map_err( |err| LifecycleError::ProviderException( entry.name.clone(), err ))?;
			entry.state = ProviderState::Stopped ;
			tracing::info!( provider = %entry.name, "provider stopped" );
		}
		Ok(())
	}

	/// Delivers `payload` to the named provider, wrapped in an [`Envelope`]
	/// carrying the call site of this invocation.
	///
	/// An unknown provider is a no-op; any failure during delivery is logged
	/// at this boundary and never surfaces to the caller.
	#[track_caller]
	pub fn dispatch( &self, name: &str, payload: serde_json::Value ) {
		let location = std::panic::Location::caller();
		self.deliver_envelope( "dispatch", name, payload, location );
	}

	/// Like [`dispatch`]( Self::dispatch ), with an explicit operation
	/// identity recorded in the envelope's provenance.
	#[track_caller]
	pub fn dispatch_as( &self, operation: &str, name: &str, payload: serde_json::Value ) {
		let location = std::panic::Location::caller();
		self.deliver_envelope( operation, name, payload, location );
	}

	fn deliver_envelope(
		&self,
		operation: &str,
		name: &str,
		payload: serde_json::Value,
		location: &std::panic::Location<'_>,
	) {

		let Some( handle ) = self.provider( name ) else {
			tracing::debug!( provider = name, "dispatch to unknown provider ignored" );
			return ;
		};

		let envelope = Envelope {
			payload,
			source_operation: operation.to_owned(),
			source_file: location.file().to_owned(),
			source_line: location.line(),
		};

		match handle.lock() {
			Ok( mut guard ) => {
				if let Err( err ) = guard.deliver( &envelope ) {
					tracing::error!( provider = name, error = %err, "message delivery failed" );
				}
			},
			Err( _ ) => tracing::error!( provider = name, "provider lock poisoned during dispatch" ),
		};

	}

}

impl Default for ProviderManager {
	fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for ProviderManager {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_list()
			.entries( self.providers.iter().map( |entry|
				( entry.name.as_str(), entry.version.as_str(), entry.state )))
			.finish()
	}
}

fn initialize_provider( entry: &mut ProviderEntry, args: &[String], host: &PluginHost ) {

	let result = match entry.handle.lock() {
		Ok( mut guard ) => guard.initialize( args ),
		Err( _ ) => {
			tracing::error!( provider = %entry.name, "provider lock poisoned before initialization" );
			return ;
		},
	};

	match result {
		Ok(()) => {
			entry.state = ProviderState::Initialized ;
			tracing::info!( provider = %entry.name, version = %entry.version, "provider initialized" );
		},
		Err( InitError::MissingDependency( module )) => {
			tracing::warn!(
				provider = %entry.name,
				missing = %module,
				"initialization failed on a missing dependency; attempting fallback resolution",
			);
			initialize_with_fallback( entry, args, host );
		},
		Err( err ) => tracing::error!( provider = %entry.name, error = %err, "provider initialization failed" ),
	}

}

/// One-shot fallback: repeat initialization with dependency resolution scoped
/// to the provider's conventional extensions archive. Not retried again.
fn initialize_with_fallback( entry: &mut ProviderEntry, args: &[String], host: &PluginHost ) {

	let options = host.options();
	let Some( archive_path ) = fallback_archive( options.extensions_dir(), &entry.name, options.archive_extension() ) else {
		tracing::error!(
			provider = %entry.name,
			dir = %options.extensions_dir().display(),
			"no fallback archive found; provider left uninitialized",
		);
		return ;
	};

	let mut archive = match Archive::open( &archive_path ) {
		Ok( archive ) => archive,
		Err( err ) => {
			tracing::error!( provider = %entry.name, archive = %archive_path.display(), error = %err, "failed to open fallback archive" );
			return ;
		},
	};

	let Ok( mut guard ) = entry.handle.lock() else {
		tracing::error!( provider = %entry.name, "provider lock poisoned before fallback" );
		return ;
	};
	if let Err( err ) = guard.relink( host.engine(), &mut archive, options.module_extension() ) {
		tracing::error!( provider = %entry.name, archive = %archive_path.display(), error = %err, "fallback relink failed; provider left uninitialized" );
		return ;
	}
	match guard.initialize( args ) {
		Ok(()) => {
			drop( guard );
			entry.state = ProviderState::Initialized ;
			tracing::info!( provider = %entry.name, archive = %archive_path.display(), "provider initialized via fallback archive" );
		},
		Err( err ) => tracing::error!( provider = %entry.name, error = %err, "fallback initialization failed; provider left uninitialized" ),
	}

}

/// First file in `dir` matching `<provider>_<anything>.<archive extension>`.
fn fallback_archive( dir: &Path, provider: &str, archive_extension: &str ) -> Option<PathBuf> {

	let prefix = format!( "{}_", provider );
	let suffix = format!( ".{}", archive_extension );

	std::fs::read_dir( dir ).ok()?
		.filter_map( Result::ok )
		.map( |entry| entry.path() )
		.find( |path| path.file_name()
			.and_then( std::ffi::OsStr::to_str )
			.is_some_and( |name| name.starts_with( &prefix ) && name.ends_with( &suffix )))

}
