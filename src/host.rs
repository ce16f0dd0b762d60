//! The load pipeline owner: catalog → loader → cache.

use std::path::Path ;
use std::path::PathBuf ;
use std::sync::Arc ;
use wasmtime::Engine ;

use crate::archive::Archive ;
use crate::cache::LoadCache ;
use crate::catalog::catalog ;
use crate::component::ComponentHandle ;
use crate::loading::{ LoadError, load_archive_entries, log_failure };
use crate::utils::PartialSuccess ;



/// Host configuration: naming conventions and the fallback search directory.
#[derive( Debug, Clone )]
pub struct HostOptions {
	module_extension: String,
	archive_extension: String,
	extensions_dir: PathBuf,
}

impl Default for HostOptions {
	fn default() -> Self {
		Self {
			module_extension: "wasm".to_owned(),
			archive_extension: "zip".to_owned(),
			extensions_dir: PathBuf::from( "extensions" ),
		}
	}
}

impl HostOptions {

	pub fn new() -> Self { Self::default() }

	/// Sets the extension (without dot) identifying module entries inside an
	/// archive.
	pub fn with_module_extension( mut self, extension: impl Into<String> ) -> Self {
		self.module_extension = extension.into();
		self
	}

	/// Sets the extension (without dot) identifying provider archives.
	pub fn with_archive_extension( mut self, extension: impl Into<String> ) -> Self {
		self.archive_extension = extension.into();
		self
	}

	/// Sets the directory searched for `<name>_<version>` fallback archives
	/// during provider initialization.
	pub fn with_extensions_dir( mut self, dir: impl Into<PathBuf> ) -> Self {
		self.extensions_dir = dir.into();
		self
	}

	pub fn module_extension( &self ) -> &str { &self.module_extension }

	pub fn archive_extension( &self ) -> &str { &self.archive_extension }

	pub fn extensions_dir( &self ) -> &Path { &self.extensions_dir }

}

/// Owns the engine, the load cache, and the host configuration.
///
/// All load operations are synchronous and must be serialized by the caller;
/// starting a second load while one is in flight is outside the contract.
/// After the discovery/load phase the cache and any handed-out components are
/// only read, so lifecycle and dispatch operations race with nothing.
pub struct PluginHost {
	engine: Engine,
	cache: LoadCache,
	options: HostOptions,
}

impl PluginHost {

	pub fn new( options: HostOptions ) -> Self {
		Self::with_engine( Engine::default(), options )
	}

	/// Uses a caller-configured engine. Options that change how modules are
	/// interacted with (e.g. fuel) are managed by the host and may not be
	/// compatible.
	pub fn with_engine( engine: Engine, options: HostOptions ) -> Self {
		Self { engine, cache: LoadCache::new(), options }
	}

	pub fn engine( &self ) -> &Engine { &self.engine }

	pub fn options( &self ) -> &HostOptions { &self.options }

	/// Discovers and loads every component reachable from `path`: a single
	/// archive, or a directory of archives.
	///
	/// Failures are contained per archive and per entry — a bad archive never
	/// prevents its siblings from loading — and are returned alongside the
	/// components after being logged.
	pub fn load_path( &mut self, path: impl AsRef<Path> ) -> PartialSuccess<Vec<ComponentHandle>, LoadError> {

		let path = path.as_ref();
		let archives = catalog( path, &self.options.archive_extension );
		tracing::info!( path = %path.display(), archives = archives.len(), "scanning for provider archives" );

		let mut components = Vec::new();
		let mut failures = Vec::new();
		for archive_path in archives {
			let ( mut found, mut errors ) = self.load_archive( &archive_path );
			components.append( &mut found );
			failures.append( &mut errors );
		}

		( components, failures )

	}

	/// Loads one archive, short-circuiting through the cache.
	///
	/// A cache hit returns the previously constructed component handles in
	/// their original order; a miss processes the archive and stores the
	/// result, partial failures included.
	pub fn load_archive( &mut self, path: &Path ) -> PartialSuccess<Vec<ComponentHandle>, LoadError> {

		let short_name = path.file_stem()
			.map( |stem| stem.to_string_lossy().into_owned() )
			.unwrap_or_default();

		if let Some( cached ) = self.cache.get( &short_name ) {
			tracing::info!( archive = %path.display(), "serving components from cache" );
			let handles = cached.iter().map( |( _, handle )| Arc::clone( handle )).collect();
			return ( handles, Vec::new() );
		}

		let mut archive = match Archive::open( path ) {
			Ok( archive ) => archive,
			Err( err ) => {
				let failure = LoadError::FailedToOpenArchive( path.to_path_buf(), err );
				log_failure( path, &failure );
				return ( Vec::with_capacity( 0 ), vec![ failure ] );
			},
		};

		let ( pairs, failures ) = load_archive_entries( &self.engine, &mut archive, &self.options );
		tracing::info!(
			archive = %path.display(),
			components = pairs.len(),
			failures = failures.len(),
			"archive processed",
		);

		let handles = pairs.iter().map( |( _, handle )| Arc::clone( handle )).collect();
		self.cache.insert( short_name, pairs );

		( handles, failures )

	}

}

impl std::fmt::Debug for PluginHost {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "PluginHost" )
			.field( "options", &self.options )
			.field( "cache", &self.cache )
			.finish_non_exhaustive()
	}
}
