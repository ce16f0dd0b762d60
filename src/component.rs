//! Constructed components and the capability contract they expose.
//!
//! A module entry becomes a [`Component`] when it exports the base contract
//! (`name`, `version`); it is additionally a protocol provider when it exports
//! the lifecycle surface (`initialize`, `start`, `stop`, `deliver`). The host
//! exchanges strings and byte payloads with the guest through its exported
//! linear memory, using the `alloc` export for host→guest transfer and packed
//! pointer/length `i64` values (`ptr << 32 | len`) for guest→host hand-off.

use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex };
use thiserror::Error ;
use wasmtime::{ Engine, ExternType, Instance, Module, Store };

use crate::archive::Archive ;
use crate::envelope::Envelope ;
use crate::host::HostOptions ;
use crate::loading::{ HostState, LoadError, MissingDependency, ResolutionContext };
use crate::loading::{ host_linker, link_and_instantiate };



/// A component shared between the load cache and every caller that looked it
/// up: cloning the handle preserves instance identity, so provider state
/// accumulated through one handle is visible through all of them.
pub type ComponentHandle = Arc<Mutex<Component>>;

const MEMORY_EXPORT: &str = "memory" ;
const ALLOC_EXPORT: &str = "alloc" ;
const NAME_EXPORT: &str = "name" ;
const VERSION_EXPORT: &str = "version" ;
const RESOLVE_EXPORT: &str = "resolve" ;
const INITIALIZE_EXPORT: &str = "initialize" ;
const START_EXPORT: &str = "start" ;
const STOP_EXPORT: &str = "stop" ;
const DELIVER_EXPORT: &str = "deliver" ;

const PROVIDER_EXPORTS: [&str; 4] = [ INITIALIZE_EXPORT, START_EXPORT, STOP_EXPORT, DELIVER_EXPORT ];

/// Errors sending bytes into guest linear memory.
#[derive( Error, Debug )]
pub enum MemorySendError {
	#[error( "No or invalid alloc export: {0}" )] NoOrInvalidAllocExport( wasmtime::Error ),
	#[error( "Guest exception: {0}" )] GuestException( wasmtime::Error ),
	#[error( "Missing memory export: {0}" )] MissingMemoryExport( String ),
	#[error( "Memory access error: {0}" )] MemoryAccessError( #[from] wasmtime::MemoryAccessError ),
	#[error( "Data too large: {0}" )] DataTooLarge( #[from] std::num::TryFromIntError ),
}

/// Errors from a provider's `initialize` call.
#[derive( Error, Debug )]
pub enum InitError {
	/// A dependency module the host's loading path could not find. Drives the
	/// manager's fallback-resolution attempt.
	#[error( "Missing dependency: {0}" )] MissingDependency( String ),
	/// The provider itself reported failure with a non-zero code.
	#[error( "Provider rejected initialisation with code {0}" )] Rejected( i32 ),
	#[error( "Missing or invalid '{0}' export: {1}" )] MissingExport( &'static str, wasmtime::Error ),
	#[error( "Failed to encode arguments: {0}" )] EncodeArgs( serde_json::Error ),
	#[error( "Failed to send arguments to guest: {0}" )] MemorySend( MemorySendError ),
	#[error( "Runtime exception: {0}" )] RuntimeException( wasmtime::Error ),
}

/// Errors delivering an [`Envelope`] to a provider.
#[derive( Error, Debug )]
pub enum DeliveryError {
	#[error( "Failed to encode envelope: {0}" )] EncodeEnvelope( serde_json::Error ),
	#[error( "Missing or invalid 'deliver' export: {0}" )] MissingExport( wasmtime::Error ),
	#[error( "Failed to send envelope to guest: {0}" )] MemorySend( #[from] MemorySendError ),
	#[error( "Runtime exception: {0}" )] RuntimeException( wasmtime::Error ),
}

/// An instantiated module implementing the base capability contract.
///
/// Owned by the load cache once stored; before that, by the loader. The
/// compiled [`Module`] is kept so the manager's fallback path can re-link the
/// component against a different archive without recompiling.
pub struct Component {
	store: Store<HostState>,
	instance: Instance,
	module: Module,
	name: String,
	version: String,
	entry: String,
	archive_path: PathBuf,
}

impl Component {

	/// Constructs the component a module entry contains, or `None` when the
	/// entry does not export the component contract.
	pub(crate) fn load(
		engine: &Engine,
		archive: &mut Archive,
		entry: &str,
		bytes: &[u8],
		options: &HostOptions,
	) -> Result<Option<Self>, LoadError> {

		let module = Module::new( engine, bytes )
			.map_err( |err| LoadError::FailedToCompileModule( entry.to_owned(), err ))?;

		if !exports_component_contract( &module ) { return Ok( None ) }

		let mut store = Store::new( engine, HostState {
			entry: entry.to_owned(),
			archive: archive.short_name().to_owned(),
		});
		let ( mut linker, linker_errors ) = host_linker( engine );
		linker_errors.iter().for_each( |err| tracing::warn!( %err, "failed to define host import" ));

		let stem = entry_stem( entry, options.module_extension() );
		let mut ctx = ResolutionContext::new( archive, options.module_extension() );
		ctx.begin( &stem );
		let instance = link_and_instantiate( engine, &mut store, &mut linker, &module, &stem, &mut ctx )?;
		drop( ctx );

		let name = read_packed_string( &mut store, &instance, NAME_EXPORT )
			.map_err( |err| LoadError::FailedToDescribe( entry.to_owned(), err ))?;
		let version = read_packed_string( &mut store, &instance, VERSION_EXPORT )
			.map_err( |err| LoadError::FailedToDescribe( entry.to_owned(), err ))?;

		tracing::debug!( entry, %name, %version, "component constructed" );

		Ok( Some( Self {
			store,
			instance,
			module,
			name,
			version,
			entry: entry.to_owned(),
			archive_path: archive.path().to_path_buf(),
		}))

	}

	pub fn name( &self ) -> &str { &self.name }

	pub fn version( &self ) -> &str { &self.version }

	/// Entry name this component was constructed from.
	pub fn entry( &self ) -> &str { &self.entry }

	/// Path of the archive this component was extracted from.
	pub fn archive_path( &self ) -> &Path { &self.archive_path }

	/// Whether this component also implements the protocol-provider contract.
	pub fn is_provider( &self ) -> bool {
		PROVIDER_EXPORTS.iter().all( |export|
			matches!( self.module.get_export( export ), Some( ExternType::Func( _ ))))
	}

	/// Asks the component to act as a fallback resolver for `requested`.
	///
	/// Components may export `resolve` to answer module-byte requests
	/// themselves. Absence of the export, a guest failure, or a zero return
	/// all report "not found"; guest failures are logged, never propagated.
	pub fn resolve( &mut self, requested: &str ) -> Option<Vec<u8>> {

		self.module.get_export( RESOLVE_EXPORT )?;

		let segment = match self.send_bytes( requested.as_bytes() ) {
			Ok( segment ) => segment,
			Err( err ) => {
				tracing::warn!( component = %self.name, error = %err, "failed to send resolution request" );
				return None ;
			},
		};
		let packed = match self.instance
			.get_typed_func::<( u32, u32 ), i64>( &mut self.store, RESOLVE_EXPORT )
			.and_then( |resolve| resolve.call( &mut self.store, segment ))
		{
			Ok( packed ) => packed,
			Err( err ) => {
				tracing::warn!( component = %self.name, error = %err, "component resolver failed" );
				return None ;
			},
		};
		if packed == 0 { return None }

		let ( offset, size ) = unpack_segment( packed );
		let memory = self.instance.get_memory( &mut self.store, MEMORY_EXPORT )?;
		memory.data( &self.store )
			.get( offset .. offset.checked_add( size )? )
			.map( <[u8]>::to_vec )

	}

	/// Calls the provider's `initialize` export with a JSON-encoded argument
	/// list. A trap caused by a stubbed import is reported as
	/// [`InitError::MissingDependency`] so the caller can attempt fallback
	/// resolution.
	pub fn initialize( &mut self, args: &[String] ) -> Result<(), InitError> {

		let encoded = serde_json::to_vec( args ).map_err( InitError::EncodeArgs )?;
		let segment = self.send_bytes( &encoded ).map_err( InitError::MemorySend )?;

		let initialize = self.instance
			.get_typed_func::<( u32, u32 ), i32>( &mut self.store, INITIALIZE_EXPORT )
			.map_err( |err| InitError::MissingExport( INITIALIZE_EXPORT, err ))?;

		match initialize.call( &mut self.store, segment ) {
			Ok( 0 ) => Ok(()),
			Ok( code ) => Err( InitError::Rejected( code )),
			Err( err ) => match missing_dependency( &err ) {
				Some( module ) => Err( InitError::MissingDependency( module )),
				None => Err( InitError::RuntimeException( err )),
			},
		}

	}

	pub fn start( &mut self ) -> Result<(), wasmtime::Error> {
		self.instance
			.get_typed_func::<(), ()>( &mut self.store, START_EXPORT )?
			.call( &mut self.store, () )
	}

	pub fn stop( &mut self ) -> Result<(), wasmtime::Error> {
		self.instance
			.get_typed_func::<(), ()>( &mut self.store, STOP_EXPORT )?
			.call( &mut self.store, () )
	}

	/// Delivers a JSON-encoded [`Envelope`] to the provider's `deliver` export.
	pub fn deliver( &mut self, envelope: &Envelope ) -> Result<(), DeliveryError> {
		let encoded = serde_json::to_vec( envelope ).map_err( DeliveryError::EncodeEnvelope )?;
		let segment = self.send_bytes( &encoded )?;
		self.instance
			.get_typed_func::<( u32, u32 ), ()>( &mut self.store, DELIVER_EXPORT )
			.map_err( DeliveryError::MissingExport )?
			.call( &mut self.store, segment )
			.map_err( DeliveryError::RuntimeException )
	}

	/// Re-instantiates the component with dependency resolution scoped to a
	/// different archive, replacing the instance in place so cached handles
	/// keep pointing at the same component.
	pub(crate) fn relink(
		&mut self,
		engine: &Engine,
		archive: &mut Archive,
		module_extension: &str,
	) -> Result<(), LoadError> {

		let mut store = Store::new( engine, self.store.data().clone() );
		let ( mut linker, linker_errors ) = host_linker( engine );
		linker_errors.iter().for_each( |err| tracing::warn!( %err, "failed to define host import" ));

		let stem = entry_stem( &self.entry, module_extension );
		let mut ctx = ResolutionContext::new( archive, module_extension );
		ctx.begin( &stem );
		let instance = link_and_instantiate( engine, &mut store, &mut linker, &self.module, &stem, &mut ctx )?;
		drop( ctx );

		self.store = store ;
		self.instance = instance ;
		Ok(())

	}

	/// Allocates guest memory via the `alloc` export and writes `data` into
	/// it, returning the (pointer, length) pair to pass on.
	fn send_bytes( &mut self, data: &[u8] ) -> Result<( u32, u32 ), MemorySendError> {

		let size = u32::try_from( data.len() )?;
		let offset = self.instance
			.get_typed_func::<u32, u32>( &mut self.store, ALLOC_EXPORT )
			.map_err( MemorySendError::NoOrInvalidAllocExport )?
			.call( &mut self.store, size )
			.map_err( MemorySendError::GuestException )?;

		self.instance.get_memory( &mut self.store, MEMORY_EXPORT )
			.ok_or_else( || MemorySendError::MissingMemoryExport( MEMORY_EXPORT.to_owned() ))?
			.write( &mut self.store, offset as usize, data )?;

		Ok(( offset, size ))

	}

}

impl std::fmt::Debug for Component {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Component" )
			.field( "name", &self.name )
			.field( "version", &self.version )
			.field( "entry", &self.entry )
			.field( "archive_path", &self.archive_path )
			.field( "is_provider", &self.is_provider() )
			.finish_non_exhaustive()
	}
}

fn exports_component_contract( module: &Module ) -> bool {
	matches!( module.get_export( NAME_EXPORT ), Some( ExternType::Func( _ )))
		&& matches!( module.get_export( VERSION_EXPORT ), Some( ExternType::Func( _ )))
}

/// File-name portion of an entry, minus the module extension. Used as the
/// module's import name inside its archive.
fn entry_stem( entry: &str, module_extension: &str ) -> String {
	let file_name = entry.rsplit( '/' ).next().unwrap_or( entry );
	file_name
		.strip_suffix( &format!( ".{}", module_extension ))
		.unwrap_or( file_name )
		.to_owned()
}

fn missing_dependency( err: &wasmtime::Error ) -> Option<String> {
	err.chain()
		.find_map( |cause| cause.downcast_ref::<MissingDependency>() )
		.map( |missing| missing.0.clone() )
}

fn read_packed_string(
	store: &mut Store<HostState>,
	instance: &Instance,
	export: &str,
) -> Result<String, wasmtime::Error> {

	let packed = instance
		.get_typed_func::<(), i64>( &mut *store, export )?
		.call( &mut *store, () )?;
	let ( offset, size ) = unpack_segment( packed );

	let memory = instance.get_memory( &mut *store, MEMORY_EXPORT )
		.ok_or_else( || wasmtime::Error::msg( format!( "missing '{}' export", MEMORY_EXPORT )))?;
	let bytes = memory.data( &store )
		.get( offset .. offset.checked_add( size ).unwrap_or( usize::MAX ))
		.ok_or_else( || wasmtime::Error::msg( format!( "'{}' returned an out-of-bounds segment", export )))?;

	String::from_utf8( bytes.to_vec() ).map_err( wasmtime::Error::new )

}

#[allow( clippy::cast_possible_truncation, clippy::cast_sign_loss )]
fn unpack_segment( packed: i64 ) -> ( usize, usize ) {
	((( packed as u64 ) >> 32 ) as usize, (( packed as u64 ) & 0xFFFF_FFFF ) as usize )
}
