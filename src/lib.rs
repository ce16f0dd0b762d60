//! A WebAssembly plugin host for protocol providers packaged in zip archives.
//!
//! Providers are WASM core modules carried inside archives. `proto_link`
//! discovers archives on disk, extracts the modules that implement the
//! component contract, resolves their imports against sibling entries of the
//! same archive, and drives the surviving providers through a common
//! lifecycle with named message dispatch.
//!
//! # Core Concepts
//!
//! - [`PluginHost`]: Owns the wasmtime [`Engine`], the load cache, and the
//! 	naming conventions ([`HostOptions`]). Loading the same archive twice
//! 	returns the *same* component handles, so provider state accumulated
//! 	between lookups is shared.
//!
//! - [`Component`]: An instantiated module exporting the base contract
//! 	(`name`, `version`). Handed out as a [`ComponentHandle`] — a shared,
//! 	lock-guarded reference whose clones all point at one instance.
//!
//! - **Provider**: A component that additionally exports the lifecycle
//! 	surface (`initialize`, `start`, `stop`, `deliver`). Non-provider
//! 	components load fine; they are simply never adopted by the manager.
//!
//! - [`ProviderManager`]: Adopts the provider subset of a load, initializes
//! 	each one (with a fallback pass through the extensions directory when a
//! 	dependency is missing), starts and stops them in order, and delivers
//! 	[`Envelope`]-wrapped JSON payloads by provider name.
//!
//! - **Dependency resolution**: A module's unsatisfied imports are looked up
//! 	as sibling entries of the archive being loaded, recursively and with
//! 	cycle detection. Imports nothing can satisfy are stubbed to fail on
//! 	first call, so a missing dependency surfaces at `initialize` time —
//! 	where the manager can still do something about it — instead of
//! 	failing the whole load.
//!
//! Loading is a batch operation that degrades gracefully: every fallible step
//! is contained per archive and per entry, and failures come back alongside
//! the successes as a [`PartialSuccess`].
//!
//! # Example
//!
//! ```no_run
//! use proto_link::{ HostOptions, PluginHost, ProviderManager };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut host = PluginHost::new( HostOptions::new()
//! 	.with_extensions_dir( "extensions" ));
//!
//! // Load every archive under ./plugins. Failures are logged and returned,
//! // but never abort the batch.
//! let ( components, failures ) = host.load_path( "plugins" );
//! for failure in &failures {
//! 	eprintln!( "load failure: {}", failure );
//! }
//!
//! // Adopt the providers and run them. Initialization failures are contained
//! // per provider; start/stop failures propagate.
//! let mut manager = ProviderManager::with_providers( components, &[], &host );
//! manager.start()?;
//!
//! manager.dispatch( "mqtt", serde_json::json!({ "topic": "a/b", "value": 7 }));
//!
//! manager.stop()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Guest ABI
//!
//! The host speaks to guests through plain core-module exports, no component
//! model or interface types required:
//!
//! - `memory`: the exported linear memory all transfers go through
//! - `alloc( size: i32 ) -> i32`: host→guest allocation for argument buffers
//! - `name() -> i64`, `version() -> i64`: packed `ptr << 32 | len` segments
//! 	describing UTF-8 strings in linear memory
//! - `initialize( ptr, len ) -> i32` (0 = accepted), `start()`, `stop()`,
//! 	`deliver( ptr, len )`: the provider lifecycle; `initialize` receives a
//! 	JSON argument list and `deliver` a JSON [`Envelope`]
//! - `resolve( ptr, len ) -> i64` (optional): lets a component answer
//! 	module-byte requests for names the archive itself cannot satisfy
//!
//! Guests may import `host.log( level, ptr, len )` to write through the
//! host's logging surface.

mod archive ;
mod cache ;
mod catalog ;
mod component ;
mod envelope ;
mod host ;
mod loading ;
mod manager ;
pub mod utils ;

#[doc( no_inline )]
pub use wasmtime::Engine ;

pub use archive::{ Archive, ArchiveError };
pub use catalog::catalog ;
pub use component::{ Component, ComponentHandle, DeliveryError, InitError, MemorySendError };
pub use envelope::Envelope ;
pub use host::{ HostOptions, PluginHost };
pub use loading::{ LoadError, MissingDependency };
pub use manager::{ LifecycleError, ProviderManager, ProviderState };
pub use utils::{ PartialSuccess, ResultList };
