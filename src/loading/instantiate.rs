use std::collections::HashSet ;
use wasmtime::{ Caller, Engine, ExternType, Instance, Linker, Module, Store, Val };

use super::{ HostState, LoadError, MissingDependency, ResolutionContext };
use super::load_archive::log_failure ;



/// Links `module`'s imports and instantiates it into `store`.
///
/// Imports are satisfied in three tiers: definitions already in the linker
/// (the host's normal loading path), entries of the archive named by `ctx`
/// (recursively instantiated into the same store and defined under the
/// imported module name), and finally trap stubs carrying
/// [`MissingDependency`] for function imports nothing could satisfy.
/// Unresolvable non-function imports are left undefined so instantiation
/// reports them.
pub(crate) fn link_and_instantiate(
	engine: &Engine,
	store: &mut Store<HostState>,
	linker: &mut Linker<HostState>,
	module: &Module,
	module_name: &str,
	ctx: &mut ResolutionContext<'_>,
) -> Result<Instance, LoadError> {

	let imports = module.imports()
		.map( |import| ( import.module().to_owned(), import.name().to_owned(), import.ty() ))
		.collect::<Vec<_>>();

	let mut attempted = HashSet::new();

	for ( import_module, import_name, import_type ) in &imports {

		if linker.get( &mut *store, import_module, import_name ).is_some() { continue }

		if attempted.insert( import_module.clone() ) {
			resolve_dependency( engine, store, linker, import_module, ctx );
		}
		if linker.get( &mut *store, import_module, import_name ).is_some() { continue }

		if let ExternType::Func( func_type ) = import_type {
			let missing = import_module.clone();
			linker
				.func_new( import_module, import_name, func_type.clone(),
					move |_caller: Caller<'_, HostState>, _params: &[Val], _results: &mut [Val]| {
						Err( MissingDependency( missing.clone() ).into() )
					})
				.map_err( |err| LoadError::FailedToLinkDependency( import_module.clone(), err ))?;
		}

	}

	linker.instantiate( &mut *store, module )
		.map_err( |err| LoadError::FailedToInstantiate( module_name.to_owned(), err ))

}

/// Attempts to satisfy one imported module name from the archive being
/// loaded. Failures during this secondary load are logged exactly like
/// primary entry failures and the import is left unresolved — resolution
/// reports "not found" rather than propagating the error.
fn resolve_dependency(
	engine: &Engine,
	store: &mut Store<HostState>,
	linker: &mut Linker<HostState>,
	module_name: &str,
	ctx: &mut ResolutionContext<'_>,
) {

	let Some( bytes ) = ctx.resolve( module_name ) else { return };

	if !ctx.begin( module_name ) {
		log_failure( ctx.archive_path(), &LoadError::LoopDetected( module_name.to_owned() ));
		return ;
	}
	let instantiated = Module::new( engine, &bytes )
		.map_err( |err| LoadError::FailedToCompileModule( module_name.to_owned(), err ))
		.and_then( |module| link_and_instantiate( engine, store, linker, &module, module_name, ctx ));
	ctx.end( module_name );

	match instantiated {
		Ok( instance ) => {
			if let Err( err ) = linker.instance( &mut *store, module_name, instance ) {
				log_failure( ctx.archive_path(), &LoadError::FailedToLinkDependency( module_name.to_owned(), err ));
			}
		},
		Err( err ) => log_failure( ctx.archive_path(), &err ),
	}

}
