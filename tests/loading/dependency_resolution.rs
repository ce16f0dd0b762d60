use proto_link::{ HostOptions, InitError, PluginHost };

use crate::fixture_archive ;

#[test]
fn imports_are_resolved_from_sibling_entries() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Needy_0.1.0.zip", &[
		( "needy.wasm", fixture_archive::NEEDY_PROVIDER_WAT.as_bytes() ),
		( "mathlib.wasm", fixture_archive::MATHLIB_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, failures ) = host.load_archive( &path );
	assert!( failures.is_empty(), "Unexpected failures: {:?}", failures );

	// The dependency module is linkable but not a component itself.
	assert_eq!( components.len(), 1 );

	// `initialize` calls through the resolved import; success proves the
	// sibling entry actually backs it.
	components[ 0 ].lock().expect( "Component lock poisoned" )
		.initialize( &[] )
		.expect( "Initialisation failed" );

}

#[test]
fn an_unsatisfied_import_surfaces_at_initialize() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Needy_0.1.0.zip", &[
		( "needy.wasm", fixture_archive::NEEDY_PROVIDER_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, failures ) = host.load_archive( &path );

	// Loading still succeeds: the missing import is stubbed, not fatal.
	assert!( failures.is_empty(), "Unexpected failures: {:?}", failures );
	assert_eq!( components.len(), 1 );

	let result = components[ 0 ].lock().expect( "Component lock poisoned" )
		.initialize( &[] );
	match result {
		Err( InitError::MissingDependency( module )) => assert_eq!( module, "mathlib" ),
		other => panic!( "Unexpected result: {:?}", other ),
	}

}
