use proto_link::{ HostOptions, PluginHost };

use crate::fixture_archive ;

#[test]
fn a_dependency_cycle_is_broken_not_fatal() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Cyclic_1.0.0.zip", &[
		( "alpha.wasm", fixture_archive::ALPHA_WAT.as_bytes() ),
		( "beta.wasm", fixture_archive::BETA_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, failures ) = host.load_archive( &path );

	// The back edge of the cycle resolves as "not found" and gets stubbed;
	// both entries still load as components.
	assert!( failures.is_empty(), "Unexpected failures: {:?}", failures );
	let names = components.iter()
		.map( fixture_archive::component_name )
		.collect::<Vec<_>>();
	assert_eq!( names, [ "alpha", "beta" ]);

}
