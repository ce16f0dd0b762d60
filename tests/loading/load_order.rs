use proto_link::{ HostOptions, PluginHost };

use crate::fixture_archive ;

#[test]
fn components_come_back_in_archive_order() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );

	// Insertion order deliberately disagrees with alphabetical entry order.
	let path = fixture_archive::build_archive( dir.path(), "Bundle_1.0.0.zip", &[
		( "zeta.wasm", fixture_archive::PROVIDER_WAT.as_bytes() ),
		( "alpha.wasm", fixture_archive::COMPONENT_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, failures ) = host.load_archive( &path );
	assert!( failures.is_empty(), "Unexpected failures: {:?}", failures );

	let names = components.iter()
		.map( fixture_archive::component_name )
		.collect::<Vec<_>>();
	assert_eq!( names, [ "echo", "plain" ]);

}

#[test]
fn cached_loads_preserve_the_original_order() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Bundle_1.0.0.zip", &[
		( "zeta.wasm", fixture_archive::PROVIDER_WAT.as_bytes() ),
		( "alpha.wasm", fixture_archive::COMPONENT_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( first, _ ) = host.load_archive( &path );
	let ( second, _ ) = host.load_archive( &path );

	let order = |components: &[ proto_link::ComponentHandle ]| components.iter()
		.map( fixture_archive::component_name )
		.collect::<Vec<_>>();
	assert_eq!( order( &first ), order( &second ));

}
