use proto_link::{ HostOptions, PluginHost, ProviderManager };

use crate::fixture_archive ;

#[test]
fn lookup_matches_by_name_and_rejects_empty_names() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Bundle_1.0.0.zip", &[
		( "echo.wasm", fixture_archive::PROVIDER_WAT.as_bytes() ),
		( "flaky.wasm", fixture_archive::FLAKY_PROVIDER_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, failures ) = host.load_archive( &path );
	assert!( failures.is_empty(), "Unexpected failures: {:?}", failures );

	let manager = ProviderManager::with_providers( components, &[], &host );

	assert_eq!( manager.names().collect::<Vec<_>>(), [ "echo", "flaky" ]);
	assert!( manager.provider( "echo" ).is_some() );
	assert!( manager.provider( "missing" ).is_none() );
	assert!( manager.provider( "" ).is_none() );

}

#[test]
fn lookup_returns_the_live_component() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Echo_1.0.0.zip", &[
		( "echo.wasm", fixture_archive::PROVIDER_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, _ ) = host.load_archive( &path );

	let manager = ProviderManager::with_providers( components.clone(), &[], &host );
	let handle = manager.provider( "echo" ).expect( "Provider not found" );

	// The manager hands out the same instance the host loaded, not a copy.
	assert!( std::sync::Arc::ptr_eq( &handle, &components[ 0 ] ));

}
