use proto_link::{ HostOptions, PluginHost, ProviderManager, ProviderState };

use crate::fixture_archive ;

#[test]
fn an_unmatched_fallback_leaves_the_provider_loaded() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let extensions = dir.path().join( "extensions" );
	std::fs::create_dir( &extensions ).expect( "Failed to create extensions dir" );

	// The extensions directory exists but only holds an archive for a
	// different provider, so the fallback finds nothing.
	let path = fixture_archive::build_archive( dir.path(), "Needy_0.1.0.zip", &[
		( "needy.wasm", fixture_archive::NEEDY_PROVIDER_WAT.as_bytes() ),
	]);
	fixture_archive::build_archive( &extensions, "other_1.0.0.zip", &[
		( "mathlib.wasm", fixture_archive::MATHLIB_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new().with_extensions_dir( &extensions ));
	let ( components, _ ) = host.load_archive( &path );

	let manager = ProviderManager::with_providers( components, &[], &host );

	// Still adopted and addressable, just never initialized.
	assert_eq!( manager.len(), 1 );
	assert_eq!( manager.state( "needy" ), Some( ProviderState::Loaded ));
	assert!( manager.provider( "needy" ).is_some() );

}

#[test]
fn a_healthy_provider_outlives_a_broken_sibling() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Bundle_1.0.0.zip", &[
		( "needy.wasm", fixture_archive::NEEDY_PROVIDER_WAT.as_bytes() ),
		( "echo.wasm", fixture_archive::PROVIDER_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new()
		.with_extensions_dir( dir.path().join( "no-such-dir" )));
	let ( components, failures ) = host.load_archive( &path );
	assert!( failures.is_empty(), "Unexpected failures: {:?}", failures );

	let manager = ProviderManager::with_providers( components, &[], &host );

	assert_eq!( manager.state( "needy" ), Some( ProviderState::Loaded ));
	assert_eq!( manager.state( "echo" ), Some( ProviderState::Initialized ));

}
