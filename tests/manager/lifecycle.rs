use proto_link::{ HostOptions, PluginHost, ProviderManager, ProviderState };

use crate::fixture_archive ;

#[test]
fn providers_run_through_the_full_lifecycle() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Bundle_1.0.0.zip", &[
		( "echo.wasm", fixture_archive::PROVIDER_WAT.as_bytes() ),
		( "plain.wasm", fixture_archive::COMPONENT_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, failures ) = host.load_archive( &path );
	assert!( failures.is_empty(), "Unexpected failures: {:?}", failures );
	assert_eq!( components.len(), 2 );

	let mut manager = ProviderManager::with_providers(
		components,
		&[ "config=default".to_owned() ],
		&host,
	);

	// Only the provider is adopted; the plain component is left alone.
	assert_eq!( manager.len(), 1 );
	assert_eq!( manager.state( "echo" ), Some( ProviderState::Initialized ));

	manager.start().expect( "Start failed" );
	assert_eq!( manager.state( "echo" ), Some( ProviderState::Running ));

	manager.stop().expect( "Stop failed" );
	assert_eq!( manager.state( "echo" ), Some( ProviderState::Stopped ));

}

#[test]
fn an_empty_manager_starts_and_stops_trivially() {
	let mut manager = ProviderManager::new();
	assert!( manager.is_empty() );
	manager.start().expect( "Start failed" );
	manager.stop().expect( "Stop failed" );
}
