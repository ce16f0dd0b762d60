use proto_link::{ HostOptions, PluginHost, ProviderManager, ProviderState };

use crate::fixture_archive ;

fn manager_for( archive: &str, entry: &str, wat: &str ) -> ( ProviderManager, tempfile::TempDir ) {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), archive, &[
		( entry, wat.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, failures ) = host.load_archive( &path );
	assert!( failures.is_empty(), "Unexpected failures: {:?}", failures );

	( ProviderManager::with_providers( components, &[], &host ), dir )

}

#[test]
fn dispatch_reaches_the_named_provider() {

	let ( mut manager, _dir ) = manager_for( "Echo_1.0.0.zip", "echo.wasm", fixture_archive::PROVIDER_WAT );
	manager.start().expect( "Start failed" );

	manager.dispatch( "echo", serde_json::json!({ "topic": "a/b", "value": 7 }));
	manager.dispatch_as( "relay", "echo", serde_json::json!( "payload" ));

}

#[test]
fn dispatch_to_an_unknown_provider_is_ignored() {

	let ( manager, _dir ) = manager_for( "Echo_1.0.0.zip", "echo.wasm", fixture_archive::PROVIDER_WAT );

	manager.dispatch( "ghost", serde_json::json!( null ));
	manager.dispatch( "", serde_json::json!( null ));

}

#[test]
fn a_delivery_failure_never_reaches_the_caller() {

	let ( manager, _dir ) = manager_for( "Flaky_0.0.1.zip", "flaky.wasm", fixture_archive::FLAKY_PROVIDER_WAT );
	assert_eq!( manager.state( "flaky" ), Some( ProviderState::Initialized ));

	// The guest traps on every delivery; the manager absorbs it each time.
	manager.dispatch( "flaky", serde_json::json!( 1 ));
	manager.dispatch( "flaky", serde_json::json!( 2 ));
	assert!( manager.provider( "flaky" ).is_some() );

}
