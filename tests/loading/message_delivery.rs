use proto_link::{ DeliveryError, Envelope, HostOptions, PluginHost };

use crate::fixture_archive ;

fn envelope() -> Envelope {
	Envelope {
		payload: serde_json::json!({ "topic": "a/b", "value": 7 }),
		source_operation: "test".to_owned(),
		source_file: file!().to_owned(),
		source_line: line!(),
	}
}

#[test]
fn a_provider_accepts_an_envelope() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Echo_1.0.0.zip", &[
		( "echo.wasm", fixture_archive::PROVIDER_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, _ ) = host.load_archive( &path );

	let mut component = components[ 0 ].lock().expect( "Component lock poisoned" );
	assert!( component.is_provider() );
	component.deliver( &envelope() ).expect( "Delivery failed" );

}

#[test]
fn a_guest_trap_is_a_runtime_exception() {

	let dir = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = fixture_archive::build_archive( dir.path(), "Flaky_0.0.1.zip", &[
		( "flaky.wasm", fixture_archive::FLAKY_PROVIDER_WAT.as_bytes() ),
	]);

	let mut host = PluginHost::new( HostOptions::new() );
	let ( components, _ ) = host.load_archive( &path );

	let result = components[ 0 ].lock().expect( "Component lock poisoned" )
		.deliver( &envelope() );
	match result {
		Err( DeliveryError::RuntimeException( _ )) => {},
		other => panic!( "Unexpected result: {:?}", other ),
	}

}
