use wasmtime::{ Caller, Engine, Linker };



/// Store data for every loaded module: attribution for host-call logging.
#[derive( Debug, Clone )]
pub(crate) struct HostState {
	/// Entry name of the top-level module this store was created for.
	pub(crate) entry: String,
	/// Short name of the originating archive.
	pub(crate) archive: String,
}

macro_rules! declare_imports {
	(
		$linker_instance:expr,
		[
			$(( $module:literal, $name:literal, $function:expr )),*
			$(,)?
		]
	) => {
		vec![ $( $linker_instance.func_wrap( $module, $name, $function ).err() ),* ]
			.into_iter()
			.filter_map(|x| x)
			.collect::<Vec<_>>()
	};
}

/// Builds the linker every module is instantiated against, pre-loaded with
/// the `host` import surface. This surface is the manager reference handed to
/// providers: the way a running provider calls back into its host.
pub(crate) fn host_linker( engine: &Engine ) -> ( Linker<HostState>, Vec<wasmtime::Error> ) {

	let mut linker = Linker::new( engine );
	let linker_errors = declare_imports!( linker, [
		( "host", "log", host_log ),
	]);

	( linker, linker_errors )

}

/// `host.log( level, ptr, len )`: emits a guest message through the host's
/// logging surface. Levels: 0 error, 1 warn, 2 info, anything else debug.
fn host_log( mut caller: Caller<'_, HostState>, level: i32, ptr: u32, len: u32 ) {

	let message = read_guest_string( &mut caller, ptr, len )
		.unwrap_or_else( || "<unreadable guest message>".to_owned() );
	let entry = caller.data().entry.as_str();
	let archive = caller.data().archive.as_str();

	match level {
		0 => tracing::error!( archive, entry, "{}", message ),
		1 => tracing::warn!( archive, entry, "{}", message ),
		2 => tracing::info!( archive, entry, "{}", message ),
		_ => tracing::debug!( archive, entry, "{}", message ),
	}

}

fn read_guest_string( caller: &mut Caller<'_, HostState>, ptr: u32, len: u32 ) -> Option<String> {
	let memory = caller.get_export( "memory" )?.into_memory()?;
	let bytes = memory.data( &caller )
		.get( ptr as usize .. ( ptr as usize ).checked_add( len as usize )? )?;
	String::from_utf8( bytes.to_vec() ).ok()
}
