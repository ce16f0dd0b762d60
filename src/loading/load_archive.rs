use std::path::Path ;
use std::sync::{ Arc, Mutex };
use wasmtime::Engine ;

use crate::archive::Archive ;
use crate::component::{ Component, ComponentHandle };
use crate::host::HostOptions ;
use crate::utils::{ PartialSuccess, ResultList };
use super::LoadError ;



/// Loads every component an open archive contains.
///
/// Module entries are processed in archive enumeration order, which is also
/// the order of the returned pairs — and therefore the order the manager will
/// see providers in, which matters for "first provider of a given name wins".
/// Entries that fail are collected and logged; the rest of the archive still
/// loads.
pub(crate) fn load_archive_entries(
	engine: &Engine,
	archive: &mut Archive,
	options: &HostOptions,
) -> PartialSuccess<Vec<( String, ComponentHandle )>, LoadError> {

	let entries = archive.module_entries( options.module_extension() );
	let total = entries.len();

	let ( loaded, failures ) = entries.into_iter().enumerate()
		.map( |( index, entry )| {
			tracing::debug!(
				archive = %archive.short_name(),
				entry = %entry,
				position = index + 1,
				total,
				"loading module entry",
			);
			load_entry( engine, archive, &entry, options )
		})
		.collect::<ResultList<_, _>>()
		.deconstruct();

	failures.iter().for_each( |failure| log_failure( archive.path(), failure ));

	( loaded.into_iter().flatten().collect(), failures )

}

fn load_entry(
	engine: &Engine,
	archive: &mut Archive,
	entry: &str,
	options: &HostOptions,
) -> Result<Option<( String, ComponentHandle )>, LoadError> {

	let bytes = archive.read_entry( entry )
		.map_err( |err| LoadError::FailedToReadEntry( entry.to_owned(), err ))?
		.ok_or_else( || LoadError::FailedToReadEntry(
			entry.to_owned(),
			crate::archive::ArchiveError::IOError( std::io::Error::new(
				std::io::ErrorKind::NotFound,
				"listed entry vanished from archive",
			)),
		))?;

	match Component::load( engine, archive, entry, &bytes, options )? {
		Some( component ) => Ok( Some(( entry.to_owned(), Arc::new( Mutex::new( component )) ))),
		None => {
			tracing::debug!( entry, "entry does not implement the component contract" );
			Ok( None )
		},
	}

}

/// Emits one failure through the logging surface: a leading line with the
/// entry's full context, then one line per further underlying cause so
/// multi-cause failures stay individually searchable.
pub(crate) fn log_failure( archive: &Path, error: &LoadError ) {

	tracing::error!( archive = %archive.display(), %error, "module load failure" );

	if let Some( runtime_error ) = error.runtime_cause() {
		runtime_error.chain().skip( 1 ).for_each( |cause|
			tracing::error!( archive = %archive.display(), %cause, "caused by" ));
	}

}
