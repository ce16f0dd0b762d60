//! Per-archive memoization of constructed components.

use std::collections::HashMap ;

use crate::component::ComponentHandle ;



/// Process-lifetime cache keyed by archive short name.
///
/// A hit returns the previously constructed components by handle, preserving
/// instance identity: extracting a component twice from the same archive
/// yields the same object both times, so provider state accumulated between
/// lookups is shared. Entries are added once, on first successful processing,
/// and never removed — there is no invalidation within one process run, even
/// if the underlying file changes.
#[derive( Debug, Default )]
pub(crate) struct LoadCache {
	archives: HashMap<String, Vec<( String, ComponentHandle )>>,
}

impl LoadCache {

	pub(crate) fn new() -> Self {
		Self { archives: HashMap::new() }
	}

	pub(crate) fn get( &self, short_name: &str ) -> Option<&[( String, ComponentHandle )]> {
		self.archives.get( short_name ).map( Vec::as_slice )
	}

	pub(crate) fn insert( &mut self, short_name: String, components: Vec<( String, ComponentHandle )> ) {
		self.archives.insert( short_name, components );
	}

}
