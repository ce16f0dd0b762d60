use crate::archive::Archive ;



/// The dependency-resolution scope for exactly one load operation.
///
/// Created at load start, borrowing the archive being loaded, and discarded
/// when the load returns. Because the context is a stack value passed by
/// reference into the instantiation path, it can only ever answer for the
/// archive actually being loaded — there is no process-wide "current archive"
/// slot, and scoping per archive is structural rather than a convention.
pub(crate) struct ResolutionContext<'a> {
	archive: &'a mut Archive,
	module_extension: &'a str,
	/// Modules currently instantiating, innermost last. Guards against
	/// dependency cycles inside one archive.
	in_flight: Vec<String>,
}

impl<'a> ResolutionContext<'a> {

	pub(crate) fn new( archive: &'a mut Archive, module_extension: &'a str ) -> Self {
		Self { archive, module_extension, in_flight: Vec::new() }
	}

	pub(crate) fn archive_path( &self ) -> &std::path::Path { self.archive.path() }

	/// Answers "give me the bytes for module `requested`" from the archive
	/// being loaded.
	///
	/// Anything after the first `,` in the request is qualification metadata
	/// and ignored; only the prefix names the module. An empty name, a
	/// missing entry, or a read failure all report "not found" — read
	/// failures are additionally logged, matching the loader's own failure
	/// handling, but never propagate out of resolution.
	pub(crate) fn resolve( &mut self, requested: &str ) -> Option<Vec<u8>> {

		let module = requested.split( ',' ).next().unwrap_or( requested ).trim();
		if module.is_empty() { return None }

		let entry = format!( "{}.{}", module, self.module_extension );
		match self.archive.read_entry( &entry ) {
			Ok( found ) => found,
			Err( err ) => {
				tracing::error!(
					archive = %self.archive.path().display(),
					entry = %entry,
					error = %err,
					"failed to read dependency entry",
				);
				None
			},
		}

	}

	/// Marks `module` as instantiating. Returns `false` when the module is
	/// already in flight, i.e. resolving it again would loop.
	pub(crate) fn begin( &mut self, module: &str ) -> bool {
		if self.in_flight.iter().any( |name| name == module ) { return false }
		self.in_flight.push( module.to_owned() );
		true
	}

	pub(crate) fn end( &mut self, module: &str ) {
		debug_assert_eq!( self.in_flight.last().map( String::as_str ), Some( module ));
		self.in_flight.pop();
	}

}
