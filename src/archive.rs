//! Zip-container access for provider archives.
//!
//! An [`Archive`] is one provider's packaged module set: a zip file whose
//! entries are WASM module binaries. The file stem is the archive's **short
//! name**, used as the load-cache key and expected to follow the
//! `<ProviderName>_<Version>` convention for fallback resolution.

use std::fs::File ;
use std::io::Read ;
use std::path::{ Path, PathBuf };
use thiserror::Error ;
use zip::ZipArchive ;
use zip::result::ZipError ;



#[derive( Error, Debug )]
pub enum ArchiveError {

    #[error( "IO Error: {0}" )]
    IOError( #[from] std::io::Error ),

    #[error( "Invalid Archive: {0}" )]
    InvalidArchive( #[from] ZipError ),

}

/// An open provider archive. Entries are read lazily and never mutated.
pub struct Archive {
    path: PathBuf,
    short_name: String,
    entry_names: Vec<String>,
    zip: ZipArchive<File>,
}

impl Archive {

    /// Opens the archive and records its entry names in archive order.
    pub fn open( path: impl Into<PathBuf> ) -> Result<Self, ArchiveError> {

        let path = path.into();
        let short_name = path.file_stem()
            .map( |stem| stem.to_string_lossy().into_owned() )
            .unwrap_or_default();

        let mut zip = ZipArchive::new( File::open( &path )? )?;

        // ZipArchive::file_names() iterates an internal map; by_index is the
        // only order-preserving enumeration.
        let entry_names = ( 0..zip.len() )
            .map( |index| Ok( zip.by_index( index )?.name().to_owned() ))
            .collect::<Result<Vec<_>, ZipError>>()?;

        Ok( Self { path, short_name, entry_names, zip } )

    }

    pub fn path( &self ) -> &Path { &self.path }

    /// Archive filename without extension; the load-cache key.
    pub fn short_name( &self ) -> &str { &self.short_name }

    /// All entry names, in archive order.
    pub fn entry_names( &self ) -> &[String] { &self.entry_names }

    /// Entry names ending in the module extension, in archive order.
    pub fn module_entries( &self, module_extension: &str ) -> Vec<String> {
        let suffix = format!( ".{}", module_extension );
        self.entry_names.iter()
            .filter( |name| name.ends_with( &suffix ))
            .cloned()
            .collect()
    }

    /// Reads an entry's full bytes. A missing entry is `Ok( None )`, not an
    /// error, so resolution lookups can treat absence as "not found".
    pub fn read_entry( &mut self, name: &str ) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut entry = match self.zip.by_name( name ) {
            Ok( entry ) => entry,
            Err( ZipError::FileNotFound ) => return Ok( None ),
            Err( err ) => return Err( err.into() ),
        };
        let mut bytes = Vec::with_capacity( usize::try_from( entry.size() ).unwrap_or( 0 ));
        entry.read_to_end( &mut bytes ).map_err( ArchiveError::IOError )?;
        Ok( Some( bytes ))
    }

}

impl std::fmt::Debug for Archive {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "Archive" )
            .field( "path", &self.path )
            .field( "short_name", &self.short_name )
            .field( "entry_names", &self.entry_names )
            .finish_non_exhaustive()
    }
}
