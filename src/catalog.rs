//! Archive discovery.

use std::ffi::OsStr ;
use std::path::{ Path, PathBuf };



/// Lists the candidate archives at `path`.
///
/// A single archive file yields a one-element list; a directory yields every
/// file in it with the archive extension, in directory-listing order (stable
/// for one listing call, not guaranteed sorted). Anything else — a missing
/// path, a file with the wrong extension — yields an empty list rather than
/// an error, so "no plugins configured" stays a normal case.
pub fn catalog( path: &Path, archive_extension: &str ) -> Vec<PathBuf> {

    if path.is_file() {
        return match path.extension() == Some( OsStr::new( archive_extension )) {
            true => vec![ path.to_path_buf() ],
            false => Vec::with_capacity( 0 ),
        };
    }

    let Ok( entries ) = std::fs::read_dir( path ) else {
        return Vec::with_capacity( 0 );
    };

    entries
        .filter_map( Result::ok )
        .map( |entry| entry.path() )
        .filter( |candidate| candidate.is_file()
            && candidate.extension() == Some( OsStr::new( archive_extension )))
        .collect()

}
