//! The structured message wrapper delivered to providers.

use serde::{ Deserialize, Serialize };



/// A dispatched message plus the provenance of the call that produced it.
///
/// The payload is an opaque structured value the provider itself interprets;
/// the host never inspects it. Provenance identifies the dispatching
/// operation and its call site, captured by
/// [`ProviderManager::dispatch`]( crate::ProviderManager::dispatch ).
///
/// The envelope crosses the host/guest boundary JSON-encoded; field names
/// below are the wire names.
#[derive( Debug, Clone, PartialEq, Serialize, Deserialize )]
pub struct Envelope {
    /// Message payload, interpreted by the receiving provider.
    pub payload: serde_json::Value,
    /// Identity of the dispatching operation.
    pub source_operation: String,
    /// Source file of the dispatch call site.
    pub source_file: String,
    /// Source line of the dispatch call site.
    pub source_line: u32,
}
