mod partial_success ;
mod result_list ;

pub use partial_success::PartialSuccess ;
pub use result_list::ResultList ;
