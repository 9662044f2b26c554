pub mod dematerialize;
pub mod into_stream;
pub mod materialize;
