/// `gosub fix`.
pub mod fix;
/// `gosub status`.
pub mod status;
/// `gosub sync`.
pub mod sync;
/// `gosub vendor`.
pub mod vendor;
