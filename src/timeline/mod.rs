pub(crate) mod controller;
pub(crate) mod geometry;
pub(crate) mod progress;
#[allow(clippy::module_inception)]
pub(crate) mod timeline;
