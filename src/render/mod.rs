pub(crate) mod presenter;
pub(crate) mod surface;
