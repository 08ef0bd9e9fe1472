pub(crate) mod decode;
pub(crate) mod preload;
pub(crate) mod source;
pub(crate) mod store;
pub(crate) mod template;
