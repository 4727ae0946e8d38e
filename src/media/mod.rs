pub(crate) mod blob;
pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod validate;
pub(crate) mod visual;
