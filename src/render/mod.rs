pub(crate) mod compositor;
pub(crate) mod cpu;
pub(crate) mod overlay;
pub(crate) mod placeholder;
pub(crate) mod surface;
