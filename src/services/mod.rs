pub(crate) mod file_store;
pub(crate) mod pdf;
