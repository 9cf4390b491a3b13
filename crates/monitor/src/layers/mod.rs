pub(crate) mod policy;
pub(crate) mod service;
pub(crate) mod storage;
pub(crate) mod ui;
