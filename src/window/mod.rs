pub mod content;
pub mod control;
pub mod debounce;
pub mod events;
pub mod layout;
pub mod loader;
pub mod page;
pub mod repository;
pub mod sync;
#[allow(clippy::module_inception)]
pub mod window;

#[cfg(test)]
pub(crate) mod test_support;
